pub mod changelog_extractor;
pub mod changelog_generator;
pub mod pr_fetcher;
pub mod release_composer;

pub use release_composer::{NotesRequest, NotesStrategy, PublishOptions, ReleaseComposer};
