pub mod client;
pub mod ports;
pub mod token;
pub mod types;

pub use client::GitHubClient;
