mod client;
mod revision;

pub use client::GitHubClient;
pub use revision::parse_revision_uri;
