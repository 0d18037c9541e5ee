//! Platform API clients
//!
//! [`GitHubClient`] reads the source organization; [`GiteaClient`] writes the
//! target. Both sit on the shared [`http::ApiTransport`].

pub mod api;
pub mod gitea;
pub mod github;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;

pub use api::{SourceApi, TargetApi};
pub use gitea::GiteaClient;
pub use github::GitHubClient;
#[cfg(test)]
pub use mock::{MockSource, MockTarget};
