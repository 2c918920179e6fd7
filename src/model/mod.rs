//! Authoritative classification: the external model runner, the bridge that
//! wraps it with a lexical fallback, and the HTTP client for a remote bridge.

mod bridge;
mod client;
mod process;
pub mod protocol;

use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::Verdict;

pub use bridge::{ClassificationBridge, ModelBackend};
pub use client::RemoteClassifierClient;
pub use process::ExternalModelProcess;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed classification payload: {0}")]
    Malformed(String),
    #[error("failed to start model runner: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("model runner exited with {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },
    #[error("model runner produced no output")]
    EmptyOutput,
    #[error("model runner reported an error: {0}")]
    ModelError(String),
}

/// Source of authoritative verdicts consulted by the classification service.
pub trait AuthoritativeClassifier: Send + Sync {
    /// Short name for logs and the health endpoint.
    fn name(&self) -> &'static str;

    fn classify<'a>(&'a self, content: &'a str) -> BoxFuture<'a, Result<Verdict, ClassifyError>>;
}
