use thiserror::Error;

use crate::model::kind::ResourceKind;

/// Everything that can go wrong between a form submission and a GitHub response.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// Rejected locally; no request was built.
    #[error("invalid input: {0}")]
    Validation(String),

    /// GitHub answered with a non-2xx status. `reason` is the human-readable message.
    #[error("{reason}")]
    Http { status: u16, reason: String },

    /// The first page of a listing came back empty.
    #[error("no {} exist in this repository", kind.plural())]
    EmptyResult { kind: ResourceKind },

    /// The listing did not reach an empty page within the page cap.
    #[error("gave up listing {} after {pages} pages", kind.plural())]
    PageLimit { kind: ResourceKind, pages: u32 },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration: {0}")]
    Config(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<reqwest::Error> for ManagerError {
    fn from(err: reqwest::Error) -> Self {
        ManagerError::Network(err.to_string())
    }
}
