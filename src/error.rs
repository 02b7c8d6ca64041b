use thiserror::Error;

/// Notice shown to the user when the contribution service can't be reached.
pub const REMOTE_FAILURE_NOTICE: &str =
    "Something went wrong. Please check error log for more details";

/// Notice shown when a single contribution fails in transport.
pub const CONTRIBUTION_FAILURE_NOTICE: &str =
    "Something went wrong while contributing translation. Please check error log for more details";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation {0} not found")]
    NotFound(String),

    /// Transport failure or non-2xx answer from the contribution service.
    /// Displays the user-facing notice; the cause is logged where it happens.
    #[error("{notice}")]
    Remote {
        notice: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response from contribution service: {0}")]
    MalformedResponse(String),

    #[error("Invalid translation map: {0}")]
    InvalidTranslationMap(String),

    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Translation store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = TranslationError> = std::result::Result<T, E>;
