use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    // Configuration errors
    #[error("Missing secret '{0}' on feed source")]
    MissingSecret(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown feed type: {0}")]
    UnknownFeedType(String),

    // Auth errors
    #[error("Token exchange failed for source {source_id}: {message}")]
    Auth { source_id: String, message: String },

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Payload errors
    #[error("Malformed upstream response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;

impl FeedError {
    /// Errors no degraded result can stand in for: without valid secrets, a
    /// token, or a known adapter, no subsequent call for the source can
    /// succeed either.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FeedError::Auth { .. }
                | FeedError::MissingSecret(_)
                | FeedError::MissingEnvVar(_)
                | FeedError::InvalidUrl(_)
                | FeedError::UnknownFeedType(_)
        )
    }
}

/// Failure policy for upstream listing and data-fetch operations: fatal
/// errors propagate, everything else is logged and replaced with the empty
/// default.
pub fn degrade<T: Default>(result: FeedResult<T>, source_id: &str, operation: &str) -> FeedResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::error!(source_id, operation, error = %e, "upstream request failed, returning empty result");
            Ok(T::default())
        }
    }
}
