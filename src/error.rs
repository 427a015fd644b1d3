use thiserror::Error;

#[derive(Error, Debug)]
pub enum CineFetchError {
    #[error("catalog unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("malformed catalog response: {0}")]
    MalformedResponse(String),

    #[error("poster fetch failed: {0}")]
    FetchFailed(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("session {0} superseded")]
    StaleSession(u64),
}

impl CineFetchError {
    pub fn remote_unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable(msg.into())
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }

    /// True for the internal suppression signal raised when a superseded
    /// session tries to emit an event. Never user-visible.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleSession(_))
    }
}

pub type Result<T> = std::result::Result<T, CineFetchError>;
