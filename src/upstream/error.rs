#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to parse API response: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("{api} responded with status {status}: {body}")]
    ApiError {
        api: String,
        status: u16,
        body: String,
    },

    #[error("Session did not resolve to a user.")]
    UserNotFound,

    #[error("Refusing to use `{segment}` as a url path segment")]
    InvalidPathSegment { segment: String },

    #[error("Base url `{url}` cannot take path segments")]
    InvalidBaseUrl { url: String },
}

impl From<reqwest::Error> for UpstreamError {
    /// The url is stripped since it may carry a session token.
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::RequestFailed(Box::new(e.without_url()))
    }
}
