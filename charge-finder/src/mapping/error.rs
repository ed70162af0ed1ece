//! Mapping API error types.

/// Errors from the routing and geocoding endpoints.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid app credentials
    #[error("unauthorized: check HERE_APP_ID and HERE_APP_CODE")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by mapping API")]
    RateLimited,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
