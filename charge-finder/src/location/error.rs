//! Location resolver error types.

/// Errors from the platform's device services.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The service answered with a failure status (permission not granted,
    /// no address on file, throttled, ...)
    #[error("platform service error {status}: {message}")]
    Service { status: u16, message: String },

    /// The envelope carries no endpoint or access token for service calls
    #[error("platform service not configured: {0}")]
    NotConfigured(&'static str),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

impl PlatformError {
    /// Whether this is a recognized platform service fault.
    ///
    /// Resolvers turn these into "unavailable"; anything else is propagated.
    pub fn is_service_fault(&self) -> bool {
        matches!(
            self,
            PlatformError::Service { .. } | PlatformError::NotConfigured(_)
        )
    }
}

/// Unexpected failures while resolving a location.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// Address lookup failed for a reason other than a service fault
    #[error("device address lookup failed: {0}")]
    Platform(#[from] PlatformError),

    /// Converting the address to coordinates failed
    #[error("geocoding failed: {0}")]
    Geocode(#[source] Box<dyn std::error::Error + Send + Sync>),
}
