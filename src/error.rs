use thiserror::Error;

/// Failures surfaced to the admin view.
///
/// `Service` carries the response body verbatim so the user sees exactly what
/// the server said; `Validation` is raised before any network call is made.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{body}")]
    Service { status: u16, body: String },
    #[error("no active specification is loaded")]
    NoActiveSpec,
}

pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    /// Build a service error from a non-2xx response, falling back to a
    /// status-based message when the body is empty.
    pub fn service(status: u16, body: String) -> Self {
        let body = if body.trim().is_empty() {
            format!("request failed with status {status}")
        } else {
            body
        };
        AdminError::Service { status, body }
    }
}
