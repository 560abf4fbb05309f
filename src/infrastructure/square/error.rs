//! Error types for the Square Cloud API client.

/// Failure of a Square Cloud API call.
///
/// The `code` fields carry the API's symbolic error code (for example
/// `ACCESS_DENIED` or `APP_NOT_FOUND`) and are surfaced to the user
/// verbatim.
#[derive(Debug, thiserror::Error)]
pub enum SquareError {
    /// 401: the API key is missing or invalid.
    #[error("401 {code}")]
    AuthenticationFailure { code: String },

    /// 404: the requested resource does not exist.
    #[error("404 {code}")]
    NotFound { code: String },

    /// Any other non-2xx response.
    #[error("{status} {code}")]
    Http { status: u16, code: String },

    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx response did not match the expected payload shape.
    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl SquareError {
    /// The API error code, where one exists.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::AuthenticationFailure { code }
            | Self::NotFound { code }
            | Self::Http { code, .. } => Some(code),
            Self::Request(_) | Self::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailure { .. })
    }
}
