//! Error types shared by every subsystem of the client.

use thiserror::Error;

/// Errors that can occur while talking to the university services.
#[derive(Debug, Error, Clone)]
pub enum CczuError {
    /// Transport-level failure. Never retried automatically.
    #[error("network error: {message}")]
    Network { message: String },

    /// A response lacked an expected structural element (body, header, URL).
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// SSO or service login rejected for a reason other than bad credentials.
    #[error("login failed: {reason}")]
    LoginFailed { reason: String },

    /// The username/password pair was rejected.
    ///
    /// The academic-affairs service answers HTTP 200 whether the password is
    /// right or wrong; an empty subject id in an otherwise well-formed login
    /// response is the only signal of a bad password the protocol offers.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// An operation requiring an established token ran before login completed
    /// or after the token was cleared.
    #[error("not logged in")]
    NotLoggedIn,

    /// The redirect chain exceeded the configured depth bound.
    #[error("too many redirects (followed {depth})")]
    TooManyRedirects { depth: u32 },

    /// A response body did not match the expected envelope or field shape.
    #[error("decoding error: {message}")]
    Decoding { message: String },

    /// A required field was absent from otherwise valid data.
    #[error("missing data: {description}")]
    MissingData { description: String },
}

impl CczuError {
    /// Returns true if this error means a fresh login is required.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            CczuError::NotLoggedIn | CczuError::InvalidCredentials
        )
    }

    /// Returns true if this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, CczuError::Network { .. })
    }
}

impl From<reqwest::Error> for CczuError {
    fn from(err: reqwest::Error) -> Self {
        CczuError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for CczuError {
    fn from(err: url::ParseError) -> Self {
        CczuError::InvalidResponse {
            message: format!("invalid URL: {err}"),
        }
    }
}

impl From<serde_json::Error> for CczuError {
    fn from(err: serde_json::Error) -> Self {
        CczuError::Decoding {
            message: err.to_string(),
        }
    }
}
