use thiserror::Error;

use crate::utils::UtilError;

/// Errors reported by an [`crate::Authenticator`] while running a ceremony.
///
/// The variants follow the DOMException names a browser raises from
/// `navigator.credentials.create()` and `navigator.credentials.get()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CeremonyError {
    /// The user declined, the operation timed out, or no credential matched
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// A credential from `excludeCredentials` already lives on the authenticator
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The relying party ID is not valid for the caller's origin
    #[error("Security error: {0}")]
    Security(String),

    /// None of the requested public key algorithms is supported
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The authenticator cannot satisfy a required option
    #[error("Constraint error: {0}")]
    Constraint(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<UtilError> for CeremonyError {
    fn from(e: UtilError) -> Self {
        CeremonyError::Unknown(e.to_string())
    }
}

/// Errors that end a registration or authentication flow without navigation.
///
/// A server answering `verified: false` is not an error; it is reported
/// through [`crate::FlowOutcome`].
#[derive(Debug, Error)]
pub enum FlowError {
    /// The authenticator failed; nothing was submitted to the server
    #[error("Ceremony failed: {0}")]
    CeremonyFailed(#[from] CeremonyError),

    /// The options returned by the server do not have the expected shape
    #[error("Invalid ceremony options: {0}")]
    InvalidOptions(String),

    /// The credential produced by the authenticator does not have the expected shape
    #[error("Invalid ceremony response: {0}")]
    InvalidResponse(String),

    /// The server answered with a non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serde error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl FlowError {
    /// Whether the flow stopped because the authenticator refused or failed.
    pub fn is_ceremony_failure(&self) -> bool {
        matches!(self, FlowError::CeremonyFailed(_))
    }
}
