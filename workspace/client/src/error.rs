use thiserror::Error;

/// Message shown whenever the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot connect to server. Please check that the backend is running.";

/// Failure of a single API call.
///
/// `Rejected` and `Unreachable` are the two classes a user ever sees; their
/// `Display` output is the human-readable message for the toast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No HTTP response at all (connection refused, DNS, TLS, reset).
    /// `reason` is kept for logs only.
    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable { reason: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The request itself could not be built (body or header encoding).
    #[error("Could not encode request: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of a user-initiated view action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
