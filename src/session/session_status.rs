use std::fmt;

/// User-facing connection status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Calling,
    Connected,
    Retrying { delay_secs: u64 },
    /// A transient failure; a retry is already scheduled.
    ErrorRetrying { reason: String },
    /// The attempt failed and will not be retried automatically.
    Failed { reason: String },
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting…"),
            Self::Calling => write!(f, "Calling…"),
            Self::Connected => write!(f, "Connected"),
            Self::Retrying { delay_secs } => write!(f, "Retrying in {delay_secs}s…"),
            Self::ErrorRetrying { reason } => write!(f, "Error: {reason}. Retrying…"),
            Self::Failed { reason } => write!(f, "Error: {reason}"),
            Self::Closed => write!(f, "Disconnected"),
        }
    }
}
