use std::fmt;

/// Synchronous failure reported by the signaling/call transport.
///
/// Always transient from the session's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The signaling server could not be reached.
    Unreachable(String),
    /// The handle was destroyed underneath the caller.
    Closed,
    /// The transport refused the request (for example the target peer is unknown).
    Rejected(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(e) => write!(f, "signaling server unreachable: {e}"),
            Self::Closed => write!(f, "signaling handle closed"),
            Self::Rejected(e) => write!(f, "request rejected: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}
