use std::fmt;

/// Failure to acquire or synthesize media. Ends the current attempt without retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    PermissionDenied,
    NoDevice,
    /// The host cannot build the requested track (no audio context, no canvas capture).
    Unsupported(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "media permission denied"),
            Self::NoDevice => write!(f, "no media device available"),
            Self::Unsupported(what) => write!(f, "unsupported media: {what}"),
        }
    }
}

impl std::error::Error for MediaError {}
