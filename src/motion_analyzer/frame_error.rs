use std::fmt;

/// A frame that could not be sampled this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The source has no decoded frame yet (element not playing).
    NotReady,
    /// The pixel buffer does not match the requested geometry.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "video source has no frame yet"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "frame buffer is {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for FrameError {}
