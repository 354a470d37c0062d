use crate::transport::CallId;

/// Inputs of the session transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    SignalingOpen,
    SignalingDisconnected,
    SignalingError(String),
    /// The signaling handle was destroyed.
    SignalingClosed,
    CallStream(CallId),
    CallClosed(CallId),
    CallError(CallId, String),
    RetryTimerFired,
    /// The placeholder stream could not be built.
    PlaceholderFailed(String),
    Cleanup,
}
