use super::call_id::CallId;

/// Asynchronous notification from the transport, queued until the host's next
/// poll.
#[derive(Debug)]
pub enum TransportEvent<I> {
    SignalingOpen,
    SignalingDisconnected,
    SignalingError(String),
    SignalingClosed,
    CallStream(CallId, I),
    CallClosed(CallId),
    CallError(CallId, String),
}
