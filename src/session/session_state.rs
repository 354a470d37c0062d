/// Lifecycle state of a [`SessionMachine`](super::SessionMachine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ConnectingToServer,
    CallingPeer,
    Connected,
    Retrying,
    /// Terminal; entered only through an explicit cleanup.
    Destroyed,
}

/// What the session knows about its signaling handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingPhase {
    /// No handle, or it was destroyed.
    Absent,
    /// Created or reconnecting, waiting for "open".
    Connecting,
    Open,
    /// Lost the server but can reconnect.
    Disconnected,
}
