use crate::transport::CallId;

use super::session_status::SessionStatus;

/// Side effects requested by the transition table, executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    OpenSignaling,
    ReconnectSignaling,
    DestroySignaling,
    CreatePlaceholder,
    ReleasePlaceholder,
    PlaceCall(CallId),
    CloseCall(CallId),
    /// Adopt the stream that arrived on this call and bind both analyzers to it.
    BindAnalyzers(CallId),
    UnbindAnalyzers,
    /// Stop the tracks of the bound inbound stream.
    ReleaseInbound,
    ScheduleRetry { delay_ms: u64 },
    CancelRetry,
    Status(SessionStatus),
}
