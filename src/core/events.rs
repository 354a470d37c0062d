use crate::{detector::AlertChannel, session::SessionStatus};

/// Everything the session and its analyzers report to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    Status(SessionStatus),
    /// Analyzers were bound to a freshly received stream.
    AnalyzersAttached,
    AnalyzersDetached,
    Level { channel: AlertChannel, level: f32 },
    Alert(AlertChannel),
}
