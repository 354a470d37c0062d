//! Pieces shared by the audio and motion analyzers.
pub mod alert_channel;
pub mod alert_gate;
pub mod analyzer_callbacks;
pub use alert_channel::AlertChannel;
pub use alert_gate::AlertGate;
pub use analyzer_callbacks::AnalyzerCallbacks;
