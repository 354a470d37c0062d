//! The monitoring view: event type, settings and the aggregate that wires a
//! session to its presentation.
pub mod events;
pub mod monitor;
pub mod monitor_settings;
pub use events::MonitorEvent;
pub use monitor::{Monitor, MonitorView};
pub use monitor_settings::MonitorSettings;
