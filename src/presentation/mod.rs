//! Turns monitor events into meter movement, transient alert toasts and
//! status text.
pub mod alert_presenter;
pub mod alert_sink;
pub mod presenter_options;
pub use alert_presenter::AlertPresenter;
pub use alert_sink::{AlertSink, RecordingAlertSink};
pub use presenter_options::PresenterOptions;
