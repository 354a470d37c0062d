use crate::{detector::AlertChannel, session::SessionStatus};

/// Where alerts and status text are shown.
pub trait AlertSink {
    fn show_alert(&mut self, channel: AlertChannel);
    fn dismiss_alert(&mut self, channel: AlertChannel);
    fn show_status(&mut self, status: &SessionStatus);
}

/// Keeps a transcript of everything shown. Used by tests and headless runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingAlertSink {
    pub shown: Vec<AlertChannel>,
    pub dismissed: Vec<AlertChannel>,
    pub statuses: Vec<String>,
}

impl AlertSink for RecordingAlertSink {
    fn show_alert(&mut self, channel: AlertChannel) {
        self.shown.push(channel);
    }

    fn dismiss_alert(&mut self, channel: AlertChannel) {
        self.dismissed.push(channel);
    }

    fn show_status(&mut self, status: &SessionStatus) {
        self.statuses.push(status.to_string());
    }
}
