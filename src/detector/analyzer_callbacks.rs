use std::sync::mpsc::Sender;

use crate::{core::events::MonitorEvent, detector::alert_channel::AlertChannel};

/// Level and alert hooks an analyzer reports through.
///
/// Within one tick `level` is always invoked before `alert`.
pub struct AnalyzerCallbacks {
    on_level: Box<dyn FnMut(f32)>,
    on_alert: Box<dyn FnMut()>,
}

impl AnalyzerCallbacks {
    pub fn new(on_level: impl FnMut(f32) + 'static, on_alert: impl FnMut() + 'static) -> Self {
        Self {
            on_level: Box::new(on_level),
            on_alert: Box::new(on_alert),
        }
    }

    /// Callbacks that forward into the monitor event channel, tagged with `channel`.
    ///
    /// A closed receiver is ignored; the analyzer keeps sampling.
    #[must_use]
    pub fn forward_to(tx: Sender<MonitorEvent>, channel: AlertChannel) -> Self {
        let alert_tx = tx.clone();
        Self::new(
            move |level| {
                let _ = tx.send(MonitorEvent::Level { channel, level });
            },
            move || {
                let _ = alert_tx.send(MonitorEvent::Alert(channel));
            },
        )
    }

    pub(crate) fn level(&mut self, level: f32) {
        (self.on_level)(level);
    }

    pub(crate) fn alert(&mut self) {
        (self.on_alert)();
    }
}
