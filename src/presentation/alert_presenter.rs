use std::sync::{Arc, mpsc::Receiver};

use crate::{
    clock::Clock,
    core::events::MonitorEvent,
    detector::AlertChannel,
    log::log_sink::LogSink,
    meter::{DecayingMeter, MeterOptions, MeterSink},
    sink_debug,
};

use super::{alert_sink::AlertSink, presenter_options::PresenterOptions};

/// One meter plus its toast state.
struct ChannelView<S: MeterSink> {
    meter: DecayingMeter<S>,
    paused: bool,
    toast_until_ms: Option<u64>,
}

/// Routes level events into per-channel [`DecayingMeter`]s and alert events
/// into toasts that dismiss themselves after a while.
///
/// Each channel has its own pause flag: a paused channel still moves its
/// meter but shows no toasts.
pub struct AlertPresenter<S: MeterSink, A: AlertSink> {
    audio: ChannelView<S>,
    motion: ChannelView<S>,
    alerts: A,
    options: PresenterOptions,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn LogSink>,
    running: bool,
}

impl<S: MeterSink, A: AlertSink> AlertPresenter<S, A> {
    pub fn new(
        audio_meter: S,
        motion_meter: S,
        alerts: A,
        meter_options: MeterOptions,
        options: PresenterOptions,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let view = |sink: S| ChannelView {
            meter: DecayingMeter::new(sink, meter_options, clock.clone()),
            paused: false,
            toast_until_ms: None,
        };
        Self {
            audio: view(audio_meter),
            motion: view(motion_meter),
            alerts,
            options,
            clock,
            logger,
            running: true,
        }
    }

    pub fn handle(&mut self, event: &MonitorEvent) {
        if !self.running {
            return;
        }
        match event {
            MonitorEvent::Level { channel, level } => self.view_mut(*channel).meter.update(*level),
            MonitorEvent::Alert(channel) => self.show_alert(*channel),
            MonitorEvent::Status(status) => self.alerts.show_status(status),
            MonitorEvent::AnalyzersAttached => {}
            MonitorEvent::AnalyzersDetached => {
                self.dismiss(AlertChannel::Audio);
                self.dismiss(AlertChannel::Motion);
            }
        }
    }

    /// Handles every event currently queued on `rx`. Returns how many there were.
    pub fn drain(&mut self, rx: &Receiver<MonitorEvent>) -> usize {
        let mut n = 0;
        for event in rx.try_iter() {
            self.handle(&event);
            n += 1;
        }
        n
    }

    /// Timer step: decays both meters and takes down expired toasts.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.audio.meter.tick();
        self.motion.meter.tick();

        let now = self.clock.now_ms();
        for channel in [AlertChannel::Audio, AlertChannel::Motion] {
            if self
                .view_mut(channel)
                .toast_until_ms
                .is_some_and(|until| now >= until)
            {
                self.dismiss(channel);
            }
        }
    }

    /// Pausing a channel also takes down its visible toast.
    pub fn set_paused(&mut self, channel: AlertChannel, paused: bool) {
        self.view_mut(channel).paused = paused;
        if paused {
            self.dismiss(channel);
        }
    }

    #[must_use]
    pub fn is_paused(&self, channel: AlertChannel) -> bool {
        self.view(channel).paused
    }

    #[must_use]
    pub fn is_toast_visible(&self, channel: AlertChannel) -> bool {
        self.view(channel).toast_until_ms.is_some()
    }

    #[must_use]
    pub fn meter(&self, channel: AlertChannel) -> &DecayingMeter<S> {
        &self.view(channel).meter
    }

    #[must_use]
    pub fn alert_sink(&self) -> &A {
        &self.alerts
    }

    /// Stops both meters and clears toasts. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.dismiss(AlertChannel::Audio);
        self.dismiss(AlertChannel::Motion);
        self.audio.meter.stop();
        self.motion.meter.stop();
        self.running = false;
    }

    fn show_alert(&mut self, channel: AlertChannel) {
        if self.view(channel).paused {
            sink_debug!(self.logger, "[Alerts] {channel} alert suppressed while paused");
            return;
        }
        let until = self.clock.now_ms().saturating_add(self.options.toast_duration_ms);
        self.view_mut(channel).toast_until_ms = Some(until);
        self.alerts.show_alert(channel);
    }

    fn dismiss(&mut self, channel: AlertChannel) {
        if self.view_mut(channel).toast_until_ms.take().is_some() {
            self.alerts.dismiss_alert(channel);
        }
    }

    fn view(&self, channel: AlertChannel) -> &ChannelView<S> {
        match channel {
            AlertChannel::Audio => &self.audio,
            AlertChannel::Motion => &self.motion,
        }
    }

    fn view_mut(&mut self, channel: AlertChannel) -> &mut ChannelView<S> {
        match channel {
            AlertChannel::Audio => &mut self.audio,
            AlertChannel::Motion => &mut self.motion,
        }
    }
}
