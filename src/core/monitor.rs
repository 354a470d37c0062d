use std::sync::{
    Arc,
    mpsc::{self, Receiver},
};

use crate::{
    clock::Clock,
    detector::AlertChannel,
    log::log_sink::LogSink,
    meter::MeterSink,
    presentation::{AlertPresenter, AlertSink},
    session::ConnectionSession,
    sink_info,
    transport::{MediaFactory, SignalingTransport},
};

use super::{events::MonitorEvent, monitor_settings::MonitorSettings};

/// The view-side outputs a monitor renders into.
pub struct MonitorView<S: MeterSink, A: AlertSink> {
    pub audio_meter: S,
    pub motion_meter: S,
    pub alerts: A,
}

/// One monitoring view: a [`ConnectionSession`] feeding an [`AlertPresenter`]
/// through the monitor event channel.
///
/// The host calls [`on_frame`](Self::on_frame) from its animation callback;
/// that single call polls the transport, fires a due retry, samples the
/// analyzers and updates the presentation.
pub struct Monitor<T, M, S, A>
where
    T: SignalingTransport,
    M: MediaFactory,
    S: MeterSink,
    A: AlertSink,
{
    session: ConnectionSession<T, M>,
    presenter: AlertPresenter<S, A>,
    events: Receiver<MonitorEvent>,
    logger: Arc<dyn LogSink>,
}

impl<T, M, S, A> Monitor<T, M, S, A>
where
    T: SignalingTransport,
    M: MediaFactory,
    S: MeterSink,
    A: AlertSink,
{
    pub fn new(
        settings: &MonitorSettings,
        transport: T,
        media: M,
        view: MonitorView<S, A>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let (tx, events) = mpsc::channel();
        let session = ConnectionSession::new(
            settings.room_id.clone(),
            transport,
            media,
            tx,
            clock.clone(),
            logger.clone(),
        )
        .with_retry_policy(settings.retry)
        .with_settings(settings.detectors);

        let mut presenter = AlertPresenter::new(
            view.audio_meter,
            view.motion_meter,
            view.alerts,
            settings.meter,
            settings.presenter,
            clock,
            logger.clone(),
        );
        presenter.set_paused(AlertChannel::Audio, settings.detectors.audio_paused);
        presenter.set_paused(AlertChannel::Motion, settings.detectors.motion_paused);

        Self {
            session,
            presenter,
            events,
            logger,
        }
    }

    pub fn start(&mut self) {
        self.session.start();
        self.presenter.drain(&self.events);
    }

    pub fn on_frame(&mut self) {
        self.session.poll();
        self.session.on_frame();
        self.presenter.drain(&self.events);
        self.presenter.tick();
    }

    pub fn set_threshold(&mut self, channel: AlertChannel, threshold: f32) {
        self.session.set_threshold(channel, threshold);
    }

    /// Pauses alerting on one channel, in the analyzer and in the view.
    pub fn set_paused(&mut self, channel: AlertChannel, paused: bool) {
        sink_info!(
            self.logger,
            "[Monitor] {channel} alerts {}",
            if paused { "paused" } else { "resumed" }
        );
        self.session.set_paused(channel, paused);
        self.presenter.set_paused(channel, paused);
    }

    /// Tears the session down and stops the presentation. Idempotent.
    pub fn cleanup(&mut self) {
        self.session.cleanup();
        self.presenter.drain(&self.events);
        self.presenter.stop();
    }

    #[must_use]
    pub fn session(&self) -> &ConnectionSession<T, M> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ConnectionSession<T, M> {
        &mut self.session
    }

    #[must_use]
    pub fn presenter(&self) -> &AlertPresenter<S, A> {
        &self.presenter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        log::NoopLogSink,
        meter::meter_sink::LastRendered,
        presentation::RecordingAlertSink,
        session::SessionState,
        synthetic::{LoopbackOptions, LoopbackTransport, SyntheticPlaceholderFactory, SyntheticScene},
        transport::CallId,
    };

    type TestMonitor =
        Monitor<LoopbackTransport, SyntheticPlaceholderFactory, LastRendered, RecordingAlertSink>;

    fn monitor(settings: &MonitorSettings) -> (Arc<ManualClock>, TestMonitor) {
        let clock = Arc::new(ManualClock::new(0));
        let m = Monitor::new(
            settings,
            LoopbackTransport::new(LoopbackOptions::default(), SyntheticScene::default()),
            SyntheticPlaceholderFactory::default(),
            MonitorView {
                audio_meter: LastRendered::default(),
                motion_meter: LastRendered::default(),
                alerts: RecordingAlertSink::default(),
            },
            clock.clone(),
            Arc::new(NoopLogSink),
        );
        (clock, m)
    }

    #[test]
    fn frames_drive_connection_and_status() {
        let (_c, mut m) = monitor(&MonitorSettings::default());
        m.start();
        m.on_frame();
        assert_eq!(m.session().state(), SessionState::Connected);
        assert_eq!(
            m.presenter().alert_sink().statuses,
            vec!["Connecting…", "Calling…", "Connected"]
        );
    }

    #[test]
    fn configured_room_is_called() {
        let settings = MonitorSettings {
            room_id: "nursery".into(),
            ..MonitorSettings::default()
        };
        let (_c, mut m) = monitor(&settings);
        m.start();
        m.on_frame();
        assert!(m.session().transport().ops().iter().any(|op| matches!(
            op,
            crate::synthetic::TransportOp::Call { target, .. } if target == "nursery"
        )));
    }

    #[test]
    fn lost_call_shows_retry_countdown() {
        let (_c, mut m) = monitor(&MonitorSettings::default());
        m.start();
        m.on_frame();
        m.session_mut().transport_mut().drop_call(CallId(1));
        m.on_frame();
        let last = m.presenter().alert_sink().statuses.last().cloned();
        assert!(last.is_some_and(|s| s.starts_with("Retrying in ")));
    }

    #[test]
    fn pause_reaches_both_analyzer_and_view() {
        let (_c, mut m) = monitor(&MonitorSettings::default());
        m.start();
        m.on_frame();
        m.set_paused(AlertChannel::Audio, true);
        assert!(m.presenter().is_paused(AlertChannel::Audio));
        assert_eq!(
            m.session().bindings().audio().map(|a| a.is_paused()),
            Some(true)
        );
    }

    #[test]
    fn cleanup_reports_disconnect_and_is_idempotent() {
        let (_c, mut m) = monitor(&MonitorSettings::default());
        m.start();
        m.on_frame();
        m.cleanup();
        m.cleanup();
        assert_eq!(m.session().state(), SessionState::Destroyed);
        assert_eq!(
            m.presenter().alert_sink().statuses.last().map(String::as_str),
            Some("Disconnected")
        );
    }
}
