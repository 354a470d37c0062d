use std::{
    collections::VecDeque,
    sync::{Arc, mpsc::Sender},
};

use crate::{
    clock::Clock,
    core::events::MonitorEvent,
    detector::AlertChannel,
    log::log_sink::LogSink,
    sink_debug, sink_info, sink_trace, sink_warn,
    transport::{
        CallId, InboundStream, MediaFactory, PlaceholderStream, SignalingTransport,
        TransportEvent,
    },
};

use super::{
    analyzer_bindings::AnalyzerBindings, detector_settings::DetectorSettings,
    retry_policy::RetryPolicy, session_effect::SessionEffect, session_event::SessionEvent,
    session_machine::SessionMachine, session_state::SessionState,
    session_status::SessionStatus,
};

/// Keeps one monitoring call alive against an unreliable transport.
///
/// Owns the signaling handle, the active call, the placeholder stream it
/// offers and the inbound stream it receives, and the analyzers bound to
/// that stream. Transport outcomes are fed in through the `on_*` methods or
/// drained from the transport by [`poll`](Self::poll); each is run through
/// the [`SessionMachine`] and the resulting effects are applied in order.
///
/// Everything observable leaves through the [`MonitorEvent`] channel.
pub struct ConnectionSession<T: SignalingTransport, M: MediaFactory> {
    room_id: String,
    machine: SessionMachine,
    transport: T,
    media: M,
    placeholder: Option<M::Placeholder>,
    inbound: Option<T::Inbound>,
    /// Stream delivered for a call, waiting for the machine to accept it.
    pending_inbound: Option<(CallId, T::Inbound)>,
    bindings: AnalyzerBindings,
    settings: DetectorSettings,
    events: Sender<MonitorEvent>,
    status: Option<SessionStatus>,
    retry_deadline_ms: Option<u64>,
    jitter: Box<dyn FnMut() -> f64>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn LogSink>,
}

impl<T: SignalingTransport, M: MediaFactory> ConnectionSession<T, M> {
    /// Builds an idle session that will call the peer listening on `room_id`.
    pub fn new(
        room_id: impl Into<String>,
        transport: T,
        media: M,
        events: Sender<MonitorEvent>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            machine: SessionMachine::new(RetryPolicy::default()),
            transport,
            media,
            placeholder: None,
            inbound: None,
            pending_inbound: None,
            bindings: AnalyzerBindings::default(),
            settings: DetectorSettings::default(),
            events,
            status: None,
            retry_deadline_ms: None,
            jitter: Box::new(rand::random::<f64>),
            clock,
            logger,
        }
    }

    /// Replaces the retry policy. Only meaningful before [`start`](Self::start).
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.machine = SessionMachine::new(policy);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: DetectorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the jitter source (uniform in `[0, 1)`) used for retry delays.
    #[must_use]
    pub fn with_jitter(mut self, jitter: impl FnMut() -> f64 + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    pub fn start(&mut self) {
        sink_info!(self.logger, "[Session] starting, room {}", self.room_id);
        self.feed(SessionEvent::Start);
    }

    pub fn on_signaling_open(&mut self) {
        self.feed(SessionEvent::SignalingOpen);
    }

    pub fn on_signaling_disconnected(&mut self) {
        self.feed(SessionEvent::SignalingDisconnected);
    }

    pub fn on_signaling_error(&mut self, reason: impl Into<String>) {
        self.feed(SessionEvent::SignalingError(reason.into()));
    }

    pub fn on_signaling_closed(&mut self) {
        self.feed(SessionEvent::SignalingClosed);
    }

    /// Remote media arrived on `call`. Streams for calls the session no
    /// longer cares about have their tracks stopped immediately.
    pub fn on_call_stream(&mut self, call: CallId, stream: T::Inbound) {
        if let Some((stale, mut old)) = self.pending_inbound.replace((call, stream)) {
            sink_debug!(self.logger, "[Session] discarding unclaimed stream of {stale}");
            old.stop_tracks();
        }
        self.feed(SessionEvent::CallStream(call));
        if let Some((ignored, mut stream)) = self.pending_inbound.take() {
            sink_debug!(self.logger, "[Session] ignoring stream of stale {ignored}");
            stream.stop_tracks();
        }
    }

    pub fn on_call_closed(&mut self, call: CallId) {
        self.feed(SessionEvent::CallClosed(call));
    }

    pub fn on_call_error(&mut self, call: CallId, reason: impl Into<String>) {
        self.feed(SessionEvent::CallError(call, reason.into()));
    }

    /// Routes one transport event to the matching `on_*` handler.
    pub fn handle_transport_event(&mut self, event: TransportEvent<T::Inbound>) {
        match event {
            TransportEvent::SignalingOpen => self.on_signaling_open(),
            TransportEvent::SignalingDisconnected => self.on_signaling_disconnected(),
            TransportEvent::SignalingError(reason) => self.on_signaling_error(reason),
            TransportEvent::SignalingClosed => self.on_signaling_closed(),
            TransportEvent::CallStream(call, stream) => self.on_call_stream(call, stream),
            TransportEvent::CallClosed(call) => self.on_call_closed(call),
            TransportEvent::CallError(call, reason) => self.on_call_error(call, reason),
        }
    }

    /// Drains queued transport events, then fires the retry timer if it is due.
    pub fn poll(&mut self) {
        self.drain_transport();
        if let Some(deadline) = self.retry_deadline_ms {
            if self.clock.now_ms() >= deadline {
                self.retry_deadline_ms = None;
                sink_debug!(self.logger, "[Session] retry timer fired");
                self.feed(SessionEvent::RetryTimerFired);
                self.drain_transport();
            }
        }
    }

    fn drain_transport(&mut self) {
        while let Some(event) = self.transport.poll_event() {
            self.handle_transport_event(event);
        }
    }

    /// One animation frame for the bound analyzers.
    pub fn on_frame(&mut self) {
        self.bindings.tick();
    }

    /// Sets a detector threshold now and for every analyzer bound later.
    pub fn set_threshold(&mut self, channel: AlertChannel, threshold: f32) {
        self.settings.set_threshold(channel, threshold);
        self.bindings.set_threshold(channel, threshold);
    }

    pub fn set_paused(&mut self, channel: AlertChannel, paused: bool) {
        self.settings.set_paused(channel, paused);
        self.bindings.set_paused(channel, paused);
    }

    /// Tears everything down. The session accepts no further events afterwards.
    /// Idempotent.
    pub fn cleanup(&mut self) {
        self.feed(SessionEvent::Cleanup);
        if let Some((_, mut stream)) = self.pending_inbound.take() {
            stream.stop_tracks();
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Last status published, if any.
    #[must_use]
    pub fn status(&self) -> Option<&SessionStatus> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn active_call(&self) -> Option<CallId> {
        self.machine.active_call()
    }

    /// Absolute time (per the session clock) at which the pending retry fires.
    #[must_use]
    pub fn retry_deadline(&self) -> Option<u64> {
        self.retry_deadline_ms
    }

    #[must_use]
    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    #[must_use]
    pub fn bindings(&self) -> &AnalyzerBindings {
        &self.bindings
    }

    #[must_use]
    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    #[must_use]
    pub fn has_inbound(&self) -> bool {
        self.inbound.is_some()
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[must_use]
    pub fn media(&self) -> &M {
        &self.media
    }

    /// Runs `event` and every failure it provokes through the machine.
    ///
    /// A failing effect abandons the rest of its batch; the failure is then
    /// handled like any transport event.
    fn feed(&mut self, event: SessionEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            sink_trace!(self.logger, "[Session] {:?} in {:?}", event, self.machine.state());
            let jitter = (self.jitter)();
            for effect in self.machine.handle(event, jitter) {
                if let Err(failure) = self.apply(effect) {
                    queue.push_back(failure);
                    break;
                }
            }
        }
    }

    fn apply(&mut self, effect: SessionEffect) -> Result<(), SessionEvent> {
        match effect {
            SessionEffect::OpenSignaling => {
                sink_debug!(self.logger, "[Session] opening signaling");
                self.transport
                    .open()
                    .map_err(|e| SessionEvent::SignalingError(e.to_string()))?;
            }
            SessionEffect::ReconnectSignaling => {
                sink_debug!(self.logger, "[Session] reconnecting signaling");
                self.transport
                    .reconnect()
                    .map_err(|e| SessionEvent::SignalingError(e.to_string()))?;
            }
            SessionEffect::DestroySignaling => {
                sink_debug!(self.logger, "[Session] destroying signaling handle");
                self.transport.destroy();
            }
            SessionEffect::CreatePlaceholder => {
                let placeholder = self.media.create_placeholder().map_err(|e| {
                    sink_warn!(self.logger, "[Session] placeholder media failed: {e}");
                    SessionEvent::PlaceholderFailed(e.to_string())
                })?;
                if let Some(mut old) = self.placeholder.replace(placeholder) {
                    old.release();
                }
            }
            SessionEffect::ReleasePlaceholder => {
                if let Some(mut placeholder) = self.placeholder.take() {
                    placeholder.release();
                }
            }
            SessionEffect::PlaceCall(call) => {
                let Some(local) = self.placeholder.as_ref() else {
                    return Err(SessionEvent::PlaceholderFailed(
                        "no placeholder stream to offer".into(),
                    ));
                };
                sink_info!(
                    self.logger,
                    "[Session] calling {} as {call} with {} local tracks",
                    self.room_id,
                    local.track_count()
                );
                self.transport
                    .call(call, &self.room_id, local)
                    .map_err(|e| SessionEvent::CallError(call, e.to_string()))?;
            }
            SessionEffect::CloseCall(call) => {
                sink_debug!(self.logger, "[Session] closing {call}");
                self.transport.close_call(call);
            }
            SessionEffect::BindAnalyzers(call) => {
                match self.pending_inbound.take() {
                    Some((id, stream)) if id == call => {
                        self.inbound = Some(stream);
                    }
                    other => {
                        self.pending_inbound = other;
                        sink_warn!(self.logger, "[Session] no stream to bind for {call}");
                        return Ok(());
                    }
                }
                let Some(inbound) = self.inbound.as_ref() else {
                    return Ok(());
                };
                if self.bindings.bind(
                    inbound,
                    &self.settings,
                    &self.events,
                    &self.clock,
                    &self.logger,
                ) {
                    self.emit(MonitorEvent::AnalyzersAttached);
                }
            }
            SessionEffect::UnbindAnalyzers => {
                if self.bindings.is_bound() {
                    self.bindings.unbind();
                    self.emit(MonitorEvent::AnalyzersDetached);
                }
            }
            SessionEffect::ReleaseInbound => {
                if let Some(mut stream) = self.inbound.take() {
                    stream.stop_tracks();
                }
            }
            SessionEffect::ScheduleRetry { delay_ms } => {
                let deadline = self.clock.now_ms().saturating_add(delay_ms);
                sink_info!(self.logger, "[Session] retrying in {delay_ms} ms");
                self.retry_deadline_ms = Some(deadline);
            }
            SessionEffect::CancelRetry => {
                self.retry_deadline_ms = None;
            }
            SessionEffect::Status(status) => {
                sink_info!(self.logger, "[Session] status: {status}");
                self.status = Some(status.clone());
                self.emit(MonitorEvent::Status(status));
            }
        }
        Ok(())
    }

    fn emit(&self, event: MonitorEvent) {
        if self.events.send(event).is_err() {
            sink_trace!(self.logger, "[Session] monitor event dropped: receiver gone");
        }
    }
}

impl<T: SignalingTransport, M: MediaFactory> Drop for ConnectionSession<T, M> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{
        clock::ManualClock,
        log::NoopLogSink,
        synthetic::{
            LoopbackOptions, LoopbackTransport, SyntheticPlaceholderFactory, SyntheticScene,
            TransportOp,
        },
        transport::{MediaError, TransportError},
    };
    use std::sync::mpsc::{self, Receiver};

    type Session = ConnectionSession<LoopbackTransport, SyntheticPlaceholderFactory>;

    fn session(options: LoopbackOptions) -> (Arc<ManualClock>, Receiver<MonitorEvent>, Session) {
        let clock = Arc::new(ManualClock::new(0));
        let (tx, rx) = mpsc::channel();
        let s = ConnectionSession::new(
            "room-42",
            LoopbackTransport::new(options, SyntheticScene::default()),
            SyntheticPlaceholderFactory::default(),
            tx,
            clock.clone(),
            Arc::new(NoopLogSink),
        )
        .with_jitter(|| 0.0);
        (clock, rx, s)
    }

    fn statuses(rx: &Receiver<MonitorEvent>) -> Vec<String> {
        rx.try_iter()
            .filter_map(|e| match e {
                MonitorEvent::Status(s) => Some(s.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn connects_and_binds_analyzers() {
        let (_c, rx, mut s) = session(LoopbackOptions::default());
        s.start();
        s.poll();
        assert_eq!(s.state(), SessionState::Connected);
        assert!(s.bindings().is_bound());
        assert!(s.has_placeholder());

        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&MonitorEvent::AnalyzersAttached));
        assert_eq!(
            events.last(),
            Some(&MonitorEvent::Status(SessionStatus::Connected))
        );
    }

    #[test]
    fn call_targets_room_with_placeholder_tracks() {
        let (_c, _rx, mut s) = session(LoopbackOptions::default());
        s.start();
        s.poll();
        assert!(s.transport().ops().contains(&TransportOp::Call {
            call: CallId(1),
            target: "room-42".into(),
            tracks: 2,
        }));
    }

    #[test]
    fn dropped_call_retries_after_deadline() {
        let (clock, rx, mut s) = session(LoopbackOptions::default());
        s.start();
        s.poll();
        s.transport_mut().drop_call(CallId(1));
        s.poll();
        assert_eq!(s.state(), SessionState::Retrying);
        assert_eq!(s.retry_deadline(), Some(5_000));
        assert!(!s.has_placeholder());
        assert!(!s.has_inbound());

        clock.set(4_999);
        s.poll();
        assert_eq!(s.state(), SessionState::Retrying);

        clock.set(5_000);
        s.poll();
        assert_eq!(s.state(), SessionState::Connected);
        assert_eq!(s.active_call(), Some(CallId(2)));
        assert!(statuses(&rx).contains(&"Retrying in 5s…".to_string()));
    }

    #[test]
    fn synchronous_open_failure_is_retried() {
        let (_c, rx, mut s) = session(LoopbackOptions::default());
        s.transport_mut()
            .fail_next(TransportError::Unreachable("dns".into()));
        s.start();
        assert_eq!(s.state(), SessionState::Retrying);
        assert_eq!(
            statuses(&rx).last().map(String::as_str),
            Some("Error: signaling server unreachable: dns. Retrying…")
        );
    }

    #[test]
    fn placeholder_failure_reports_and_stops() {
        let clock = Arc::new(ManualClock::new(0));
        let (tx, rx) = mpsc::channel();
        let mut s = ConnectionSession::new(
            "room-42",
            LoopbackTransport::new(LoopbackOptions::default(), SyntheticScene::default()),
            SyntheticPlaceholderFactory::failing(MediaError::Unsupported("no audio context".into())),
            tx,
            clock,
            Arc::new(NoopLogSink),
        );
        s.start();
        s.poll();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.retry_deadline(), None);
        assert_eq!(
            statuses(&rx).last().map(String::as_str),
            Some("Error: unsupported media: no audio context")
        );
        assert!(s.transport().open_calls().is_empty());
    }

    #[test]
    fn thresholds_and_pauses_carry_over_to_new_analyzers() {
        let (clock, _rx, mut s) = session(LoopbackOptions::default());
        s.set_threshold(AlertChannel::Motion, 0.2);
        s.set_paused(AlertChannel::Audio, true);
        s.start();
        s.poll();
        assert_eq!(s.bindings().motion().map(|m| m.threshold()), Some(0.2));
        assert_eq!(s.bindings().audio().map(|a| a.is_paused()), Some(true));

        s.transport_mut().drop_call(CallId(1));
        s.poll();
        clock.advance(10_000);
        s.poll();
        assert_eq!(s.bindings().motion().map(|m| m.threshold()), Some(0.2));
        assert_eq!(s.bindings().audio().map(|a| a.is_paused()), Some(true));
    }

    #[test]
    fn cleanup_releases_everything_once() {
        let (_c, rx, mut s) = session(LoopbackOptions::default());
        s.start();
        s.poll();
        let inbound_stopped = s.transport().last_inbound_stop_flag().unwrap();
        s.cleanup();
        s.cleanup();

        assert_eq!(s.state(), SessionState::Destroyed);
        assert!(inbound_stopped.get());
        assert!(s.transport().open_calls().is_empty());
        assert_eq!(s.media().stats().live(), 0);
        assert_eq!(
            s.transport()
                .ops()
                .iter()
                .filter(|op| **op == TransportOp::Destroy)
                .count(),
            1
        );
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&MonitorEvent::AnalyzersDetached));
        assert_eq!(
            events.last(),
            Some(&MonitorEvent::Status(SessionStatus::Closed))
        );
    }

    #[test]
    fn stream_for_stale_call_is_stopped() {
        let (_c, _rx, mut s) = session(LoopbackOptions {
            auto_answer: false,
            ..LoopbackOptions::default()
        });
        s.start();
        s.poll();
        let scene = SyntheticScene::default();
        let stale = crate::synthetic::SyntheticInbound::new(scene);
        let stopped = stale.stop_flag();
        s.on_call_stream(CallId(9), stale);
        assert!(stopped.get());
        assert_eq!(s.state(), SessionState::CallingPeer);
    }
}
