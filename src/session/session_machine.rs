use crate::transport::CallId;

use super::{
    retry_policy::RetryPolicy,
    session_effect::SessionEffect,
    session_event::SessionEvent,
    session_state::{SessionState, SignalingPhase},
    session_status::SessionStatus,
};

/// Transition table of a monitoring session.
///
/// Holds no transport or media objects: every external event is fed to
/// [`handle`](Self::handle), which updates the bookkeeping and returns the
/// effects the caller must perform, in order. Randomness is injected as the
/// `jitter` sample so transitions are reproducible.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    signaling: SignalingPhase,
    active_call: Option<CallId>,
    next_call: u64,
    inbound_bound: bool,
    placeholder_live: bool,
    retry_pending: bool,
    policy: RetryPolicy,
}

impl SessionMachine {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: SessionState::Idle,
            signaling: SignalingPhase::Absent,
            active_call: None,
            next_call: 1,
            inbound_bound: false,
            placeholder_live: false,
            retry_pending: false,
            policy,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn signaling(&self) -> SignalingPhase {
        self.signaling
    }

    #[must_use]
    pub fn active_call(&self) -> Option<CallId> {
        self.active_call
    }

    #[must_use]
    pub fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Applies one event. `jitter` is a sample in `[0, 1)` used only when the
    /// transition schedules a retry.
    pub fn handle(&mut self, event: SessionEvent, jitter: f64) -> Vec<SessionEffect> {
        let mut fx = Vec::new();
        if self.state == SessionState::Destroyed {
            return fx;
        }

        match event {
            SessionEvent::Start => {
                if self.state == SessionState::Idle {
                    self.open_signaling(&mut fx);
                }
            }
            SessionEvent::SignalingOpen => {
                self.signaling = SignalingPhase::Open;
                if self.state == SessionState::ConnectingToServer {
                    self.place_call(&mut fx);
                }
            }
            SessionEvent::SignalingDisconnected => {
                if self.signaling != SignalingPhase::Absent {
                    self.signaling = SignalingPhase::Disconnected;
                }
                // An established call keeps flowing peer to peer without the server.
                if self.active_call.is_none() && self.is_attempting() {
                    self.enter_retry(None, jitter, &mut fx);
                }
            }
            SessionEvent::SignalingError(reason) => {
                if self.is_attempting() {
                    self.teardown_call(&mut fx);
                    self.enter_retry(Some(reason), jitter, &mut fx);
                }
            }
            SessionEvent::SignalingClosed => {
                self.signaling = SignalingPhase::Absent;
                if self.is_attempting() {
                    self.teardown_call(&mut fx);
                    self.enter_retry(None, jitter, &mut fx);
                }
            }
            SessionEvent::CallStream(id) => {
                if self.active_call == Some(id)
                    && matches!(
                        self.state,
                        SessionState::CallingPeer | SessionState::Connected
                    )
                {
                    self.release_inbound(&mut fx);
                    fx.push(SessionEffect::BindAnalyzers(id));
                    self.inbound_bound = true;
                    self.state = SessionState::Connected;
                    fx.push(SessionEffect::Status(SessionStatus::Connected));
                }
            }
            SessionEvent::CallClosed(id) => {
                if self.active_call == Some(id) {
                    self.teardown_call(&mut fx);
                    self.enter_retry(None, jitter, &mut fx);
                }
            }
            SessionEvent::CallError(id, reason) => {
                if self.active_call == Some(id) {
                    self.teardown_call(&mut fx);
                    self.enter_retry(Some(reason), jitter, &mut fx);
                }
            }
            SessionEvent::RetryTimerFired => {
                if self.retry_pending && self.state == SessionState::Retrying {
                    self.retry_pending = false;
                    self.resume(&mut fx);
                }
            }
            SessionEvent::PlaceholderFailed(reason) => {
                // The planned call was never placed.
                self.active_call = None;
                self.placeholder_live = false;
                self.cancel_retry(&mut fx);
                self.destroy_signaling(&mut fx);
                self.state = SessionState::Idle;
                fx.push(SessionEffect::Status(SessionStatus::Failed { reason }));
            }
            SessionEvent::Cleanup => {
                self.cancel_retry(&mut fx);
                self.teardown_call(&mut fx);
                self.destroy_signaling(&mut fx);
                self.state = SessionState::Destroyed;
                fx.push(SessionEffect::Status(SessionStatus::Closed));
            }
        }
        fx
    }

    /// States in which a failure should lead to a retry.
    fn is_attempting(&self) -> bool {
        matches!(
            self.state,
            SessionState::ConnectingToServer | SessionState::CallingPeer | SessionState::Connected
        )
    }

    fn open_signaling(&mut self, fx: &mut Vec<SessionEffect>) {
        fx.push(SessionEffect::OpenSignaling);
        self.signaling = SignalingPhase::Connecting;
        self.state = SessionState::ConnectingToServer;
        fx.push(SessionEffect::Status(SessionStatus::Connecting));
    }

    fn destroy_signaling(&mut self, fx: &mut Vec<SessionEffect>) {
        if self.signaling != SignalingPhase::Absent {
            fx.push(SessionEffect::DestroySignaling);
            self.signaling = SignalingPhase::Absent;
        }
    }

    /// Supersedes any prior call, then places a new one with fresh placeholder media.
    fn place_call(&mut self, fx: &mut Vec<SessionEffect>) {
        self.teardown_call(fx);
        let id = CallId(self.next_call);
        self.next_call += 1;

        fx.push(SessionEffect::CreatePlaceholder);
        self.placeholder_live = true;
        fx.push(SessionEffect::PlaceCall(id));
        self.active_call = Some(id);
        self.state = SessionState::CallingPeer;
        fx.push(SessionEffect::Status(SessionStatus::Calling));
    }

    fn release_inbound(&mut self, fx: &mut Vec<SessionEffect>) {
        if self.inbound_bound {
            // Analyzers let go before the tracks they sample are stopped.
            fx.push(SessionEffect::UnbindAnalyzers);
            fx.push(SessionEffect::ReleaseInbound);
            self.inbound_bound = false;
        }
    }

    fn teardown_call(&mut self, fx: &mut Vec<SessionEffect>) {
        self.release_inbound(fx);
        if let Some(id) = self.active_call.take() {
            fx.push(SessionEffect::CloseCall(id));
        }
        if self.placeholder_live {
            fx.push(SessionEffect::ReleasePlaceholder);
            self.placeholder_live = false;
        }
    }

    fn cancel_retry(&mut self, fx: &mut Vec<SessionEffect>) {
        if self.retry_pending {
            fx.push(SessionEffect::CancelRetry);
            self.retry_pending = false;
        }
    }

    fn enter_retry(&mut self, reason: Option<String>, jitter: f64, fx: &mut Vec<SessionEffect>) {
        self.cancel_retry(fx);
        let delay_ms = self.policy.delay_ms(jitter);
        fx.push(SessionEffect::ScheduleRetry { delay_ms });
        self.retry_pending = true;
        self.state = SessionState::Retrying;

        let status = match reason {
            Some(reason) => SessionStatus::ErrorRetrying { reason },
            None => SessionStatus::Retrying {
                delay_secs: delay_ms.div_ceil(1_000),
            },
        };
        fx.push(SessionEffect::Status(status));
    }

    /// Retry timer fired: pick up from whatever the signaling handle can still do.
    fn resume(&mut self, fx: &mut Vec<SessionEffect>) {
        match self.signaling {
            SignalingPhase::Open => self.place_call(fx),
            SignalingPhase::Disconnected => {
                fx.push(SessionEffect::ReconnectSignaling);
                self.signaling = SignalingPhase::Connecting;
                self.state = SessionState::ConnectingToServer;
                fx.push(SessionEffect::Status(SessionStatus::Connecting));
            }
            SignalingPhase::Connecting => {
                // Never reached "open" within a full retry window: start over.
                self.destroy_signaling(fx);
                self.open_signaling(fx);
            }
            SignalingPhase::Absent => self.open_signaling(fx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SessionEffect as E;

    fn machine() -> SessionMachine {
        SessionMachine::new(RetryPolicy::default())
    }

    /// Drives a machine to `Connected` on its first call.
    fn connected() -> SessionMachine {
        let mut m = machine();
        m.handle(SessionEvent::Start, 0.0);
        m.handle(SessionEvent::SignalingOpen, 0.0);
        m.handle(SessionEvent::CallStream(CallId(1)), 0.0);
        assert_eq!(m.state(), SessionState::Connected);
        m
    }

    fn count_schedules(fx: &[SessionEffect]) -> usize {
        fx.iter()
            .filter(|e| matches!(e, E::ScheduleRetry { .. }))
            .count()
    }

    #[test]
    fn start_opens_signaling() {
        let mut m = machine();
        let fx = m.handle(SessionEvent::Start, 0.0);
        assert_eq!(
            fx,
            vec![E::OpenSignaling, E::Status(SessionStatus::Connecting)]
        );
        assert_eq!(m.state(), SessionState::ConnectingToServer);
        assert!(m.handle(SessionEvent::Start, 0.0).is_empty());
    }

    #[test]
    fn open_places_call_with_placeholder() {
        let mut m = machine();
        m.handle(SessionEvent::Start, 0.0);
        let fx = m.handle(SessionEvent::SignalingOpen, 0.0);
        assert_eq!(
            fx,
            vec![
                E::CreatePlaceholder,
                E::PlaceCall(CallId(1)),
                E::Status(SessionStatus::Calling)
            ]
        );
        assert_eq!(m.state(), SessionState::CallingPeer);
    }

    #[test]
    fn stream_binds_analyzers_and_rebinds_on_second_stream() {
        let mut m = connected();
        let fx = m.handle(SessionEvent::CallStream(CallId(1)), 0.0);
        assert_eq!(
            fx,
            vec![
                E::UnbindAnalyzers,
                E::ReleaseInbound,
                E::BindAnalyzers(CallId(1)),
                E::Status(SessionStatus::Connected)
            ]
        );
    }

    #[test]
    fn call_close_tears_down_in_order_and_schedules_retry() {
        let mut m = connected();
        let fx = m.handle(SessionEvent::CallClosed(CallId(1)), 0.5);
        assert_eq!(
            fx,
            vec![
                E::UnbindAnalyzers,
                E::ReleaseInbound,
                E::CloseCall(CallId(1)),
                E::ReleasePlaceholder,
                E::ScheduleRetry { delay_ms: 6_250 },
                E::Status(SessionStatus::Retrying { delay_secs: 7 }),
            ]
        );
        assert_eq!(m.state(), SessionState::Retrying);
        assert_eq!(m.active_call(), None);
    }

    #[test]
    fn duplicate_close_does_not_schedule_twice() {
        let mut m = connected();
        let first = m.handle(SessionEvent::CallClosed(CallId(1)), 0.1);
        let second = m.handle(SessionEvent::CallClosed(CallId(1)), 0.9);
        assert_eq!(count_schedules(&first), 1);
        assert!(second.is_empty());
        assert!(m.retry_pending());
    }

    #[test]
    fn call_error_reports_reason() {
        let mut m = connected();
        let fx = m.handle(SessionEvent::CallError(CallId(1), "ice failed".into()), 0.0);
        assert_eq!(
            fx.last(),
            Some(&E::Status(SessionStatus::ErrorRetrying {
                reason: "ice failed".into()
            }))
        );
    }

    #[test]
    fn disconnect_without_call_retries() {
        let mut m = machine();
        m.handle(SessionEvent::Start, 0.0);
        let fx = m.handle(SessionEvent::SignalingDisconnected, 0.2);
        assert_eq!(count_schedules(&fx), 1);
        assert_eq!(m.state(), SessionState::Retrying);

        // A second disconnect while already waiting changes nothing.
        assert!(m.handle(SessionEvent::SignalingDisconnected, 0.2).is_empty());
    }

    #[test]
    fn disconnect_with_live_call_keeps_call() {
        let mut m = connected();
        let fx = m.handle(SessionEvent::SignalingDisconnected, 0.0);
        assert!(fx.is_empty());
        assert_eq!(m.state(), SessionState::Connected);
        assert_eq!(m.signaling(), SignalingPhase::Disconnected);
    }

    #[test]
    fn retry_with_open_signaling_calls_again_with_new_id() {
        let mut m = connected();
        m.handle(SessionEvent::CallClosed(CallId(1)), 0.0);
        let fx = m.handle(SessionEvent::RetryTimerFired, 0.0);
        assert_eq!(
            fx,
            vec![
                E::CreatePlaceholder,
                E::PlaceCall(CallId(2)),
                E::Status(SessionStatus::Calling)
            ]
        );
    }

    #[test]
    fn retry_after_destroyed_signaling_recreates_handle() {
        let mut m = connected();
        m.handle(SessionEvent::SignalingClosed, 0.0);
        let fx = m.handle(SessionEvent::RetryTimerFired, 0.0);
        assert_eq!(
            fx,
            vec![E::OpenSignaling, E::Status(SessionStatus::Connecting)]
        );
        assert_eq!(m.state(), SessionState::ConnectingToServer);
    }

    #[test]
    fn retry_after_disconnect_reconnects_handle() {
        let mut m = machine();
        m.handle(SessionEvent::Start, 0.0);
        m.handle(SessionEvent::SignalingOpen, 0.0);
        m.handle(SessionEvent::CallClosed(CallId(1)), 0.0);
        m.handle(SessionEvent::SignalingDisconnected, 0.0);
        let fx = m.handle(SessionEvent::RetryTimerFired, 0.0);
        assert_eq!(fx[0], E::ReconnectSignaling);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut m = connected();
        assert!(m.handle(SessionEvent::RetryTimerFired, 0.0).is_empty());
    }

    #[test]
    fn events_from_superseded_call_are_ignored() {
        let mut m = connected();
        m.handle(SessionEvent::CallClosed(CallId(1)), 0.0);
        m.handle(SessionEvent::RetryTimerFired, 0.0);
        assert!(m.handle(SessionEvent::CallStream(CallId(1)), 0.0).is_empty());
        assert!(m.handle(SessionEvent::CallError(CallId(1), "late".into()), 0.0).is_empty());
        assert_eq!(m.active_call(), Some(CallId(2)));
    }

    #[test]
    fn placeholder_failure_stops_without_retry() {
        let mut m = machine();
        m.handle(SessionEvent::Start, 0.0);
        m.handle(SessionEvent::SignalingOpen, 0.0);
        let fx = m.handle(SessionEvent::PlaceholderFailed("no audio context".into()), 0.0);
        assert_eq!(count_schedules(&fx), 0);
        assert!(fx.contains(&E::DestroySignaling));
        assert_eq!(m.state(), SessionState::Idle);
        assert_eq!(m.active_call(), None);

        // The caller may start over explicitly.
        assert_eq!(m.handle(SessionEvent::Start, 0.0)[0], E::OpenSignaling);
    }

    #[test]
    fn cleanup_releases_everything_and_is_terminal() {
        let mut m = connected();
        m.handle(SessionEvent::SignalingDisconnected, 0.0);
        let fx = m.handle(SessionEvent::Cleanup, 0.0);
        assert_eq!(
            fx,
            vec![
                E::UnbindAnalyzers,
                E::ReleaseInbound,
                E::CloseCall(CallId(1)),
                E::ReleasePlaceholder,
                E::DestroySignaling,
                E::Status(SessionStatus::Closed),
            ]
        );
        assert_eq!(m.state(), SessionState::Destroyed);
        assert!(m.handle(SessionEvent::Start, 0.0).is_empty());
        assert!(m.handle(SessionEvent::Cleanup, 0.0).is_empty());
    }

    #[test]
    fn cleanup_cancels_pending_retry() {
        let mut m = connected();
        m.handle(SessionEvent::CallClosed(CallId(1)), 0.0);
        let fx = m.handle(SessionEvent::Cleanup, 0.0);
        assert_eq!(fx[0], E::CancelRetry);
        assert!(!m.retry_pending());
    }

    #[test]
    fn never_more_than_one_active_call() {
        let mut m = machine();
        let mut open = 0i32;
        let mut max_open = 0;
        let script = [
            SessionEvent::Start,
            SessionEvent::SignalingOpen,
            SessionEvent::SignalingOpen,
            SessionEvent::CallStream(CallId(1)),
            SessionEvent::CallError(CallId(1), "x".into()),
            SessionEvent::RetryTimerFired,
            SessionEvent::SignalingError("peer unavailable".into()),
            SessionEvent::RetryTimerFired,
            SessionEvent::CallStream(CallId(3)),
            SessionEvent::Cleanup,
        ];
        for event in script {
            for effect in m.handle(event, 0.3) {
                match effect {
                    E::PlaceCall(_) => open += 1,
                    E::CloseCall(_) => open -= 1,
                    _ => {}
                }
                max_open = max_open.max(open);
            }
        }
        assert_eq!(max_open, 1);
        assert_eq!(open, 0);
    }
}
