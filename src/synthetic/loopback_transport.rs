use std::{
    cell::Cell,
    collections::{BTreeSet, VecDeque},
    rc::Rc,
};

use crate::transport::{
    CallId, PlaceholderStream, SignalingTransport, TransportError, TransportEvent,
};

use super::{synthetic_inbound::SyntheticInbound, synthetic_scene::SyntheticScene};

/// Requests the transport received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOp {
    Open,
    Reconnect,
    Call {
        call: CallId,
        target: String,
        tracks: usize,
    },
    CloseCall(CallId),
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopbackOptions {
    /// Report "open" right after `open`/`reconnect`.
    pub auto_open: bool,
    /// Answer every call with a stream showing the scene.
    pub auto_answer: bool,
}

impl Default for LoopbackOptions {
    fn default() -> Self {
        Self {
            auto_open: true,
            auto_answer: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handle {
    None,
    Connecting,
    Open,
    Disconnected,
}

/// Signaling transport that never leaves the process.
///
/// The remote peer is simulated: with the default options every call is
/// answered with a [`SyntheticInbound`] showing the shared scene. Failures
/// are injected through [`drop_call`](Self::drop_call),
/// [`disconnect`](Self::disconnect), [`close_signaling`](Self::close_signaling),
/// [`push`](Self::push) and [`fail_next`](Self::fail_next).
pub struct LoopbackTransport {
    options: LoopbackOptions,
    scene: SyntheticScene,
    handle: Handle,
    queue: VecDeque<TransportEvent<SyntheticInbound>>,
    ops: Vec<TransportOp>,
    open_calls: BTreeSet<CallId>,
    max_concurrent_calls: usize,
    fail_next: Option<TransportError>,
    last_inbound_flag: Option<Rc<Cell<bool>>>,
}

impl LoopbackTransport {
    #[must_use]
    pub fn new(options: LoopbackOptions, scene: SyntheticScene) -> Self {
        Self {
            options,
            scene,
            handle: Handle::None,
            queue: VecDeque::new(),
            ops: Vec::new(),
            open_calls: BTreeSet::new(),
            max_concurrent_calls: 0,
            fail_next: None,
            last_inbound_flag: None,
        }
    }

    /// Queues an arbitrary event for the next poll.
    pub fn push(&mut self, event: TransportEvent<SyntheticInbound>) {
        self.queue.push_back(event);
    }

    /// Makes the next `open`, `reconnect` or `call` fail synchronously.
    pub fn fail_next(&mut self, error: TransportError) {
        self.fail_next = Some(error);
    }

    /// The remote side hangs up.
    pub fn drop_call(&mut self, call: CallId) {
        if self.open_calls.remove(&call) {
            self.queue.push_back(TransportEvent::CallClosed(call));
        }
    }

    /// Answers `call` with a fresh stream, as `auto_answer` would.
    pub fn answer(&mut self, call: CallId) {
        let inbound = SyntheticInbound::new(self.scene.clone());
        self.last_inbound_flag = Some(inbound.stop_flag());
        self.queue.push_back(TransportEvent::CallStream(call, inbound));
    }

    /// The signaling server connection drops; calls stay up.
    pub fn disconnect(&mut self) {
        if self.handle != Handle::None {
            self.handle = Handle::Disconnected;
            self.queue.push_back(TransportEvent::SignalingDisconnected);
        }
    }

    /// The signaling handle is destroyed from the far side, taking its calls along.
    pub fn close_signaling(&mut self) {
        self.handle = Handle::None;
        self.open_calls.clear();
        self.queue.push_back(TransportEvent::SignalingClosed);
    }

    /// Reports "open" for a connecting handle (when `auto_open` is off).
    pub fn complete_open(&mut self) {
        if self.handle == Handle::Connecting {
            self.handle = Handle::Open;
            self.queue.push_back(TransportEvent::SignalingOpen);
        }
    }

    #[must_use]
    pub fn ops(&self) -> &[TransportOp] {
        &self.ops
    }

    #[must_use]
    pub fn open_calls(&self) -> &BTreeSet<CallId> {
        &self.open_calls
    }

    /// Highest number of calls that were ever open at the same time.
    #[must_use]
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_concurrent_calls
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle == Handle::Open
    }

    /// Stop flag of the most recently answered stream.
    #[must_use]
    pub fn last_inbound_stop_flag(&self) -> Option<Rc<Cell<bool>>> {
        self.last_inbound_flag.clone()
    }

    fn connecting(&mut self) {
        self.handle = Handle::Connecting;
        if self.options.auto_open {
            self.complete_open();
        }
    }
}

impl SignalingTransport for LoopbackTransport {
    type Inbound = SyntheticInbound;

    fn open(&mut self) -> Result<(), TransportError> {
        self.ops.push(TransportOp::Open);
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        self.connecting();
        Ok(())
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        self.ops.push(TransportOp::Reconnect);
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        if self.handle == Handle::None {
            return Err(TransportError::Closed);
        }
        self.connecting();
        Ok(())
    }

    fn call(
        &mut self,
        call: CallId,
        target: &str,
        local: &dyn PlaceholderStream,
    ) -> Result<(), TransportError> {
        self.ops.push(TransportOp::Call {
            call,
            target: target.to_owned(),
            tracks: local.track_count(),
        });
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        if self.handle != Handle::Open {
            return Err(TransportError::Rejected("signaling not open".into()));
        }
        if local.track_count() == 0 {
            return Err(TransportError::Rejected("no local tracks".into()));
        }
        self.open_calls.insert(call);
        self.max_concurrent_calls = self.max_concurrent_calls.max(self.open_calls.len());
        if self.options.auto_answer {
            self.answer(call);
        }
        Ok(())
    }

    fn close_call(&mut self, call: CallId) {
        self.ops.push(TransportOp::CloseCall(call));
        self.open_calls.remove(&call);
    }

    fn destroy(&mut self) {
        self.ops.push(TransportOp::Destroy);
        self.handle = Handle::None;
        self.open_calls.clear();
    }

    fn poll_event(&mut self) -> Option<TransportEvent<SyntheticInbound>> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::synthetic::{SyntheticPlaceholderFactory, placeholder_factory::SyntheticPlaceholder};
    use crate::transport::MediaFactory;

    fn placeholder() -> SyntheticPlaceholder {
        SyntheticPlaceholderFactory::default()
            .create_placeholder()
            .unwrap()
    }

    #[test]
    fn open_then_call_is_answered() {
        let mut t = LoopbackTransport::new(LoopbackOptions::default(), SyntheticScene::default());
        t.open().unwrap();
        assert!(matches!(t.poll_event(), Some(TransportEvent::SignalingOpen)));

        t.call(CallId(1), "room", &placeholder()).unwrap();
        assert!(matches!(
            t.poll_event(),
            Some(TransportEvent::CallStream(CallId(1), _))
        ));
        assert_eq!(t.open_calls().len(), 1);
    }

    #[test]
    fn call_before_open_is_rejected() {
        let mut t = LoopbackTransport::new(
            LoopbackOptions {
                auto_open: false,
                auto_answer: false,
            },
            SyntheticScene::default(),
        );
        t.open().unwrap();
        assert!(t.call(CallId(1), "room", &placeholder()).is_err());
        t.complete_open();
        assert!(t.call(CallId(1), "room", &placeholder()).is_ok());
    }

    #[test]
    fn reconnect_needs_a_handle() {
        let mut t = LoopbackTransport::new(LoopbackOptions::default(), SyntheticScene::default());
        assert_eq!(t.reconnect(), Err(TransportError::Closed));
        t.open().unwrap();
        t.disconnect();
        assert!(t.reconnect().is_ok());
        assert!(t.is_open());
    }

    #[test]
    fn only_latest_answer_flag_is_retained() {
        let mut t = LoopbackTransport::new(LoopbackOptions::default(), SyntheticScene::default());
        t.answer(CallId(1));
        t.answer(CallId(2));
        let Some(TransportEvent::CallStream(CallId(1), first)) = t.poll_event() else {
            panic!("expected the first answer");
        };
        let Some(TransportEvent::CallStream(CallId(2), second)) = t.poll_event() else {
            panic!("expected the second answer");
        };
        let kept = t.last_inbound_stop_flag().unwrap();
        assert!(Rc::ptr_eq(&kept, &second.stop_flag()));
        assert!(!Rc::ptr_eq(&kept, &first.stop_flag()));
    }

    #[test]
    fn dropping_unknown_call_queues_nothing() {
        let mut t = LoopbackTransport::new(LoopbackOptions::default(), SyntheticScene::default());
        t.drop_call(CallId(3));
        assert!(t.poll_event().is_none());
    }
}
