use super::{
    call_id::CallId, inbound_stream::InboundStream, media_factory::PlaceholderStream,
    transport_error::TransportError, transport_event::TransportEvent,
};

/// The signaling server connection plus the call primitive built on it.
///
/// Requests return immediately; outcomes arrive later as [`TransportEvent`]s,
/// either pulled through [`poll_event`](Self::poll_event) or pushed by the
/// host into the session's `on_*` methods.
pub trait SignalingTransport {
    type Inbound: InboundStream;

    /// Creates a signaling handle with an anonymous identity. "Open" follows
    /// asynchronously.
    ///
    /// # Errors
    /// [`TransportError`] if the handle cannot be created.
    fn open(&mut self) -> Result<(), TransportError>;

    /// Reconnects a disconnected but not destroyed handle.
    ///
    /// # Errors
    /// [`TransportError`] if the handle is gone.
    fn reconnect(&mut self) -> Result<(), TransportError>;

    /// Calls `target` offering `local` as the outgoing stream.
    ///
    /// # Errors
    /// [`TransportError`] if the call cannot be started.
    fn call(
        &mut self,
        call: CallId,
        target: &str,
        local: &dyn PlaceholderStream,
    ) -> Result<(), TransportError>;

    /// Closes a call. Idempotent; unknown ids are ignored.
    fn close_call(&mut self, call: CallId);

    /// Destroys the signaling handle and every call on it. Idempotent.
    fn destroy(&mut self);

    /// Next queued event, if any.
    fn poll_event(&mut self) -> Option<TransportEvent<Self::Inbound>> {
        None
    }
}
