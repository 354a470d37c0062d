//! Capabilities the session consumes from the signaling/call library and the
//! media layer. Implementations live outside the core; `synthetic` has fakes.
pub mod call_id;
pub mod inbound_stream;
pub mod media_error;
pub mod media_factory;
pub mod signaling_transport;
pub mod transport_error;
pub mod transport_event;
pub use call_id::CallId;
pub use inbound_stream::InboundStream;
pub use media_error::MediaError;
pub use media_factory::{MediaFactory, PlaceholderStream};
pub use signaling_transport::SignalingTransport;
pub use transport_error::TransportError;
pub use transport_event::TransportEvent;
