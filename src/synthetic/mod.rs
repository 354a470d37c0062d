//! In-process stand-ins for the transport and media layers: a loopback
//! signaling transport, a scriptable scene that feeds synthetic camera and
//! microphone tracks, and a placeholder-stream factory. They drive the demo
//! binary and the session tests.
pub mod loopback_transport;
pub mod placeholder_factory;
pub mod synthetic_inbound;
pub mod synthetic_scene;
pub use loopback_transport::{LoopbackOptions, LoopbackTransport, TransportOp};
pub use placeholder_factory::{PlaceholderStats, SyntheticPlaceholder, SyntheticPlaceholderFactory};
pub use synthetic_inbound::SyntheticInbound;
pub use synthetic_scene::SyntheticScene;
