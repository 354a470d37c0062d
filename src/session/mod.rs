//! One-to-one call lifecycle with automatic, jittered re-establishment.
//!
//! [`SessionMachine`] is the pure transition table; [`ConnectionSession`]
//! executes its effects against the transport and media capabilities and
//! owns the analyzer bindings.
pub mod analyzer_bindings;
pub mod connection_session;
pub mod detector_settings;
pub mod retry_policy;
pub mod session_effect;
pub mod session_event;
pub mod session_machine;
pub mod session_state;
pub mod session_status;
pub use connection_session::ConnectionSession;
pub use detector_settings::DetectorSettings;
pub use retry_policy::RetryPolicy;
pub use session_effect::SessionEffect;
pub use session_event::SessionEvent;
pub use session_machine::SessionMachine;
pub use session_state::{SessionState, SignalingPhase};
pub use session_status::SessionStatus;
