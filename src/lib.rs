//! roomwatch is the receiving side of a remote room monitor.
//!
//! One peer streams camera and microphone media; this crate keeps a call to
//! that peer alive over an unreliable signaling transport and turns the
//! received media into debounced "noise" and "motion" alerts, shown through
//! decaying level meters.
//!
//! The transport, the media layer and the UI are capability traits; the
//! `synthetic` module provides in-process implementations used by the
//! `roomwatch` binary and the tests.

/// Spectrum-based loudness analysis with A-weighting.
pub mod audio_analyzer;
/// Millisecond clocks.
pub mod clock;
/// Handles configuration loading and management.
pub mod config;
/// Monitor events, settings and the monitor aggregate.
pub mod core;
/// Alert debouncing and analyzer callbacks shared by both detectors.
pub mod detector;
/// Logging utilities.
pub mod log;
/// Decaying level meters.
pub mod meter;
/// Frame-difference motion analysis.
pub mod motion_analyzer;
/// Meter, toast and status presentation.
pub mod presentation;
/// Call lifecycle state machine and its runtime.
pub mod session;
/// In-process transport and media fakes.
pub mod synthetic;
/// Transport and media capability traits.
pub mod transport;
