//! Millisecond time source shared by the detectors, meters and retry timer.
pub mod manual_clock;
pub mod system_clock;
pub use manual_clock::ManualClock;
pub use system_clock::SystemClock;

/// Monotonic millisecond clock.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}
