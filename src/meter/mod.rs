//! Presentation smoothing for level meters: fast attack, sustain hold, linear decay.
pub mod decaying_meter;
pub mod meter_class;
pub mod meter_options;
pub mod meter_sink;
pub use decaying_meter::DecayingMeter;
pub use meter_class::MeterClass;
pub use meter_options::MeterOptions;
pub use meter_sink::MeterSink;
