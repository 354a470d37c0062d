//! Frame-difference motion detection with a Laplacian high-pass stage.
pub mod frame_error;
pub mod frame_source;
pub mod gray_frame;
pub mod laplacian;
pub mod motion_analyzer;
pub mod motion_config;
pub use frame_error::FrameError;
pub use frame_source::VideoFrameSource;
pub use gray_frame::GrayFrame;
pub use motion_analyzer::{MotionAnalyzer, MotionReading};
pub use motion_config::MotionConfig;
