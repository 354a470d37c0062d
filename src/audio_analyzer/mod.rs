//! Perceptually weighted loudness detection on a lent audio track.
pub mod a_weighting;
pub mod analysis_node;
pub mod audio_analyzer_options;
pub mod audio_level_analyzer;
pub mod pcm_analyser_node;
pub use analysis_node::AudioAnalysisNode;
pub use audio_analyzer_options::AudioAnalyzerOptions;
pub use audio_level_analyzer::AudioLevelAnalyzer;
pub use pcm_analyser_node::{PcmAnalyserNode, PcmSource};
