use crate::log::log_level::LogLevel;

/// A single log line queued for the file writer.
#[derive(Debug, Clone)]
pub struct LogMsg {
    pub level: LogLevel,
    /// Wall-clock milliseconds since the UNIX epoch.
    pub ts_ms: u64,
    pub text: String,
    /// Module path the line was emitted from.
    pub target: &'static str,
}

impl LogMsg {
    pub fn new(level: LogLevel, text: impl Into<String>, target: &'static str, ts_ms: u64) -> Self {
        Self {
            level,
            ts_ms,
            text: text.into(),
            target,
        }
    }

    /// Formats the line as written to the log file.
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{:?}] {} {} | {}", self.level, self.ts_ms, self.target, self.text)
    }
}
