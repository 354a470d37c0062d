use std::sync::mpsc;

use crate::{
    clock::system_clock::unix_millis,
    log::{log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink},
};

/// Cloneable, non-blocking handle to the file [`Logger`](super::logger::Logger).
///
/// Lines below `min_level` are discarded before allocation. When the queue is
/// full the line is dropped rather than stalling the caller's tick.
#[derive(Clone)]
pub struct LoggerHandle {
    pub(super) tx: mpsc::SyncSender<LogMsg>,
    pub(super) min_level: LogLevel,
}

impl LogSink for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        let _ = self.try_log(level, msg, target);
    }
}

impl LoggerHandle {
    /// Attempts to enqueue a line without blocking.
    ///
    /// # Errors
    /// - `TrySendError::Full` when the bounded queue is at capacity.
    /// - `TrySendError::Disconnected` when the writer thread is gone.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), mpsc::TrySendError<LogMsg>> {
        if level < self.min_level {
            return Ok(());
        }
        self.tx
            .try_send(LogMsg::new(level, text, target, unix_millis()))
    }
}
