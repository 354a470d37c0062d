use crate::{
    config::Config,
    log::{log_level::LogLevel, log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};

/// Flush every line when tracing so a crash leaves the tail on disk.
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 1;

#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 64;

const DEFAULT_QUEUE_CAP: usize = 4_096;

/// Bounded, non-blocking logger writing to one file per process.
///
/// Producers enqueue through a [`LoggerHandle`]; a single `logger-worker`
/// thread drains the queue and writes. The monitoring core itself stays
/// single-threaded: this worker is the only thread the crate spawns.
pub struct Logger {
    handle: LoggerHandle,
    file_path: PathBuf,
    _thread: Option<thread::JoinHandle<()>>,
}

impl Logger {
    /// Starts the logger from the `[Logging]` section.
    ///
    /// Recognized keys: `log_path` (directory, `~` expanded), `log_filename`
    /// (file prefix) and `level`. Missing keys fall back to `./logs`,
    /// `roomwatch` and `info`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let dir = config
            .get_non_empty("Logging", "log_path")
            .map_or_else(|| PathBuf::from("logs"), expand_path);
        let prefix = config.get_non_empty_or_default("Logging", "log_filename", "roomwatch");
        let level = config
            .get_non_empty("Logging", "level")
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Info);
        Self::start_in_dir(dir, prefix, level, DEFAULT_QUEUE_CAP)
    }

    /// Creates `dir` if needed and spawns the writer thread.
    ///
    /// The file is named `<prefix>-<unix_secs>-pid<pid>.log`. If it cannot be
    /// opened the worker falls back to a file in the temp dir, then to a sink;
    /// it never panics.
    pub fn start_in_dir<D: AsRef<Path>>(
        dir: D,
        prefix: &str,
        min_level: LogLevel,
        cap: usize,
    ) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let secs = crate::clock::system_clock::unix_millis() / 1_000;
        let file_path = dir.join(format!("{prefix}-{secs}-pid{}.log", std::process::id()));

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap.max(1));
        let worker_path = file_path.clone();

        let thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || run_writer(&worker_path, &rx))
            .ok();

        Self {
            handle: LoggerHandle { tx, min_level },
            file_path,
            _thread: thread,
        }
    }

    /// Returns a cloneable handle usable as `Arc<dyn LogSink>`.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

fn run_writer(path: &Path, rx: &mpsc::Receiver<LogMsg>) {
    let writer: Box<dyn Write + Send> = match OpenOptions::new().create(true).append(true).open(path)
    {
        Ok(f) => Box::new(f),
        Err(_) => {
            let fallback = std::env::temp_dir().join("roomwatch-fallback.log");
            match OpenOptions::new().create(true).append(true).open(&fallback) {
                Ok(f) => Box::new(f),
                Err(_) => Box::new(io::sink()),
            }
        }
    };
    let mut out = BufWriter::new(writer);
    let mut written: u32 = 0;

    while let Ok(msg) = rx.recv() {
        let _ = writeln!(&mut out, "{}", msg.render());
        written = written.wrapping_add(1);
        if written % FLUSH_BATCH_SIZE == 0 || msg.level >= LogLevel::Warn {
            let _ = out.flush();
        }
    }
    let _ = out.flush();
}

/// Expands a leading `~` to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(PathBuf::from);

    match (path_str, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") || p.starts_with("~\\") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
