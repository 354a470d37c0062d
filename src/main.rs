//! Simulated monitoring run.
//!
//! Connects to a loopback peer whose room is scripted to move, make noise and
//! drop the call now and then, and prints what the monitor shows.
//!
//! Usage: `roomwatch [config-file]` (defaults to `roomwatch.conf`, then to
//! built-in settings). The `[Demo]` section sets `duration_secs` and
//! `realtime`; without `realtime` the run uses simulated time and finishes
//! immediately.

use std::{env, sync::Arc, thread, time::Duration};

use roomwatch::{
    clock::{Clock, ManualClock, SystemClock},
    config::Config,
    core::{Monitor, MonitorSettings, MonitorView},
    detector::AlertChannel,
    log::{LogSink, logger::Logger},
    meter::{MeterClass, MeterSink},
    presentation::AlertSink,
    session::SessionStatus,
    sink_info, sink_warn,
    synthetic::{
        LoopbackOptions, LoopbackTransport, SyntheticPlaceholderFactory, SyntheticScene,
        synthetic_scene::Block,
    },
    transport::CallId,
};

const FRAME_MS: u64 = 16;
const DEFAULT_DURATION_SECS: u64 = 40;

/// Prints a line whenever the meter changes class.
struct StdoutMeter {
    name: &'static str,
    class: MeterClass,
    clock: Arc<dyn Clock>,
}

impl MeterSink for StdoutMeter {
    fn render(&mut self, level: f32, class: MeterClass) {
        if class != self.class {
            self.class = class;
            println!("{} {:>6} meter {class:?} ({level:.2})", stamp(self.clock.as_ref()), self.name);
        }
    }
}

struct StdoutAlerts {
    clock: Arc<dyn Clock>,
}

impl AlertSink for StdoutAlerts {
    fn show_alert(&mut self, channel: AlertChannel) {
        println!("{} ALERT  {channel} detected", stamp(self.clock.as_ref()));
    }

    fn dismiss_alert(&mut self, channel: AlertChannel) {
        println!("{}        {channel} alert cleared", stamp(self.clock.as_ref()));
    }

    fn show_status(&mut self, status: &SessionStatus) {
        println!("{} status {status}", stamp(self.clock.as_ref()));
    }
}

fn stamp(clock: &dyn Clock) -> String {
    let ms = clock.now_ms();
    format!("[{:>3}.{:03}]", ms / 1_000, ms % 1_000)
}

/// What the simulated room does at a given second.
fn script_scene(scene: &SyntheticScene, transport: &mut LoopbackTransport, second: u64) {
    match second {
        6 => scene.place_block(Block {
            x: 20,
            y: 20,
            size: 40,
            value: 255,
            checker: 2,
        }),
        7 => scene.place_block(Block {
            x: 90,
            y: 50,
            size: 40,
            value: 10,
            checker: 2,
        }),
        8 => scene.clear_block(),
        12 => {
            scene.set_tone(2_500.0, 0.5);
            scene.set_noise(0.4);
        }
        14 => scene.silence(),
        18 => transport.drop_call(CallId(1)),
        30 => transport.disconnect(),
        _ => {}
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => Config::load(path),
        None => Config::load("roomwatch.conf"),
    }
    .unwrap_or_else(|e| {
        eprintln!("{e}. Using built-in settings.");
        Config::empty()
    });

    let logger = Logger::from_config(&config);
    let log_sink: Arc<dyn LogSink> = Arc::new(logger.handle());
    sink_info!(log_sink, "[Main] logging to {}", logger.file_path().display());

    let settings = MonitorSettings::from_config(&config, log_sink.as_ref());
    let duration_secs = match config.parsed::<u64>("Demo", "duration_secs") {
        Some(Ok(secs)) => secs,
        Some(Err(raw)) => {
            sink_warn!(log_sink, "[Main] duration_secs = {raw:?} is not a number");
            DEFAULT_DURATION_SECS
        }
        None => DEFAULT_DURATION_SECS,
    };
    let realtime = matches!(config.parsed_bool("Demo", "realtime"), Some(Ok(true)));

    let manual = Arc::new(ManualClock::new(0));
    let clock: Arc<dyn Clock> = if realtime {
        Arc::new(SystemClock::new())
    } else {
        manual.clone()
    };

    let scene = SyntheticScene::default();
    let mut monitor = Monitor::new(
        &settings,
        LoopbackTransport::new(LoopbackOptions::default(), scene.clone()),
        SyntheticPlaceholderFactory::default(),
        MonitorView {
            audio_meter: StdoutMeter {
                name: "audio",
                class: MeterClass::Normal,
                clock: clock.clone(),
            },
            motion_meter: StdoutMeter {
                name: "motion",
                class: MeterClass::Normal,
                clock: clock.clone(),
            },
            alerts: StdoutAlerts {
                clock: clock.clone(),
            },
        },
        clock.clone(),
        log_sink.clone(),
    );

    println!(
        "roomwatch: watching room {} for {duration_secs}s ({})",
        settings.room_id,
        if realtime { "realtime" } else { "simulated" }
    );
    monitor.start();

    let end_ms = duration_secs * 1_000;
    let mut second = 0;
    while clock.now_ms() < end_ms {
        let this_second = clock.now_ms() / 1_000;
        if this_second != second {
            second = this_second;
            script_scene(&scene, monitor.session_mut().transport_mut(), second);
        }
        monitor.on_frame();
        if realtime {
            thread::sleep(Duration::from_millis(FRAME_MS));
        } else {
            manual.advance(FRAME_MS);
        }
    }

    monitor.cleanup();
    sink_info!(log_sink, "[Main] run finished");
}
