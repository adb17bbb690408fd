use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use tracing::info;

use ventilador::config::{DebounceParams, SerialConfig};
use ventilador::fan_dispatcher::{CommandSink, FanDispatcher, MemorySink};
use ventilador::frame_loop::FrameLoop;
use ventilador::gesture_debouncer::GestureTracker;
use ventilador::landmark_csv::load_recording_from_csv;
use ventilador::replay::{describe_sent, LogPresenter, ReplayCamera, ReplayDetector};
use ventilador::serial::SerialSink;

const USAGE: &str = "Uso: replay_csv [--port <dispositivo>] <grabacion.csv>";

struct ReplayOptions {
    csv_path: PathBuf,
    port: Option<String>,
}

fn parse_args() -> Result<ReplayOptions> {
    let mut csv_path: Option<PathBuf> = None;
    let mut port: Option<String> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                port = Some(args.next().ok_or_else(|| anyhow!("{}", USAGE))?);
            }
            _ => {
                if csv_path.is_some() {
                    bail!("{}", USAGE);
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV\n{}", USAGE))?;
    Ok(ReplayOptions { csv_path, port })
}

fn print_summary<S: CommandSink>(dispatcher: &FanDispatcher<S>) {
    println!(
        "\n🏁 Comandos enviados: {}  descartados: {}",
        dispatcher.sent_count(),
        dispatcher.dropped_count()
    );
}

fn main() -> Result<()> {
    ventilador::init_logging();

    let opts = parse_args()?;
    info!("🎞️  Reproduciendo gestos desde {:?}", opts.csv_path);

    let recording = load_recording_from_csv(&opts.csv_path)?;
    let detector = ReplayDetector::new(recording);
    let camera = ReplayCamera::new(detector.len());
    info!("📄 {} frames cargados", detector.len());

    let tracker = GestureTracker::new(DebounceParams::default());

    match opts.port {
        Some(port) => {
            let sink = SerialSink::open(&SerialConfig {
                port,
                ..SerialConfig::default()
            });
            let frame_loop = FrameLoop::new(sink, camera, detector, LogPresenter::new(), tracker);
            let (_cause, dispatcher) = frame_loop.run();
            print_summary(&dispatcher);
        }
        None => {
            let frame_loop = FrameLoop::new(
                MemorySink::new(),
                camera,
                detector,
                LogPresenter::new(),
                tracker,
            );
            let (_cause, dispatcher) = frame_loop.run();
            print_summary(&dispatcher);
            println!(
                "📤 Bytes que se habrían enviado: {}",
                describe_sent(dispatcher.sink().written())
            );
        }
    }

    Ok(())
}
