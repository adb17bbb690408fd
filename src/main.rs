/*
Control de ventilador por gestos de pinza

1. Captura la cámara con OpenCV
2. Obtiene los landmarks de las manos con MediaPipe (proceso auxiliar de Python)
3. Detecta la pinza pulgar-índice por mano, con anti-rebote por frames
4. Envía el nivel del ventilador por puerto serie ('1' mano derecha, '0' mano izquierda)

Antes de todo, instalar el auxiliar:
    python3 -m pip install mediapipe opencv-python numpy

Para compilar y ejecutar:
    cargo run --release --features camera

Salir con 'q', ESC o Ctrl+C.
*/

use std::process::ExitCode;

use crossbeam_channel::bounded;
use tracing::{error, info, warn};

use ventilador::camera::{OpenCvCamera, OpenCvWindow};
use ventilador::config::FanControlConfig;
use ventilador::frame_loop::{FrameLoop, ShutdownCause};
use ventilador::gesture_debouncer::GestureTracker;
use ventilador::mediapipe_bridge::MediaPipeBridge;
use ventilador::serial::SerialSink;

fn main() -> ExitCode {
    ventilador::init_logging();
    info!("🎯 Control de ventilador por gestos v{}", env!("CARGO_PKG_VERSION"));

    let config = FanControlConfig::default();

    let (tx_interrupt, rx_interrupt) = bounded::<()>(1);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx_interrupt.try_send(());
    }) {
        warn!("⚠️  No se pudo instalar el manejador de Ctrl+C: {}", e);
    }

    // Orden de adquisición: puerto serie, cámara, MediaPipe, ventana.
    // Si algo falla aquí, lo ya adquirido se libera al salir de `main`.
    let sink = SerialSink::open(&config.serial);

    let camera = match OpenCvCamera::open(config.camera_index) {
        Ok(camera) => camera,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::from(1);
        }
    };

    let landmarks = match MediaPipeBridge::spawn(&config.bridge) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("❌ No se pudo iniciar MediaPipe: {}", e);
            return ExitCode::from(1);
        }
    };

    let window = match OpenCvWindow::open(&config.window_title) {
        Ok(window) => window,
        Err(e) => {
            error!("❌ {:#}", e);
            return ExitCode::from(1);
        }
    };

    info!("🎬 Iniciando reconocimiento en tiempo real...");

    let frame_loop = FrameLoop::new(
        sink,
        camera,
        landmarks,
        window,
        GestureTracker::new(config.debounce),
    )
    .with_interrupt(rx_interrupt);

    let (cause, _dispatcher) = frame_loop.run();
    match cause {
        ShutdownCause::QuitKey => info!("👋 Saliendo por teclado"),
        ShutdownCause::Interrupted => info!("👋 Saliendo por Ctrl+C"),
        ShutdownCause::Fatal(_) => info!("👋 Saliendo tras un fallo de captura"),
    }

    info!("✅ Programa terminado");
    ExitCode::SUCCESS
}
