use crossbeam_channel::{Receiver, TryRecvError};
use thiserror::Error;
use tracing::{info, warn};

use crate::fan_dispatcher::{CommandSink, FanDispatcher};
use crate::gesture_debouncer::{GestureTracker, HandReading};
use crate::landmark_source::LandmarkSource;

/// Código de la tecla Escape tal como lo devuelve el bucle de ventana
pub const KEY_ESCAPE: i32 = 27;

/// `q` o Escape terminan el programa
pub fn is_quit_key(key: i32) -> bool {
    let key = key & 0xFF;
    key == b'q' as i32 || key == KEY_ESCAPE
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No se pudo abrir la cámara {0}")]
    NotOpened(i32),

    #[error("No se pudo leer un frame de la cámara")]
    ReadFailed,

    #[error("Fin de la secuencia de frames")]
    EndOfStream,

    #[error("Error del backend de captura: {0}")]
    Backend(String),
}

/// Dispositivo de captura
pub trait FrameSource {
    type Frame;

    fn read_frame(&mut self) -> Result<Self::Frame, CaptureError>;

    fn release(&mut self) {}
}

/// Superficie de presentación: overlay, ventana y teclado
pub trait Presenter<F> {
    fn present(&mut self, frame: &mut F, readings: &[HandReading]) -> anyhow::Result<()>;

    /// Sondeo no bloqueante de teclado
    fn poll_key(&mut self) -> anyhow::Result<Option<i32>>;

    fn release(&mut self) {}
}

/// Resultado de una iteración del bucle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    QuitRequested,
    FatalError(String),
}

/// Por qué terminó el bucle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    QuitKey,
    Interrupted,
    Fatal(String),
}

/// Controlador del bucle de frames. Es dueño de todos los recursos adquiridos
/// y los libera una sola vez al terminar `run`, pase lo que pase.
pub struct FrameLoop<C, L, P, S>
where
    C: FrameSource,
    L: LandmarkSource<C::Frame>,
    P: Presenter<C::Frame>,
    S: CommandSink,
{
    dispatcher: FanDispatcher<S>,
    camera: C,
    landmarks: L,
    presenter: P,
    tracker: GestureTracker,
    interrupt: Option<Receiver<()>>,
    frames: u64,
}

impl<C, L, P, S> FrameLoop<C, L, P, S>
where
    C: FrameSource,
    L: LandmarkSource<C::Frame>,
    P: Presenter<C::Frame>,
    S: CommandSink,
{
    /// Los recursos se pasan en orden de adquisición: canal de salida,
    /// cámara, motor de landmarks y ventana.
    pub fn new(sink: S, camera: C, landmarks: L, presenter: P, tracker: GestureTracker) -> Self {
        Self {
            dispatcher: FanDispatcher::new(sink),
            camera,
            landmarks,
            presenter,
            tracker,
            interrupt: None,
            frames: 0,
        }
    }

    /// Canal por el que llega la señal de interrupción (Ctrl+C)
    pub fn with_interrupt(mut self, interrupt: Receiver<()>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &FanDispatcher<S> {
        &self.dispatcher
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Una iteración: leer frame → landmarks → antirrebote → despacho → presentar → teclado
    pub fn step(&mut self) -> LoopControl {
        // El fallo se registra una sola vez, en `run`
        let mut frame = match self.camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => return LoopControl::FatalError(e.to_string()),
        };
        self.frames += 1;

        let detections = match self.landmarks.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                warn!("⚠️  Fallo en la detección de manos: {}", e);
                Vec::new()
            }
        };

        let readings = self.tracker.update(&detections);
        for event in readings.iter().filter_map(|r| r.event.as_ref()) {
            self.dispatcher.dispatch(event);
        }

        if let Err(e) = self.presenter.present(&mut frame, &readings) {
            warn!("⚠️  Error dibujando el frame: {}", e);
        }

        match self.presenter.poll_key() {
            Ok(Some(key)) if is_quit_key(key) => {
                info!("🔚 Tecla de salida detectada");
                LoopControl::QuitRequested
            }
            Ok(_) => LoopControl::Continue,
            Err(e) => {
                warn!("⚠️  Error leyendo el teclado: {}", e);
                LoopControl::Continue
            }
        }
    }

    fn interrupted(&self) -> bool {
        match &self.interrupt {
            Some(rx) => match rx.try_recv() {
                Ok(()) => true,
                Err(TryRecvError::Empty) => false,
                // El manejador de señales desapareció: no hay forma de interrumpir
                Err(TryRecvError::Disconnected) => false,
            },
            None => false,
        }
    }

    /// Ejecuta el bucle hasta salir y libera los recursos en orden inverso
    pub fn run(mut self) -> (ShutdownCause, FanDispatcher<S>) {
        let cause = loop {
            if self.interrupted() {
                info!("⏹️  Interrupción recibida, saliendo");
                break ShutdownCause::Interrupted;
            }

            match self.step() {
                LoopControl::Continue => {}
                LoopControl::QuitRequested => break ShutdownCause::QuitKey,
                LoopControl::FatalError(reason) => {
                    warn!("⚠️  Bucle detenido: {}", reason);
                    break ShutdownCause::Fatal(reason);
                }
            }
        };

        info!(
            "📊 Frames procesados={} comandos enviados={} descartados={}",
            self.frames,
            self.dispatcher.sent_count(),
            self.dispatcher.dropped_count()
        );

        self.presenter.release();
        self.landmarks.release();
        self.camera.release();
        self.dispatcher.sink_mut().close();

        (cause, self.dispatcher)
    }
}
