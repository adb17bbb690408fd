//! Detección de landmarks con MediaPipe Hands en un proceso auxiliar de Python.
//!
//! Protocolo por stdin/stdout:
//! - al arrancar, el auxiliar escribe una línea `READY`
//! - por cada frame se envía una cabecera `u32` little-endian (ancho, alto, canales)
//!   seguida de los bytes BGR crudos
//! - el auxiliar responde con una línea JSON:
//!   `{"hands":[{"label":"Left","landmarks":[[x,y],...]}],"error":null}`

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::landmark_source::{LandmarkError, LandmarkSource};
use crate::types::{BgrImage, HandDetection, HandLabel, LandmarkPoint, NUM_LANDMARKS};

#[derive(Deserialize, Debug)]
struct HandJson {
    label: String,
    landmarks: Vec<[f32; 2]>,
}

#[derive(Deserialize, Debug)]
struct DetectionResponse {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Convierte una línea de respuesta del auxiliar en detecciones.
/// Las manos con etiqueta desconocida se descartan.
pub fn parse_response(line: &str) -> Result<Vec<HandDetection>, LandmarkError> {
    let response: DetectionResponse = serde_json::from_str(line.trim())?;

    if let Some(error) = response.error {
        return Err(LandmarkError::Engine(error));
    }

    let mut detections = Vec::with_capacity(response.hands.len());
    for hand in response.hands {
        let label = match hand.label.parse::<HandLabel>() {
            Ok(label) => label,
            Err(e) => {
                warn!("⚠️  {}", e);
                continue;
            }
        };

        if hand.landmarks.len() != NUM_LANDMARKS {
            debug!(
                "Se esperaban {} landmarks, llegaron {}",
                NUM_LANDMARKS,
                hand.landmarks.len()
            );
        }

        let landmarks = hand
            .landmarks
            .iter()
            .map(|[x, y]| LandmarkPoint::new(*x, *y))
            .collect();
        detections.push(HandDetection::new(label, landmarks));
    }

    Ok(detections)
}

/// Motor de landmarks en un subproceso
pub struct MediaPipeBridge {
    process: Child,
    stdin: ChildStdin,
    stdout_reader: BufReader<ChildStdout>,
    released: bool,
}

impl MediaPipeBridge {
    /// Lanza el auxiliar y espera la señal `READY`
    pub fn spawn(config: &BridgeConfig) -> Result<Self, LandmarkError> {
        if !config.script.exists() {
            return Err(LandmarkError::NotReady(format!(
                "no se encontró el script {:?}",
                config.script
            )));
        }

        info!("🔧 Iniciando MediaPipe Hands ({:?})...", config.script);

        let mut process = Command::new(&config.python)
            .arg(&config.script)
            .arg("--max-hands")
            .arg(config.max_hands.to_string())
            .arg("--min-detection-confidence")
            .arg(config.min_detection_confidence.to_string())
            .arg("--min-tracking-confidence")
            .arg(config.min_tracking_confidence.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(LandmarkError::NotReady(
                    "no se pudieron abrir stdin/stdout del auxiliar".to_string(),
                ));
            }
        };

        let mut bridge = Self {
            process,
            stdin,
            stdout_reader: BufReader::new(stdout),
            released: false,
        };

        let ready = bridge.read_line()?;
        if ready.trim() != "READY" {
            bridge.shutdown();
            return Err(LandmarkError::NotReady(format!(
                "se esperaba READY, llegó {:?}",
                ready.trim()
            )));
        }

        info!("✅ MediaPipe Hands listo");
        Ok(bridge)
    }

    /// Mata y recoge el subproceso. Solo actúa la primera vez.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let _ = self.process.kill();
        let _ = self.process.wait();
        info!("🛑 MediaPipe Hands detenido");
    }

    fn read_line(&mut self) -> Result<String, LandmarkError> {
        let mut line = String::new();
        let read = self.stdout_reader.read_line(&mut line)?;
        if read == 0 {
            return Err(LandmarkError::EngineExited);
        }
        Ok(line)
    }

    /// Envía un frame crudo y devuelve las manos detectadas
    pub fn detect_raw(
        &mut self,
        width: u32,
        height: u32,
        channels: u32,
        data: &[u8],
    ) -> Result<Vec<HandDetection>, LandmarkError> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected || expected == 0 {
            return Err(LandmarkError::InvalidFrame(format!(
                "{}x{}x{} requiere {} bytes, hay {}",
                width,
                height,
                channels,
                expected,
                data.len()
            )));
        }

        self.stdin.write_all(&width.to_le_bytes())?;
        self.stdin.write_all(&height.to_le_bytes())?;
        self.stdin.write_all(&channels.to_le_bytes())?;
        self.stdin.write_all(data)?;
        self.stdin.flush()?;

        let line = self.read_line()?;
        parse_response(&line)
    }
}

impl LandmarkSource<BgrImage> for MediaPipeBridge {
    fn detect(&mut self, frame: &BgrImage) -> Result<Vec<HandDetection>, LandmarkError> {
        self.detect_raw(frame.width, frame.height, frame.channels, &frame.data)
    }

    fn release(&mut self) {
        self.shutdown();
    }
}

impl Drop for MediaPipeBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
