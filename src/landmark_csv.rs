use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::ReaderBuilder;

use crate::types::{HandDetection, HandLabel, LandmarkPoint, NUM_LANDMARKS};

/// Máximo de frames de una grabación (más de 9 horas a 30 fps)
pub const MAX_RECORDING_FRAMES: usize = 1_000_000;

/// Secuencia grabada: una lista de detecciones por frame
pub type LandmarkRecording = Vec<Vec<HandDetection>>;

/// Carga una grabación de landmarks desde un CSV con el formato
/// frame,hand,landmark,x,y
pub fn load_recording_from_csv(path: impl AsRef<Path>) -> Result<LandmarkRecording> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;
    load_recording(file).with_context(|| format!("CSV inválido: {:?}", path))
}

/// Igual que `load_recording_from_csv` pero desde cualquier lector.
/// Los frames sin filas quedan como frames sin manos.
pub fn load_recording<R: Read>(reader: R) -> Result<LandmarkRecording> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // frame -> mano -> landmark -> punto
    let mut frames: BTreeMap<usize, BTreeMap<HandLabel, BTreeMap<usize, LandmarkPoint>>> =
        BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result.with_context(|| format!("Fila {} inválida", row))?;
        if record.len() < 5 {
            bail!("La fila {} no tiene 5 columnas", row);
        }

        let frame: usize = record[0]
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row))?;
        ensure!(
            frame < MAX_RECORDING_FRAMES,
            "Frame {} fuera de rango en fila {} (máximo {})",
            frame,
            row,
            MAX_RECORDING_FRAMES - 1
        );
        let hand: HandLabel = record[1]
            .parse()
            .with_context(|| format!("mano inválida en fila {}", row))?;
        let landmark: usize = record[2]
            .parse()
            .with_context(|| format!("landmark inválido en fila {}", row))?;
        if landmark >= NUM_LANDMARKS {
            bail!("Landmark {} fuera de rango (fila {})", landmark, row);
        }
        let x: f32 = record[3]
            .parse()
            .with_context(|| format!("x inválida en fila {}", row))?;
        let y: f32 = record[4]
            .parse()
            .with_context(|| format!("y inválida en fila {}", row))?;

        frames
            .entry(frame)
            .or_default()
            .entry(hand)
            .or_default()
            .insert(landmark, LandmarkPoint::new(x, y));
    }

    let Some(&max_frame) = frames.keys().next_back() else {
        return Ok(Vec::new());
    };

    let mut recording = Vec::with_capacity(max_frame + 1);
    for frame_idx in 0..=max_frame {
        let mut detections = Vec::new();
        if let Some(hands) = frames.remove(&frame_idx) {
            for (hand, points) in hands {
                // Los índices deben ser contiguos desde 0
                for (expected, &idx) in points.keys().enumerate() {
                    if idx != expected {
                        bail!(
                            "Frame {} mano {}: falta el landmark {}",
                            frame_idx,
                            hand,
                            expected
                        );
                    }
                }
                detections.push(HandDetection::new(hand, points.into_values().collect()));
            }
        }
        recording.push(detections);
    }

    Ok(recording)
}
