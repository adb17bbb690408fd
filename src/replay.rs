use tracing::{debug, info};

use crate::frame_loop::{CaptureError, FrameSource, Presenter};
use crate::gesture_debouncer::HandReading;
use crate::landmark_csv::LandmarkRecording;
use crate::landmark_source::{LandmarkError, LandmarkSource};
use crate::types::HandDetection;

/// "Cámara" que entrega índices de frame de una grabación
pub struct ReplayCamera {
    total: usize,
    next: usize,
}

impl ReplayCamera {
    pub fn new(total: usize) -> Self {
        Self { total, next: 0 }
    }
}

impl FrameSource for ReplayCamera {
    type Frame = usize;

    fn read_frame(&mut self) -> Result<usize, CaptureError> {
        if self.next >= self.total {
            return Err(CaptureError::EndOfStream);
        }
        let frame = self.next;
        self.next += 1;
        Ok(frame)
    }
}

/// Detector que devuelve las manos grabadas para cada índice de frame
pub struct ReplayDetector {
    recording: LandmarkRecording,
}

impl ReplayDetector {
    pub fn new(recording: LandmarkRecording) -> Self {
        Self { recording }
    }

    pub fn len(&self) -> usize {
        self.recording.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.is_empty()
    }
}

impl LandmarkSource<usize> for ReplayDetector {
    fn detect(&mut self, frame: &usize) -> Result<Vec<HandDetection>, LandmarkError> {
        self.recording
            .get(*frame)
            .cloned()
            .ok_or_else(|| LandmarkError::InvalidFrame(format!("frame {} fuera de la grabación", frame)))
    }
}

/// Presentador sin ventana: registra lo que se dibujaría
#[derive(Debug, Default)]
pub struct LogPresenter;

impl LogPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Presenter<usize> for LogPresenter {
    fn present(&mut self, frame: &mut usize, readings: &[HandReading]) -> anyhow::Result<()> {
        for reading in readings {
            match reading.distance {
                Some(d) => debug!("[frame {:05}] {} dist={:.3}", frame, reading.hand, d),
                None => debug!("[frame {:05}] {} sin distancia", frame, reading.hand),
            }
            if reading.event.is_some() {
                info!("[frame {:05}] 🤏 pinza {}", frame, reading.hand);
            }
        }
        Ok(())
    }

    fn poll_key(&mut self) -> anyhow::Result<Option<i32>> {
        Ok(None)
    }
}

/// Bytes enviados al ventilador en forma legible, p. ej. `1 0 1`
pub fn describe_sent(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "(ninguno)".to_string();
    }
    bytes
        .iter()
        .map(|b| b.escape_ascii().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fan_dispatcher::MemorySink;
    use crate::frame_loop::{FrameLoop, ShutdownCause};
    use crate::gesture_debouncer::GestureTracker;
    use crate::landmark_csv::load_recording;
    use crate::types::{HandLabel, NUM_LANDMARKS};

    fn recording_csv(frames: &[(HandLabel, f32)]) -> String {
        let mut csv = String::from("frame,hand,landmark,x,y\n");
        for (frame, (hand, distance)) in frames.iter().enumerate() {
            for i in 0..NUM_LANDMARKS {
                let x = if i == 8 { 0.2 + distance } else { 0.2 };
                csv.push_str(&format!("{},{},{},{},0.4\n", frame, hand, i, x));
            }
        }
        csv
    }

    #[test]
    fn camera_reports_end_of_stream() {
        let mut camera = ReplayCamera::new(2);
        assert_eq!(camera.read_frame().unwrap(), 0);
        assert_eq!(camera.read_frame().unwrap(), 1);
        assert!(matches!(camera.read_frame(), Err(CaptureError::EndOfStream)));
    }

    #[test]
    fn replayed_recording_drives_the_fan() {
        let csv = recording_csv(&[
            (HandLabel::Right, 0.05),
            (HandLabel::Right, 0.018),
            (HandLabel::Right, 0.015),
            (HandLabel::Right, 0.021),
            (HandLabel::Right, 0.019),
            (HandLabel::Right, 0.015),
            (HandLabel::Left, 0.005),
        ]);
        let recording = load_recording(csv.as_bytes()).unwrap();
        let detector = ReplayDetector::new(recording);
        let camera = ReplayCamera::new(detector.len());

        let frame_loop = FrameLoop::new(
            MemorySink::new(),
            camera,
            detector,
            LogPresenter::new(),
            GestureTracker::default(),
        );
        let (cause, dispatcher) = frame_loop.run();

        assert!(matches!(cause, ShutdownCause::Fatal(_)));
        assert_eq!(dispatcher.sink().written(), b"10");
        assert_eq!(describe_sent(dispatcher.sink().written()), "1 0");
        assert_eq!(dispatcher.dropped_count(), 0);
    }

    #[test]
    fn describe_sent_handles_empty_and_non_printable() {
        assert_eq!(describe_sent(b""), "(ninguno)");
        assert_eq!(describe_sent(b"1"), "1");
        assert_eq!(describe_sent(&[b'0', 0x07]), "0 \\x07");
    }
}
