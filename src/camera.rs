//! Captura y ventana con OpenCV

use anyhow::Context;
use opencv::core::{Mat, Point, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};
use tracing::{info, warn};

use crate::frame_loop::{CaptureError, FrameSource, Presenter};
use crate::gesture_debouncer::HandReading;
use crate::landmark_source::{LandmarkError, LandmarkSource};
use crate::mediapipe_bridge::MediaPipeBridge;
use crate::types::{HandDetection, HandLabel, HAND_CONNECTIONS};

impl From<opencv::Error> for CaptureError {
    fn from(e: opencv::Error) -> Self {
        CaptureError::Backend(e.to_string())
    }
}

/// Cámara de OpenCV
pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    released: bool,
}

impl OpenCvCamera {
    pub fn open(index: i32) -> Result<Self, CaptureError> {
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(CaptureError::NotOpened(index));
        }
        info!("✅ Cámara {} abierta", index);
        Ok(Self {
            capture,
            released: false,
        })
    }
}

impl FrameSource for OpenCvCamera {
    type Frame = Mat;

    fn read_frame(&mut self) -> Result<Mat, CaptureError> {
        let mut frame = Mat::default();
        let ok = self.capture.read(&mut frame)?;
        if !ok || frame.empty() {
            return Err(CaptureError::ReadFailed);
        }
        Ok(frame)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.capture.release() {
            warn!("⚠️  Error liberando la cámara: {}", e);
        } else {
            info!("📷 Cámara liberada");
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        FrameSource::release(self);
    }
}

impl LandmarkSource<Mat> for MediaPipeBridge {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<HandDetection>, LandmarkError> {
        let bytes = frame
            .data_bytes()
            .map_err(|e| LandmarkError::InvalidFrame(e.to_string()))?;
        self.detect_raw(
            frame.cols() as u32,
            frame.rows() as u32,
            frame.channels() as u32,
            bytes,
        )
    }

    fn release(&mut self) {
        self.shutdown();
    }
}

/// Ventana de OpenCV con el overlay de landmarks
pub struct OpenCvWindow {
    title: String,
    released: bool,
}

impl OpenCvWindow {
    pub fn open(title: &str) -> anyhow::Result<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .with_context(|| format!("No se pudo crear la ventana {:?}", title))?;
        Ok(Self {
            title: title.to_string(),
            released: false,
        })
    }

    fn draw_hand(frame: &mut Mat, reading: &HandReading) -> opencv::Result<()> {
        let width = frame.cols() as f32;
        let height = frame.rows() as f32;
        let to_pixel = |i: usize| {
            reading
                .landmarks
                .get(i)
                .map(|p| Point::new((p.x * width) as i32, (p.y * height) as i32))
        };

        let bone = Scalar::new(255.0, 255.0, 255.0, 0.0);
        let joint = Scalar::new(0.0, 0.0, 255.0, 0.0);

        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(pa), Some(pb)) = (to_pixel(a), to_pixel(b)) {
                imgproc::line(frame, pa, pb, bone, 2, imgproc::LINE_8, 0)?;
            }
        }
        for i in 0..reading.landmarks.len() {
            if let Some(p) = to_pixel(i) {
                imgproc::circle(frame, p, 4, joint, -1, imgproc::LINE_8, 0)?;
            }
        }

        if let Some(distance) = reading.distance {
            let y = match reading.hand {
                HandLabel::Left => 30,
                HandLabel::Right => 60,
            };
            imgproc::put_text(
                frame,
                &format!("{} dist={:.3}", reading.hand, distance),
                Point::new(10, y),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.7,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                imgproc::LINE_8,
                false,
            )?;
        }

        Ok(())
    }
}

impl Presenter<Mat> for OpenCvWindow {
    fn present(&mut self, frame: &mut Mat, readings: &[HandReading]) -> anyhow::Result<()> {
        for reading in readings {
            Self::draw_hand(frame, reading)?;
        }

        let footer_y = frame.rows() - 10;
        imgproc::put_text(
            frame,
            "Press 'q' or ESC to quit",
            Point::new(10, footer_y),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            Scalar::new(255.0, 255.0, 255.0, 0.0),
            1,
            imgproc::LINE_8,
            false,
        )?;

        highgui::imshow(&self.title, &*frame)?;
        Ok(())
    }

    fn poll_key(&mut self) -> anyhow::Result<Option<i32>> {
        let key = highgui::wait_key(1)?;
        Ok(if key < 0 { None } else { Some(key) })
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = highgui::destroy_window(&self.title) {
            warn!("⚠️  Error cerrando la ventana: {}", e);
        }
    }
}

impl Drop for OpenCvWindow {
    fn drop(&mut self) {
        Presenter::<Mat>::release(self);
    }
}
