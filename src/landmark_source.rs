use thiserror::Error;

use crate::types::HandDetection;

#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("El motor de landmarks no está listo: {0}")]
    NotReady(String),

    #[error("El motor de landmarks terminó inesperadamente")]
    EngineExited,

    #[error("Error del motor de landmarks: {0}")]
    Engine(String),

    #[error("Frame inválido: {0}")]
    InvalidFrame(String),
}

/// Fuente de landmarks de manos. El modelo de confianza es opaco:
/// los umbrales se fijan al construir la fuente.
pub trait LandmarkSource<F: ?Sized> {
    /// Detecta cero o más manos en el frame. El orden no es significativo.
    fn detect(&mut self, frame: &F) -> Result<Vec<HandDetection>, LandmarkError>;

    /// Libera el motor. Se llama una sola vez al apagar.
    fn release(&mut self) {}
}

impl<F: ?Sized, L: LandmarkSource<F> + ?Sized> LandmarkSource<F> for Box<L> {
    fn detect(&mut self, frame: &F) -> Result<Vec<HandDetection>, LandmarkError> {
        (**self).detect(frame)
    }

    fn release(&mut self) {
        (**self).release()
    }
}
