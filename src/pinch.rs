use crate::types::{LandmarkPoint, INDEX_FINGER_TIP, THUMB_TIP};

/// Distancia entre la punta del pulgar y la del índice.
/// Devuelve `None` si faltan esos landmarks en la detección.
pub fn pinch_distance(landmarks: &[LandmarkPoint]) -> Option<f32> {
    let thumb_tip = landmarks.get(THUMB_TIP)?;
    let index_tip = landmarks.get(INDEX_FINGER_TIP)?;
    Some(thumb_tip.distance_to(index_tip))
}

/// `true` si la distancia está estrictamente por debajo del umbral
pub fn is_pinching(distance: Option<f32>, threshold: f32) -> bool {
    matches!(distance, Some(d) if d < threshold)
}
