use tracing::debug;

use crate::config::DebounceParams;
use crate::pinch::{is_pinching, pinch_distance};
use crate::types::{HandDetection, HandLabel, LandmarkPoint};

/// Estado de anti-rebote de una mano. Vive todo el proceso y se muta una vez por frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandGestureState {
    /// `true` mientras una pinza está bloqueada para no volver a disparar
    pub active: bool,
    /// Frames futuros en los que una nueva pinza se ignora
    pub cooldown_remaining: u32,
}

impl HandGestureState {
    /// Paso de decaimiento. Se ejecuta cada frame, haya detección o no.
    pub fn decay(&mut self) {
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        } else {
            self.active = false;
        }
    }

    /// Detección de flanco: dispara solo si hay pinza y no estamos bloqueados.
    /// Devuelve `true` si este frame produce un evento nuevo.
    pub fn observe(&mut self, pinching: bool, cooldown_frames: u32) -> bool {
        if pinching && !self.active {
            self.active = true;
            self.cooldown_remaining = cooldown_frames;
            true
        } else {
            false
        }
    }
}

/// Evento "empezó una pinza" para una mano
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchEvent {
    pub hand: HandLabel,
    pub distance: f32,
}

/// Lectura de una mano detectada en un frame (para overlay y despacho)
#[derive(Debug, Clone, PartialEq)]
pub struct HandReading {
    pub hand: HandLabel,
    pub distance: Option<f32>,
    pub landmarks: Vec<LandmarkPoint>,
    pub event: Option<PinchEvent>,
}

/// Máquina de estados de pinza para las dos manos
pub struct GestureTracker {
    params: DebounceParams,
    left: HandGestureState,
    right: HandGestureState,
}

impl GestureTracker {
    pub fn new(params: DebounceParams) -> Self {
        Self {
            params,
            left: HandGestureState::default(),
            right: HandGestureState::default(),
        }
    }

    pub fn params(&self) -> DebounceParams {
        self.params
    }

    pub fn state(&self, hand: HandLabel) -> HandGestureState {
        match hand {
            HandLabel::Left => self.left,
            HandLabel::Right => self.right,
        }
    }

    fn state_mut(&mut self, hand: HandLabel) -> &mut HandGestureState {
        match hand {
            HandLabel::Left => &mut self.left,
            HandLabel::Right => &mut self.right,
        }
    }

    /// Decae el cooldown de ambas manos. Debe ir antes de cualquier `observe` del frame.
    pub fn begin_frame(&mut self) {
        for hand in HandLabel::ALL {
            self.state_mut(hand).decay();
        }
    }

    /// Evalúa una mano detectada en el frame actual.
    /// Sin distancia (landmarks incompletos) se trata como "sin pinza".
    pub fn observe(&mut self, hand: HandLabel, distance: Option<f32>) -> Option<PinchEvent> {
        let threshold = self.params.pinch_threshold;
        let cooldown = self.params.cooldown_frames;
        let pinching = is_pinching(distance, threshold);

        let fired = self.state_mut(hand).observe(pinching, cooldown);
        match (fired, distance) {
            (true, Some(distance)) => {
                debug!(%hand, distance, "pinza detectada, cooldown de {} frames", cooldown);
                Some(PinchEvent { hand, distance })
            }
            _ => None,
        }
    }

    /// Paso completo de un frame: decaimiento de ambas manos y luego cada detección
    pub fn update(&mut self, detections: &[HandDetection]) -> Vec<HandReading> {
        self.begin_frame();

        detections
            .iter()
            .map(|detection| {
                let distance = pinch_distance(&detection.landmarks);
                if distance.is_none() {
                    debug!(
                        hand = %detection.hand,
                        landmarks = detection.landmarks.len(),
                        "detección incompleta, se trata como sin pinza"
                    );
                }
                let event = self.observe(detection.hand, distance);
                HandReading {
                    hand: detection.hand,
                    distance,
                    landmarks: detection.landmarks.clone(),
                    event,
                }
            })
            .collect()
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DebounceParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{INDEX_FINGER_TIP, NUM_LANDMARKS, THUMB_TIP};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn detection(hand: HandLabel, distance: f32) -> HandDetection {
        let mut landmarks = vec![LandmarkPoint::new(0.5, 0.5); NUM_LANDMARKS];
        landmarks[THUMB_TIP] = LandmarkPoint::new(0.4, 0.4);
        landmarks[INDEX_FINGER_TIP] = LandmarkPoint::new(0.4 + distance, 0.4);
        HandDetection::new(hand, landmarks)
    }

    fn state(active: bool, cooldown_remaining: u32) -> HandGestureState {
        HandGestureState {
            active,
            cooldown_remaining,
        }
    }

    #[test]
    fn scenario_trace_fires_once_at_frame_one() {
        let mut tracker = GestureTracker::default();
        let distances = [0.05, 0.018, 0.015, 0.021, 0.019, 0.015];

        // (estado tras el decaimiento, disparo esperado, estado al final del frame)
        let expected = [
            (state(false, 0), false, state(false, 0)),
            (state(false, 0), true, state(true, 4)),
            (state(true, 3), false, state(true, 3)),
            (state(true, 2), false, state(true, 2)),
            (state(true, 1), false, state(true, 1)),
            // cooldown llega a 0 pero `active` sigue puesto: no vuelve a disparar
            (state(true, 0), false, state(true, 0)),
        ];

        for (frame, (&d, &(after_decay, fires, after_frame))) in
            distances.iter().zip(expected.iter()).enumerate()
        {
            tracker.begin_frame();
            assert_eq!(
                tracker.state(HandLabel::Right),
                after_decay,
                "decay en frame {}",
                frame
            );
            let event = tracker.observe(HandLabel::Right, Some(d));
            assert_eq!(event.is_some(), fires, "disparo en frame {}", frame);
            assert_eq!(
                tracker.state(HandLabel::Right),
                after_frame,
                "fin de frame {}",
                frame
            );
        }

        // Frame 6: ahora sí se libera y una pinza vuelve a disparar
        tracker.begin_frame();
        assert_eq!(tracker.state(HandLabel::Right), state(false, 0));
        assert!(tracker.observe(HandLabel::Right, Some(0.015)).is_some());
    }

    #[test]
    fn held_pinch_fires_exactly_once() {
        let mut tracker = GestureTracker::default();
        let mut events = Vec::new();
        for frame in 0..30 {
            let readings = tracker.update(&[detection(HandLabel::Left, 0.005)]);
            if readings[0].event.is_some() {
                events.push(frame);
            }
        }
        assert_eq!(events, vec![0]);
    }

    #[test]
    fn undetected_hand_still_decays() {
        let mut tracker = GestureTracker::default();
        let cooldown = tracker.params().cooldown_frames;

        let readings = tracker.update(&[detection(HandLabel::Right, 0.01)]);
        assert!(readings[0].event.is_some());

        // La mano sale del encuadre durante `cooldown` frames
        for _ in 0..cooldown {
            let readings = tracker.update(&[]);
            assert!(readings.is_empty());
        }
        assert_eq!(tracker.state(HandLabel::Right), state(true, 0));

        // Al reaparecer, el decaimiento del frame la libera y dispara de nuevo
        let readings = tracker.update(&[detection(HandLabel::Right, 0.01)]);
        assert_eq!(tracker.state(HandLabel::Right), state(true, cooldown));
        assert!(readings[0].event.is_some());
    }

    #[test]
    fn reentering_hand_does_not_bypass_cooldown() {
        let mut tracker = GestureTracker::default();
        assert!(tracker.update(&[detection(HandLabel::Right, 0.01)])[0]
            .event
            .is_some());

        tracker.update(&[]);
        let readings = tracker.update(&[detection(HandLabel::Right, 0.01)]);
        assert!(readings[0].event.is_none());
    }

    #[test]
    fn hands_are_independent() {
        let mut tracker = GestureTracker::default();
        let readings = tracker.update(&[
            detection(HandLabel::Left, 0.01),
            detection(HandLabel::Right, 0.01),
        ]);
        assert!(readings.iter().all(|r| r.event.is_some()));

        let readings = tracker.update(&[detection(HandLabel::Left, 0.01)]);
        assert!(readings[0].event.is_none());
        assert_eq!(tracker.state(HandLabel::Right), state(true, 3));
    }

    #[test]
    fn duplicated_label_fires_at_most_once_per_frame() {
        let mut tracker = GestureTracker::default();
        let readings = tracker.update(&[
            detection(HandLabel::Right, 0.01),
            detection(HandLabel::Right, 0.001),
        ]);
        let fired = readings.iter().filter(|r| r.event.is_some()).count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn incomplete_detection_is_not_a_pinch() {
        let mut tracker = GestureTracker::default();
        let broken = HandDetection::new(HandLabel::Left, vec![LandmarkPoint::default(); 5]);
        let readings = tracker.update(&[broken]);
        assert_eq!(readings[0].distance, None);
        assert!(readings[0].event.is_none());
        assert_eq!(tracker.state(HandLabel::Left), state(false, 0));
    }

    #[test]
    fn decay_on_idle_hand_is_idempotent() {
        let mut s = HandGestureState::default();
        s.decay();
        assert_eq!(s, state(false, 0));
        s.decay();
        assert_eq!(s, state(false, 0));
    }

    #[test]
    fn events_are_spaced_by_more_than_cooldown() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let params = DebounceParams::default();

        for _ in 0..50 {
            let mut tracker = GestureTracker::new(params);
            let mut last_event: Option<usize> = None;

            for frame in 0..200 {
                let detections = if rng.gen_bool(0.8) {
                    vec![detection(HandLabel::Right, rng.gen_range(0.0..0.04))]
                } else {
                    Vec::new()
                };

                let readings = tracker.update(&detections);
                if readings.iter().any(|r| r.event.is_some()) {
                    if let Some(prev) = last_event {
                        assert!(
                            frame - prev > params.cooldown_frames as usize,
                            "eventos en frames {} y {}",
                            prev,
                            frame
                        );
                    }
                    last_event = Some(frame);
                }
            }
        }
    }
}
