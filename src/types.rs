use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Número de landmarks que entrega el modelo de manos por cada mano
pub const NUM_LANDMARKS: usize = 21;

/// Punta del pulgar
pub const THUMB_TIP: usize = 4;

/// Punta del índice
pub const INDEX_FINGER_TIP: usize = 8;

/// Conexiones entre landmarks para dibujar el esqueleto de la mano
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Mano detectada. Es la clave de todo el estado por mano.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandLabel {
    Left,
    Right,
}

impl HandLabel {
    /// Ambas manos, en el orden en que se procesan cada frame
    pub const ALL: [HandLabel; 2] = [HandLabel::Left, HandLabel::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            HandLabel::Left => "Left",
            HandLabel::Right => "Right",
        }
    }
}

impl fmt::Display for HandLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Etiqueta de mano desconocida: {0:?}")]
pub struct UnknownHandLabel(pub String);

impl FromStr for HandLabel {
    type Err = UnknownHandLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("left") {
            Ok(HandLabel::Left)
        } else if trimmed.eq_ignore_ascii_case("right") {
            Ok(HandLabel::Right)
        } else {
            Err(UnknownHandLabel(s.to_string()))
        }
    }
}

/// Punto 2D normalizado a [0, 1] en coordenadas de imagen
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distancia euclídea a otro punto
    pub fn distance_to(&self, other: &LandmarkPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Una mano detectada en un frame: etiqueta + 21 landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct HandDetection {
    pub hand: HandLabel,
    pub landmarks: Vec<LandmarkPoint>,
}

impl HandDetection {
    pub fn new(hand: HandLabel, landmarks: Vec<LandmarkPoint>) -> Self {
        Self { hand, landmarks }
    }
}

/// Nivel del ventilador. Se codifica como un dígito ASCII en el puerto serie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanCommand {
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl FanCommand {
    /// Solo los niveles 0..=3 son válidos
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(FanCommand::Off),
            1 => Some(FanCommand::Low),
            2 => Some(FanCommand::Medium),
            3 => Some(FanCommand::High),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Byte que se escribe en el puerto: '0'..'3'
    pub fn as_ascii(self) -> u8 {
        b'0' + self.level()
    }
}

impl fmt::Display for FanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FanCommand::Off => "OFF",
            FanCommand::Low => "LOW",
            FanCommand::Medium => "MEDIUM",
            FanCommand::High => "HIGH",
        };
        write!(f, "{} ({})", name, self.level())
    }
}

/// Imagen BGR entrelazada de 8 bits, tal como la consume el motor de landmarks
#[derive(Debug, Clone, Default)]
pub struct BgrImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_label_parses_engine_labels() {
        assert_eq!("Left".parse::<HandLabel>(), Ok(HandLabel::Left));
        assert_eq!("right".parse::<HandLabel>(), Ok(HandLabel::Right));
        assert_eq!(" Right ".parse::<HandLabel>(), Ok(HandLabel::Right));
        assert!("Both".parse::<HandLabel>().is_err());
    }

    #[test]
    fn fan_command_levels_and_ascii() {
        assert_eq!(FanCommand::Off.as_ascii(), b'0');
        assert_eq!(FanCommand::Low.as_ascii(), b'1');
        assert_eq!(FanCommand::High.as_ascii(), b'3');
        assert_eq!(FanCommand::from_level(2), Some(FanCommand::Medium));
        assert_eq!(FanCommand::from_level(4), None);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = LandmarkPoint::new(0.0, 0.0);
        let b = LandmarkPoint::new(0.3, 0.4);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-6);
    }
}
