use std::path::PathBuf;
use std::time::Duration;

/// Umbral de pinza en unidades normalizadas de imagen
pub const PINCH_THRESHOLD: f32 = 0.02;

/// Frames durante los que se ignora una nueva pinza tras disparar
pub const PINCH_COOLDOWN_FRAMES: u32 = 4;

/// Parámetros del antirrebote de gestos
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebounceParams {
    /// Distancia pulgar-índice por debajo de la cual hay pinza (default: 0.02)
    pub pinch_threshold: f32,
    /// Frames de anti-rebote después de disparar (default: 4)
    pub cooldown_frames: u32,
}

impl Default for DebounceParams {
    fn default() -> Self {
        Self {
            pinch_threshold: PINCH_THRESHOLD,
            cooldown_frames: PINCH_COOLDOWN_FRAMES,
        }
    }
}

/// Configuración del puerto serie hacia la placa del ventilador
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub write_timeout: Duration,
    /// Espera tras abrir: la placa se reinicia al abrir el puerto
    pub settle_delay: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/tty.usbserial-210".to_string(),
            baud_rate: 115_200,
            write_timeout: Duration::from_millis(100),
            settle_delay: Duration::from_secs(2),
        }
    }
}

/// Ruta del auxiliar de MediaPipe, anclada al directorio del paquete
pub const DEFAULT_BRIDGE_SCRIPT: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/scripts/hand_landmarks.py");

/// Configuración del proceso auxiliar de MediaPipe
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub python: PathBuf,
    pub script: PathBuf,
    pub max_hands: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("python3"),
            script: PathBuf::from(DEFAULT_BRIDGE_SCRIPT),
            max_hands: 2,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

/// Configuración completa del controlador. Todo son constantes de arranque.
#[derive(Debug, Clone)]
pub struct FanControlConfig {
    pub camera_index: i32,
    pub window_title: String,
    pub debounce: DebounceParams,
    pub serial: SerialConfig,
    pub bridge: BridgeConfig,
}

impl Default for FanControlConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            window_title: "Gesture Fan Control".to_string(),
            debounce: DebounceParams::default(),
            serial: SerialConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}
