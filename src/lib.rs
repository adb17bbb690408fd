pub mod config;
pub mod fan_dispatcher;
pub mod frame_loop;
pub mod gesture_debouncer;
pub mod landmark_csv;
pub mod landmark_source;
pub mod mediapipe_bridge;
pub mod pinch;
pub mod replay;
pub mod serial;
pub mod types;

#[cfg(feature = "camera")]
pub mod camera;

/// Inicializa el registro con `RUST_LOG` o, por defecto, `ventilador=info`
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ventilador=info,replay_csv=info".into()),
        )
        .init();
}
