use std::io::Write;
use std::thread;

use serialport::SerialPort;
use tracing::{info, warn};

use crate::config::SerialConfig;
use crate::fan_dispatcher::{CommandSink, SinkError};

/// Puerto serie hacia la placa del ventilador.
/// Se abre una vez al arrancar y no se reconecta nunca.
pub struct SerialSink {
    name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialSink {
    /// Abre el puerto. Si falla, devuelve un sink cerrado en vez de abortar:
    /// la detección sigue funcionando aunque el ventilador no responda.
    pub fn open(config: &SerialConfig) -> Self {
        let result = serialport::new(&config.port, config.baud_rate)
            .timeout(config.write_timeout)
            .open();

        match result {
            Ok(port) => {
                // La placa se reinicia al abrir el puerto
                thread::sleep(config.settle_delay);
                info!("✅ Puerto serie abierto: {} @ {} baudios", config.port, config.baud_rate);
                Self {
                    name: config.port.clone(),
                    port: Some(port),
                }
            }
            Err(e) => {
                warn!("⚠️  No se pudo abrir el puerto serie {}: {}", config.port, e);
                Self::disconnected(&config.port)
            }
        }
    }

    /// Sink sin puerto: todos los comandos se descartan
    pub fn disconnected(name: &str) -> Self {
        Self {
            name: name.to_string(),
            port: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CommandSink for SerialSink {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError> {
        let port = self.port.as_mut().ok_or(SinkError::NotOpen)?;
        port.write_all(&[byte])?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(port) = self.port.take() {
            drop(port);
            info!("🔌 Puerto serie cerrado: {}", self.name);
        }
    }
}

impl Drop for SerialSink {
    fn drop(&mut self) {
        self.close();
    }
}
