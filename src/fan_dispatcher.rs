use thiserror::Error;
use tracing::{info, warn};

use crate::gesture_debouncer::PinchEvent;
use crate::types::{FanCommand, HandLabel};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("El canal de salida no está abierto")]
    NotOpen,

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),
}

/// Canal de salida orientado a bytes (el puerto serie del ventilador)
pub trait CommandSink {
    fn is_open(&self) -> bool;

    /// Escribe un único byte, sin marco ni terminador
    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError>;

    /// Libera el canal. Llamarlo más de una vez no tiene efecto.
    fn close(&mut self);
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError> {
        (**self).write_byte(byte)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Política fija: mano derecha → LOW, mano izquierda → OFF.
/// MEDIUM y HIGH quedan reservados para gestos futuros.
pub fn command_for(hand: HandLabel) -> FanCommand {
    match hand {
        HandLabel::Right => FanCommand::Low,
        HandLabel::Left => FanCommand::Off,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    SinkClosed,
    WriteFailed,
}

/// Resultado de un despacho. Nunca es un error: los fallos se descartan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent(FanCommand),
    Dropped {
        command: FanCommand,
        reason: DropReason,
    },
}

/// Traduce eventos de pinza a comandos y los envía sin esperar confirmación
pub struct FanDispatcher<S: CommandSink> {
    sink: S,
    sent: u64,
    dropped: u64,
}

impl<S: CommandSink> FanDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            sent: 0,
            dropped: 0,
        }
    }

    pub fn dispatch(&mut self, event: &PinchEvent) -> DispatchOutcome {
        let command = command_for(event.hand);
        info!(
            "✋ Pinza con mano {} (dist={:.3}) -> FAN {}",
            event.hand, event.distance, command
        );
        self.send(command)
    }

    pub fn send(&mut self, command: FanCommand) -> DispatchOutcome {
        if !self.sink.is_open() {
            warn!("⚠️  Puerto serie no abierto, se descarta el comando {}", command);
            return self.record_drop(command, DropReason::SinkClosed);
        }

        match self.sink.write_byte(command.as_ascii()) {
            Ok(()) => {
                self.sent += 1;
                info!("➡️  Enviado comando de ventilador: {}", command.level());
                DispatchOutcome::Sent(command)
            }
            Err(e) => {
                warn!("⚠️  Fallo enviando el comando {}: {}", command, e);
                self.record_drop(command, DropReason::WriteFailed)
            }
        }
    }

    fn record_drop(&mut self, command: FanCommand, reason: DropReason) -> DispatchOutcome {
        self.dropped += 1;
        DispatchOutcome::Dropped { command, reason }
    }

    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Sink en memoria: guarda los bytes escritos. Útil para replays y tests.
#[derive(Debug)]
pub struct MemorySink {
    open: bool,
    written: Vec<u8>,
    close_calls: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            open: true,
            written: Vec::new(),
            close_calls: 0,
        }
    }

    /// Sink que nunca llegó a abrirse
    pub fn closed() -> Self {
        Self {
            open: false,
            written: Vec::new(),
            close_calls: 0,
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSink for MemorySink {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        self.written.push(byte);
        Ok(())
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Sink abierto cuyas escrituras siempre fallan
    struct BrokenSink;

    impl CommandSink for BrokenSink {
        fn is_open(&self) -> bool {
            true
        }

        fn write_byte(&mut self, _byte: u8) -> Result<(), SinkError> {
            Err(SinkError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "cable suelto")))
        }

        fn close(&mut self) {}
    }

    fn pinch(hand: HandLabel) -> PinchEvent {
        PinchEvent {
            hand,
            distance: 0.01,
        }
    }

    #[test]
    fn mapping_is_fixed_per_hand() {
        assert_eq!(command_for(HandLabel::Right), FanCommand::Low);
        assert_eq!(command_for(HandLabel::Left), FanCommand::Off);
    }

    #[test]
    fn dispatch_writes_single_ascii_digit() {
        let mut dispatcher = FanDispatcher::new(MemorySink::new());

        assert_eq!(
            dispatcher.dispatch(&pinch(HandLabel::Right)),
            DispatchOutcome::Sent(FanCommand::Low)
        );
        assert_eq!(
            dispatcher.dispatch(&pinch(HandLabel::Left)),
            DispatchOutcome::Sent(FanCommand::Off)
        );

        assert_eq!(dispatcher.sink().written(), b"10");
        assert_eq!(dispatcher.sent_count(), 2);
        assert_eq!(dispatcher.dropped_count(), 0);
    }

    #[test]
    fn closed_sink_drops_once_per_command() {
        let mut dispatcher = FanDispatcher::new(MemorySink::closed());

        let outcome = dispatcher.dispatch(&pinch(HandLabel::Right));
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped {
                command: FanCommand::Low,
                reason: DropReason::SinkClosed,
            }
        );
        assert_eq!(dispatcher.dropped_count(), 1);

        dispatcher.dispatch(&pinch(HandLabel::Left));
        assert_eq!(dispatcher.dropped_count(), 2);
        assert!(dispatcher.sink().written().is_empty());
    }

    #[test]
    fn sink_closed_mid_run_drops_later_commands() {
        let mut dispatcher = FanDispatcher::new(MemorySink::new());
        dispatcher.dispatch(&pinch(HandLabel::Right));
        dispatcher.sink_mut().close();
        dispatcher.dispatch(&pinch(HandLabel::Right));

        assert_eq!(dispatcher.sent_count(), 1);
        assert_eq!(dispatcher.dropped_count(), 1);
        assert_eq!(dispatcher.sink().written(), b"1");
    }

    #[test]
    fn write_failure_is_dropped_not_propagated() {
        let mut dispatcher = FanDispatcher::new(BrokenSink);
        assert_eq!(
            dispatcher.send(FanCommand::High),
            DispatchOutcome::Dropped {
                command: FanCommand::High,
                reason: DropReason::WriteFailed,
            }
        );
        assert_eq!(dispatcher.dropped_count(), 1);
    }
}
