use async_trait::async_trait;

use crate::error::PlayerError;
use crate::loops::LoopMode;
use crate::providers::Track;

/// Transporte de voz: el canal ya conectado sobre el que se reproduce.
///
/// El manejo de la conexión en sí (gateway, reconexión) queda fuera del
/// núcleo; la sesión solo emite órdenes y lee estado.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    async fn play(&self, track: &Track) -> Result<(), PlayerError>;
    async fn stop(&self) -> Result<(), PlayerError>;
    async fn set_pause(&self, pause: bool) -> Result<(), PlayerError>;
    async fn seek(&self, position_ms: u64) -> Result<(), PlayerError>;
    async fn set_volume(&self, volume: u16) -> Result<(), PlayerError>;
    async fn disconnect(&self) -> Result<(), PlayerError>;

    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
    /// Posición actual en segundos
    fn position(&self) -> u64;
    /// Duración del track actual en segundos
    fn track_length(&self) -> u64;
}

/// Datos de "ahora suena" que el front end renderiza como quiera
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub uri: String,
    pub author: String,
    pub thumbnail: String,
    /// Duración formateada mm:ss
    pub duration: String,
    pub loop_mode: LoopMode,
    pub volume: u16,
    pub next_up: Option<String>,
}

/// Destino de notificaciones del canal de texto vinculado
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, now_playing: NowPlaying) -> Result<(), PlayerError>;
}

/// Formatea segundos como mm:ss
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(225), "3:45");
        assert_eq!(format_duration(3600), "60:00");
    }
}
