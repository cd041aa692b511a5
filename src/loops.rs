use crate::error::PlayerError;

/// Modo de loop: gobierna qué pasa cuando termina un track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Off,
    CurrentTrack,
    Playlist,
}

impl LoopMode {
    /// Ciclo automático: Off → CurrentTrack → Playlist → Off.
    ///
    /// `Playlist` solo es alcanzable con tracks pendientes en la cola;
    /// si la precondición no se cumple el ciclo salta a `Off`.
    pub fn cycle(self, queue_len: usize) -> LoopMode {
        let next = match self {
            LoopMode::Off => LoopMode::CurrentTrack,
            LoopMode::CurrentTrack => LoopMode::Playlist,
            LoopMode::Playlist => LoopMode::Off,
        };

        if next == LoopMode::Playlist && queue_len == 0 {
            LoopMode::Off
        } else {
            next
        }
    }

    /// Interpreta el token de usuario del comando de loop
    pub fn parse(token: &str) -> Result<LoopMode, PlayerError> {
        match token.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(LoopMode::Off),
            "track" | "current" => Ok(LoopMode::CurrentTrack),
            "queue" | "playlist" => Ok(LoopMode::Playlist),
            _ => Err(PlayerError::InvalidLoopMode),
        }
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoopMode::Off => "off",
            LoopMode::CurrentTrack => "track",
            LoopMode::Playlist => "queue",
        };
        write!(f, "{name}")
    }
}
