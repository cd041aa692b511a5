use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::providers::Track;

/// Identificador de guild (agnóstico del framework de chat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuildId(pub u64);

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identificador del canal de voz al que está vinculada una sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Eventos de ciclo de vida emitidos por el orquestador.
///
/// Son notificaciones fire-and-forget hacia la capa del bot: el núcleo
/// nunca espera a los suscriptores.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    NodeFail { node_id: String },
    PlayerConnect { guild_id: GuildId },
    PlayerStop { guild_id: GuildId },
    PlayerPause { guild_id: GuildId },
    PlayerResume { guild_id: GuildId },
    TrackSkip { guild_id: GuildId },
    PlayerSeek { guild_id: GuildId, old_pos: u64, new_pos: u64 },
    TrackStart { guild_id: GuildId, track: Track },
}

impl PlayerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::NodeFail { .. } => "node_fail",
            PlayerEvent::PlayerConnect { .. } => "player_connect",
            PlayerEvent::PlayerStop { .. } => "player_stop",
            PlayerEvent::PlayerPause { .. } => "player_pause",
            PlayerEvent::PlayerResume { .. } => "player_resume",
            PlayerEvent::TrackSkip { .. } => "track_skip",
            PlayerEvent::PlayerSeek { .. } => "player_seek",
            PlayerEvent::TrackStart { .. } => "track_start",
        }
    }
}

/// Destino inyectable de eventos (reemplaza al dispatcher global del bot)
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PlayerEvent);
}

/// Sink que descarta todo; útil cuando el front end no escucha eventos
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, event: PlayerEvent) {
        debug!("📣 Evento descartado: {}", event.name());
    }
}

/// Sink sobre un canal mpsc sin límite.
///
/// Si el receptor ya no existe el envío se descarta en silencio: que no
/// quede nadie escuchando no es un fallo del orquestador.
pub struct ChannelSink {
    tx: UnboundedSender<PlayerEvent>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<PlayerEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }
}
