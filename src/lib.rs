//! Núcleo de orquestación de reproducción musical por guild.
//!
//! Se ubica entre la superficie de comandos de un bot de chat y un
//! backend remoto de streaming de audio: mantiene la cola ordenada de
//! tracks, conduce la reproducción secuencial con semántica de loop,
//! resuelve búsquedas contra múltiples proveedores con failover
//! automático entre nodos y emite eventos de ciclo de vida.
//!
//! El parser de comandos, el transporte de voz y el render de UI quedan
//! fuera: entran como implementaciones de [`transport::VoiceTransport`],
//! [`transport::NotificationSink`], [`backend::AudioBackend`] y
//! [`events::EventSink`].

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod loops;
pub mod nodes;
pub mod player;
pub mod providers;
pub mod queue;
pub mod search;
pub mod transport;

pub use config::Config;
pub use error::PlayerError;
pub use events::{ChannelId, EventSink, GuildId, PlayerEvent};
pub use loops::LoopMode;
pub use nodes::{Node, NodeDescriptor, NodePool};
pub use player::{PlayerSession, SessionRegistry};
pub use providers::{ProviderRegistry, SearchResult, Track};
pub use queue::PlaybackQueue;
pub use search::{Enqueued, SearchCoordinator, SearchOutcome};
pub use transport::{NotificationSink, NowPlaying, VoiceTransport};

/// Instala un subscriber de tracing con filtro por entorno.
///
/// Conveniencia para embedders y tests; es inocuo si ya hay un
/// subscriber global instalado.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
