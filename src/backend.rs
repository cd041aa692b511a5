use async_trait::async_trait;

use crate::error::PlayerError;
use crate::nodes::Node;
use crate::providers::Track;

/// Resultado de una carga de tracks en el backend
#[derive(Debug, Clone)]
pub enum Loaded {
    Track(Track),
    Playlist { name: String, tracks: Vec<Track> },
    Search(Vec<Track>),
    Empty,
}

/// RPC opaco de búsqueda/carga contra un nodo del backend de streaming.
///
/// La implementación concreta (REST de Lavalink, etc.) vive fuera del
/// núcleo; aquí solo importa el contrato. Un `BackendError` significa que
/// el contenido no se pudo cargar, no que el nodo esté caído.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn load(&self, node: &Node, identifier: &str) -> Result<Loaded, PlayerError>;
}
