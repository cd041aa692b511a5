pub mod soundcloud;
pub mod spotify;
pub mod youtube;
pub mod youtube_music;
pub mod youtube_playlist;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub use soundcloud::SoundCloudProvider;
pub use spotify::SpotifyProvider;
pub use youtube::YouTubeProvider;
pub use youtube_music::YouTubeMusicProvider;
pub use youtube_playlist::YouTubePlaylistProvider;

use crate::backend::AudioBackend;
use crate::error::PlayerError;
use crate::nodes::Node;

/// Miniatura usada cuando el track no trae una propia
pub const DEFAULT_THUMBNAIL: &str =
    "https://cdn.discordapp.com/attachments/776345413132877854/940540758442795028/unknown.png";

/// Referencia inmutable a un track.
///
/// Un solo tipo para todos los proveedores: cada estrategia lo puebla en
/// la frontera y el resto del núcleo (cola, render) nunca vuelve a
/// preguntar de qué proveedor salió.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    title: String,
    author: String,
    uri: String,
    thumbnail: Option<String>,
    /// Duración en segundos
    length: u64,
}

impl Track {
    pub fn new(title: String, author: String, uri: String, length: u64) -> Self {
        Self {
            title,
            author,
            uri,
            thumbnail: None,
            length,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: String) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn thumbnail_or_default(&self) -> &str {
        self.thumbnail.as_deref().unwrap_or(DEFAULT_THUMBNAIL)
    }
}

/// Resultado de una búsqueda resuelta por una estrategia
#[derive(Debug, Clone)]
pub enum SearchResult {
    Tracks(Vec<Track>),
    Playlist { name: String, tracks: Vec<Track> },
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        match self {
            SearchResult::Tracks(tracks) => tracks.is_empty(),
            SearchResult::Playlist { tracks, .. } => tracks.is_empty(),
        }
    }

    pub fn into_tracks(self) -> Vec<Track> {
        match self {
            SearchResult::Tracks(tracks) => tracks,
            SearchResult::Playlist { tracks, .. } => tracks,
        }
    }
}

/// Estrategia de búsqueda de un proveedor contra un nodo concreto
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    async fn search(&self, query: &str, node: &Node) -> Result<SearchResult, PlayerError>;

    fn provider_name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchStrategy")
            .field("provider_name", &self.provider_name())
            .finish()
    }
}

/// Clave del proveedor por defecto
pub const DEFAULT_PROVIDER: &str = "yt";
const PLAYLIST_PROVIDER: &str = "ytpl";

/// Registro de proveedores: clave → estrategia de búsqueda
pub struct ProviderRegistry {
    strategies: HashMap<&'static str, Arc<dyn SearchStrategy>>,
}

impl ProviderRegistry {
    /// Registro con los cinco proveedores de serie sobre el backend dado
    pub fn with_defaults(backend: Arc<dyn AudioBackend>) -> Self {
        let mut registry = Self {
            strategies: HashMap::new(),
        };
        registry.register("yt", Arc::new(YouTubeProvider::new(backend.clone())));
        registry.register("ytpl", Arc::new(YouTubePlaylistProvider::new(backend.clone())));
        registry.register("ytmusic", Arc::new(YouTubeMusicProvider::new(backend.clone())));
        registry.register("soundcloud", Arc::new(SoundCloudProvider::new(backend.clone())));
        registry.register("spotify", Arc::new(SpotifyProvider::new(backend)));
        registry
    }

    pub fn register(&mut self, key: &'static str, strategy: Arc<dyn SearchStrategy>) {
        self.strategies.insert(key, strategy);
    }

    pub fn resolve(&self, key: &str) -> Result<Arc<dyn SearchStrategy>, PlayerError> {
        self.strategies
            .get(key)
            .cloned()
            .ok_or_else(|| PlayerError::UnknownProvider(key.to_string()))
    }

    /// Regla de forma de query: con el proveedor por defecto y una query
    /// que referencia una playlist, se resuelve la variante de playlist.
    /// Es una propiedad de la forma de la query, no de la estrategia.
    pub fn effective_key<'a>(&self, key: &'a str, query: &str) -> &'a str {
        if key == DEFAULT_PROVIDER && query.contains("playlist") {
            PLAYLIST_PROVIDER
        } else {
            key
        }
    }
}

/// `true` si la query es un enlace directo y debe pasar sin prefijo de
/// búsqueda al backend
pub(crate) fn is_direct_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}
