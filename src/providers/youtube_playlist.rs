use async_trait::async_trait;
use std::sync::Arc;

use super::{is_direct_url, SearchResult, SearchStrategy};
use crate::backend::{AudioBackend, Loaded};
use crate::error::PlayerError;
use crate::nodes::Node;

/// Variante de playlist de YouTube: devuelve la colección completa
pub struct YouTubePlaylistProvider {
    backend: Arc<dyn AudioBackend>,
}

impl YouTubePlaylistProvider {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SearchStrategy for YouTubePlaylistProvider {
    async fn search(&self, query: &str, node: &Node) -> Result<SearchResult, PlayerError> {
        let identifier = if is_direct_url(query) {
            query.to_string()
        } else {
            format!("ytsearch:{query}")
        };

        match self.backend.load(node, &identifier).await? {
            Loaded::Playlist { name, tracks } => Ok(SearchResult::Playlist { name, tracks }),
            Loaded::Track(_) | Loaded::Search(_) => Err(PlayerError::BackendError(
                "se esperaba una playlist, el backend devolvió tracks sueltos".to_string(),
            )),
            Loaded::Empty => Ok(SearchResult::Tracks(Vec::new())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "YouTube Playlist"
    }
}
