use async_trait::async_trait;
use std::sync::Arc;

use super::{is_direct_url, SearchResult, SearchStrategy};
use crate::backend::{AudioBackend, Loaded};
use crate::error::PlayerError;
use crate::nodes::Node;

/// Catálogo de YouTube Music
pub struct YouTubeMusicProvider {
    backend: Arc<dyn AudioBackend>,
}

impl YouTubeMusicProvider {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SearchStrategy for YouTubeMusicProvider {
    async fn search(&self, query: &str, node: &Node) -> Result<SearchResult, PlayerError> {
        let identifier = if is_direct_url(query) {
            query.to_string()
        } else {
            format!("ytmsearch:{query}")
        };

        match self.backend.load(node, &identifier).await? {
            Loaded::Track(track) => Ok(SearchResult::Tracks(vec![track])),
            Loaded::Search(tracks) => {
                Ok(SearchResult::Tracks(tracks.into_iter().take(1).collect()))
            }
            Loaded::Playlist { .. } => Err(PlayerError::BackendError(
                "se esperaba un track, el backend devolvió una playlist".to_string(),
            )),
            Loaded::Empty => Ok(SearchResult::Tracks(Vec::new())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "YouTube Music"
    }
}
