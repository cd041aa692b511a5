use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::PlayerError;
use crate::events::{EventSink, PlayerEvent};
use crate::nodes::NodePool;
use crate::player::PlayerSession;
use crate::providers::{ProviderRegistry, SearchResult};

/// Resultado tipado de la búsqueda coordinada.
///
/// "No se encontró nada" es un resultado, no un error: hay exactamente
/// un camino de mensaje al usuario para las queries sin resultados.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(SearchResult),
    NotFound,
}

/// Resumen de lo que entró a la cola, para el mensaje de respuesta
#[derive(Debug, Clone, PartialEq)]
pub enum Enqueued {
    Track { title: String },
    Playlist { name: String, count: usize },
    NotFound,
}

/// Coordina la búsqueda con failover entre nodos.
///
/// Un timeout marca al nodo como insalubre y lo saca de rotación; un
/// error reportado por el backend significa que el contenido era malo y
/// el resto de nodos todavía vale la pena.
pub struct SearchCoordinator {
    pool: Arc<NodePool>,
    registry: Arc<ProviderRegistry>,
    events: Arc<dyn EventSink>,
    search_timeout: Duration,
}

impl SearchCoordinator {
    pub fn new(
        pool: Arc<NodePool>,
        registry: Arc<ProviderRegistry>,
        events: Arc<dyn EventSink>,
        search_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            registry,
            events,
            search_timeout,
        }
    }

    /// Busca `raw_query` con el proveedor indicado (override explícito o
    /// el de la sesión), probando nodos en orden de menor carga.
    pub async fn search(
        &self,
        raw_query: &str,
        provider_override: Option<&str>,
        default_provider: &str,
    ) -> Result<SearchOutcome, PlayerError> {
        // Los enlaces pegados por usuarios suelen venir como <https://...>
        let query = raw_query.trim().trim_matches(|c| c == '<' || c == '>');

        let key = provider_override.unwrap_or(default_provider);
        let key = self.registry.effective_key(key, query);
        let strategy = self.registry.resolve(key)?;

        info!("🔍 Buscando `{}` vía {}", query, strategy.provider_name());

        for node in self.pool.candidates() {
            let bounded = tokio::time::timeout(self.search_timeout, strategy.search(query, &node));

            match bounded.await {
                Ok(Ok(result)) => {
                    if result.is_empty() {
                        return Ok(SearchOutcome::NotFound);
                    }
                    debug!("✅ Resultados desde el nodo {}", node.id);
                    return Ok(SearchOutcome::Found(result));
                }
                // Contenido malo: se prueba el siguiente nodo sin penalizar este
                Ok(Err(err)) => {
                    warn!("Nodo {} no pudo cargar la query: {}", node.id, err);
                    continue;
                }
                // El nodo no respondió dentro de la ventana: fuera de rotación
                Err(_) => {
                    self.events.emit(PlayerEvent::NodeFail {
                        node_id: node.id.clone(),
                    });
                    self.pool.remove(&node.id);
                    continue;
                }
            }
        }

        Ok(SearchOutcome::NotFound)
    }

    /// Flujo completo del comando play: busca, encola en la sesión y,
    /// si no hay nada sonando, dispara el avance.
    pub async fn search_and_enqueue(
        &self,
        session: &PlayerSession,
        raw_query: &str,
        provider_override: Option<&str>,
    ) -> Result<Enqueued, PlayerError> {
        let outcome = self
            .search(raw_query, provider_override, session.default_provider())
            .await?;

        let result = match outcome {
            SearchOutcome::NotFound => return Ok(Enqueued::NotFound),
            SearchOutcome::Found(result) => result,
        };

        let summary = match &result {
            SearchResult::Tracks(tracks) => Enqueued::Track {
                title: tracks[0].title().to_string(),
            },
            SearchResult::Playlist { name, tracks } => Enqueued::Playlist {
                name: name.clone(),
                count: tracks.len(),
            },
        };

        session.enqueue(result);

        if !session.is_playing() {
            session.advance_to_next().await?;
        }

        Ok(summary)
    }
}
