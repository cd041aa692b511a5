use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::error::PlayerError;
use crate::providers::Track;

/// Cola de reproducción estrictamente FIFO.
///
/// Varios productores pueden hacer `push` concurrente (inserción masiva
/// de playlists), pero el consumo es de un solo consumidor lógico: solo
/// la sesión dueña avanza la cola. Los tracks salen únicamente por la
/// operación de avance o por `clear` durante el destroy.
pub struct PlaybackQueue {
    items: Mutex<VecDeque<Track>>,
    notify: Notify,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    /// Agrega un track al final; nunca bloquea
    pub fn push(&self, track: Track) {
        debug!("➕ Agregado a la cola: {}", track.title());
        self.items.lock().push_back(track);
        self.notify.notify_one();
    }

    /// Inserción masiva (playlist completa)
    pub fn push_all(&self, tracks: Vec<Track>) -> usize {
        let count = tracks.len();
        if count == 0 {
            return 0;
        }
        {
            let mut items = self.items.lock();
            items.extend(tracks);
        }
        info!("➕ Agregados {} tracks a la cola", count);
        self.notify.notify_one();
        count
    }

    /// Espera bloqueante por el siguiente track.
    ///
    /// Devuelve `QueueTimeout` si no llega nada dentro de la ventana;
    /// el timeout es flujo de control ordinario, no una falla fatal.
    pub async fn pop_wait(&self, timeout: Duration) -> Result<Track, PlayerError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // El futuro de notificación se crea antes de revisar la cola
            // para no perder un push entre la revisión y la espera
            let notified = self.notify.notified();

            if let Some(track) = self.items.lock().pop_front() {
                return Ok(track);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(PlayerError::QueueTimeout);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Siguiente track sin consumirlo; para el render de "ahora suena"
    pub fn peek_front(&self) -> Option<Track> {
        self.items.lock().front().cloned()
    }

    /// Vacía la cola; solo se usa durante el destroy
    pub fn clear(&self) {
        let mut items = self.items.lock();
        if !items.is_empty() {
            debug!("🗑️ Cola limpiada ({} tracks)", items.len());
        }
        items.clear();
    }
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}
