use thiserror::Error;

/// Errores del orquestador de reproducción
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Proveedor desconocido: {0}")]
    UnknownProvider(String),

    #[error("Timeout del nodo {node} durante la búsqueda")]
    BackendTimeout { node: String },

    #[error("El backend reportó un error de carga: {0}")]
    BackendError(String),

    #[error("No llegó ningún track dentro de la ventana de espera")]
    QueueTimeout,

    #[error("No hay ningún track en reproducción")]
    NothingPlaying,

    #[error("La cola debe tener al menos un track pendiente")]
    NotEnoughTracks,

    #[error("Modo de loop inválido (debe ser `off`, `track` o `queue`)")]
    InvalidLoopMode,

    #[error("El comando debe emitirse desde el canal de voz de la sesión")]
    ChannelMismatch,

    #[error("La sesión ya fue destruida")]
    Destroyed,

    #[error("Volumen fuera de rango: {0}")]
    VolumeOutOfRange(u16),

    #[error("La posición de seek supera la duración del track")]
    SeekOutOfRange,

    #[error("Error del transporte de voz: {0}")]
    Transport(String),
}

impl PlayerError {
    /// Errores transitorios del backend: se prueba el siguiente nodo sin
    /// penalizar al actual
    pub fn is_transient(&self) -> bool {
        matches!(self, PlayerError::BackendError(_))
    }
}
