use anyhow::{Context, Result};
use std::time::Duration;

use crate::nodes::NodeDescriptor;
use crate::player::HARD_VOLUME_CEILING;
use crate::providers::DEFAULT_PROVIDER;

/// Configuración del orquestador, cargada desde el entorno
#[derive(Debug, Clone)]
pub struct Config {
    /// Ventana de espera por un track antes de desmontar la sesión ociosa
    pub idle_timeout: Duration,
    /// Espera acotada por nodo durante la búsqueda
    pub search_timeout: Duration,
    /// Volumen inicial de cada sesión
    pub default_volume: u16,
    /// Clave del proveedor por defecto de cada sesión
    pub default_provider: String,
    /// Nodos del backend disponibles al arranque
    pub nodes: Vec<NodeDescriptor>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            idle_timeout: Duration::from_secs(
                std::env::var("MUSIC_IDLE_TIMEOUT")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("MUSIC_IDLE_TIMEOUT inválido")?,
            ),
            search_timeout: Duration::from_secs(
                std::env::var("MUSIC_SEARCH_TIMEOUT")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .context("MUSIC_SEARCH_TIMEOUT inválido")?,
            ),
            default_volume: std::env::var("MUSIC_DEFAULT_VOLUME")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("MUSIC_DEFAULT_VOLUME inválido")?,
            default_provider: std::env::var("MUSIC_DEFAULT_PROVIDER")
                .unwrap_or_else(|_| DEFAULT_PROVIDER.to_string()),
            // Lista JSON: [{"id": "...", "host": "...", "port": 2333, "password": "..."}]
            nodes: match std::env::var("MUSIC_NODES") {
                Ok(raw) if !raw.trim().is_empty() => {
                    serde_json::from_str(&raw).context("MUSIC_NODES no es JSON válido")?
                }
                _ => Vec::new(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            anyhow::bail!("idle_timeout debe ser mayor que cero");
        }

        if self.search_timeout.is_zero() {
            anyhow::bail!("search_timeout debe ser mayor que cero");
        }

        if self.default_volume > HARD_VOLUME_CEILING {
            anyhow::bail!(
                "default_volume no puede superar {}, recibido: {}",
                HARD_VOLUME_CEILING,
                self.default_volume
            );
        }

        if self.default_provider.trim().is_empty() {
            anyhow::bail!("default_provider no puede estar vacío");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            search_timeout: Duration::from_secs(20),
            default_volume: 100,
            default_provider: DEFAULT_PROVIDER.to_string(),
            nodes: Vec::new(),
        }
    }
}
