// ============================================================
// Layer 2: Serve Use Case
// ============================================================
// Starts the prediction service:
//
//   Step 1: Load the image model once            (Layer 5 - ml)
//   Step 2: Put it in the router state           (Layer 1 - api)
//   Step 3: Bind and serve until Ctrl-C          (tokio + axum)
//
// A model that cannot be loaded stops startup before anything is
// bound, unless `allow_missing_model` is set; then the service
// runs in not-ready mode (/health says so, /predict answers 500).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;

use crate::api::{create_router, AppState};
use crate::domain::traits::ImageClassifier;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::BurnClassifier;

pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub model_dir:           PathBuf,
    pub model_name:          String,
    pub host:                String,
    pub port:                u16,
    pub max_body_bytes:      usize,
    pub allow_missing_model: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            model_dir:           PathBuf::from("."),
            model_name:          "cat_dog_model".to_string(),
            host:                "0.0.0.0".to_string(),
            port:                5000,
            max_body_bytes:      DEFAULT_MAX_BODY_BYTES,
            allow_missing_model: false,
        }
    }
}

/// Step 1. `Ok(None)` only when a missing model is allowed.
pub fn load_classifier(cfg: &ServeConfig) -> Result<Option<Arc<dyn ImageClassifier>>> {
    let ckpt = CheckpointManager::new(&cfg.model_dir, &cfg.model_name);
    match BurnClassifier::from_checkpoint(&ckpt) {
        Ok(classifier) => Ok(Some(Arc::new(classifier))),
        Err(e) if cfg.allow_missing_model => {
            tracing::warn!("Starting without a model: {e}");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "Failed to start API. Please ensure the model '{}' exists in '{}'",
                cfg.model_name,
                cfg.model_dir.display()
            )
        }),
    }
}

pub struct ServeUseCase {
    config: ServeConfig,
}

impl ServeUseCase {
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let classifier = load_classifier(&self.config)?;
        let state      = AppState::new(classifier);

        let runtime = tokio::runtime::Runtime::new().context("Cannot start the async runtime")?;
        runtime.block_on(serve(&self.config, state))
    }
}

async fn serve(cfg: &ServeConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cfg.host, cfg.port))?;

    let model_loaded = state.model_loaded();
    let app = create_router(state, cfg.max_body_bytes);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    tracing::info!("API listening on http://{} (model loaded: {})", addr, model_loaded);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            // An error here only means no signal handler; keep serving
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
            }
        })
        .await?;

    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(dir: &std::path::Path, allow_missing_model: bool) -> ServeConfig {
        ServeConfig {
            model_dir: dir.to_path_buf(),
            allow_missing_model,
            ..ServeConfig::default()
        }
    }

    #[test]
    fn test_missing_model_is_fatal_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_classifier(&cfg(dir.path(), false)).err().unwrap();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn test_missing_model_allowed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_classifier(&cfg(dir.path(), true)).unwrap().is_none());
    }

    #[test]
    fn test_defaults_match_published_interface() {
        let c = ServeConfig::default();
        assert_eq!(c.port, 5000);
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.model_name, "cat_dog_model");
        assert_eq!(c.max_body_bytes, 10 * 1024 * 1024);
    }
}
