#[cfg(test)]
#[path = "engine_session_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::OnceCell;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::EngineBox;
use crate::domain::models::Event;
use crate::domain::models::LoadOptions;
use crate::domain::models::UiState;
use crate::infrastructure::backends::BackendManager;

/// Owns the one loaded engine for the lifetime of the process.
///
/// The slot starts empty and is filled by the first successful load. Callers
/// that arrive while a load is in flight wait on that same load instead of
/// issuing their own. A failed load leaves the slot empty, so the next caller
/// starts over.
pub struct EngineSession {
    backend: BackendBox,
    model: String,
    options: LoadOptions,
    engine: OnceCell<EngineBox>,
}

impl EngineSession {
    pub fn new(backend: BackendBox, model: &str, options: LoadOptions) -> EngineSession {
        return EngineSession {
            backend,
            model: model.to_string(),
            options,
            engine: OnceCell::new(),
        };
    }

    pub fn from_config() -> Result<EngineSession> {
        let backend = BackendManager::get(Config::backend_name()?)?;
        return Ok(EngineSession::new(
            backend,
            &Config::get(ConfigKey::Model),
            Config::load_options()?,
        ));
    }

    pub fn model(&self) -> &str {
        return &self.model;
    }

    pub fn is_loaded(&self) -> bool {
        return self.engine.initialized();
    }

    pub async fn health_check(&self) -> Result<()> {
        return self.backend.health_check().await;
    }

    /// Returns the loaded engine, loading it first if needed. `Loading` is
    /// published only by the caller that actually starts a load.
    pub async fn ensure_loaded(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<EngineBox> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }

        let engine = self
            .engine
            .get_or_try_init(|| {
                return async move {
                    tx.send(Event::GenerationState(UiState::Loading))?;
                    tracing::info!(
                        backend = %self.backend.name(),
                        model = self.model,
                        precision = %self.options.precision,
                        device = %self.options.device,
                        "Loading model"
                    );

                    let res = self.backend.load(&self.model, &self.options).await;
                    if let Err(err) = &res {
                        tracing::warn!(model = self.model, error = ?err, "Model failed to load");
                    } else {
                        tracing::info!(model = self.model, "Model loaded");
                    }

                    return res;
                };
            })
            .await?;

        return Ok(engine.clone());
    }
}
