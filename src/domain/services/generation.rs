#[cfg(test)]
#[path = "generation_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::sanitize::sanitize;
use super::EngineSession;
use crate::domain::models::Event;
use crate::domain::models::GenerationOptions;
use crate::domain::models::Prompts;
use crate::domain::models::UiState;

pub struct GenerationService {
    session: Arc<EngineSession>,
    prompts: Prompts,
    options: GenerationOptions,
}

impl GenerationService {
    pub fn new(
        session: Arc<EngineSession>,
        prompts: Prompts,
        options: GenerationOptions,
    ) -> GenerationService {
        return GenerationService {
            session,
            prompts,
            options,
        };
    }

    pub fn session(&self) -> &EngineSession {
        return &self.session;
    }

    async fn generate(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<String> {
        let engine = self.session.ensure_loaded(tx).await?;

        // Read the fields only now, after loading, so edits made while the
        // model was loading are picked up.
        let request = self.prompts.to_request();

        tx.send(Event::GenerationState(UiState::Generating))?;
        let output = engine.generate(&request, &self.options).await?;
        tracing::debug!(turns = output.generated_turns.len(), "Generation output");

        let text = output.last_turn_text()?;
        return Ok(sanitize(text));
    }

    /// Runs one user triggered generation from start to finish. Failures of
    /// any step end up as an `Error` state, the returned error only covers a
    /// closed event channel.
    pub async fn handle_generate_request(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
        match self.generate(tx).await {
            Ok(text) => {
                tracing::info!(text, "Generated response");
                tx.send(Event::GenerationState(UiState::Success(text)))?;
            }
            Err(err) => {
                tracing::error!(error = ?err, "Error generating response");
                tx.send(Event::GenerationState(UiState::Error(format!("{err:#}"))))?;
            }
        }

        return Ok(());
    }
}
