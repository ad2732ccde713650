#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::GenerationService;
use crate::domain::models::Action;
use crate::domain::models::Event;

pub fn help_text() -> String {
    let text = r#"
HOTKEYS:
- Tab - Move focus to the next field
- Shift+Tab - Move focus to the previous field
- Enter - Generate a response when the Generate button is focused
- CTRL+G - Generate a response from anywhere
- CTRL+C - Exit
        "#;

    return text.trim().to_string();
}

pub struct ActionsService {}

impl ActionsService {
    /// Every `Generate` runs in its own task. Requests are never cancelled,
    /// so overlapping requests race and whichever finishes last is shown.
    pub async fn start(
        generation: Arc<GenerationService>,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            match action {
                Action::Generate() => {
                    let worker_generation = generation.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        if let Err(err) = worker_generation.handle_generate_request(&worker_tx).await
                        {
                            tracing::error!(error = ?err, "Generation result could not be delivered");
                        }
                    });
                }
            }
        }

        return Ok(());
    }
}
