#[cfg(test)]
#[path = "headless_test.rs"]
mod tests;

use std::io::Write;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Event;
use crate::domain::models::UiState;
use crate::domain::services::GenerationService;

async fn report<E: Write>(
    rx: &mut mpsc::UnboundedReceiver<Event>,
    notices: &mut E,
) -> Result<UiState> {
    let mut last_state = UiState::Idle;
    while let Some(event) = rx.recv().await {
        if let Event::GenerationState(state) = event {
            if state.is_busy() {
                writeln!(notices, "{}", state.text())?;
            }
            last_state = state;
        }
    }

    return Ok(last_state);
}

/// Runs a single generation without the terminal UI. The response goes to
/// `out`, progress notices go to `notices`.
pub async fn run<W: Write, E: Write>(
    generation: &GenerationService,
    out: &mut W,
    notices: &mut E,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let handler = async move {
        return generation.handle_generate_request(&tx).await;
    };
    let (handled, reported) = tokio::join!(handler, report(&mut rx, notices));
    handled?;

    match reported? {
        UiState::Success(text) => {
            writeln!(out, "{text}")?;
        }
        state @ UiState::Error(_) => {
            bail!(state.text());
        }
        state => {
            bail!(format!("Generation ended without a result: {state:?}"));
        }
    }

    return Ok(());
}
