#[cfg(test)]
#[path = "ui_state_test.rs"]
mod tests;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Generating,
    Success(String),
    Error(String),
}

impl UiState {
    pub fn is_busy(&self) -> bool {
        return matches!(self, UiState::Loading | UiState::Generating);
    }

    pub fn text(&self) -> String {
        match self {
            UiState::Idle => {
                return "Press Ctrl+G or select Generate to ask the model.".to_string();
            }
            UiState::Loading => return "Loading model...".to_string(),
            UiState::Generating => return "Generating response...".to_string(),
            UiState::Success(text) => return text.to_string(),
            UiState::Error(message) => {
                return format!("Error generating response: {message}");
            }
        }
    }
}
