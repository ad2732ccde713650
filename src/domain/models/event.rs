use tui_textarea::Input;

use super::UiState;

#[derive(Debug)]
pub enum Event {
    GenerationState(UiState),
    KeyboardBackTab(),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLG(),
    KeyboardEnter(),
    KeyboardPaste(String),
    KeyboardTab(),
    UITick(),
}
