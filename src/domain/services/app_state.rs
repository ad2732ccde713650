#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Prompts;
use crate::domain::models::TextArea;
use crate::domain::models::UiState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    SystemPrompt,
    UserRequest,
    GenerateButton,
}

impl Focus {
    pub fn next(&self) -> Focus {
        match self {
            Focus::SystemPrompt => return Focus::UserRequest,
            Focus::UserRequest => return Focus::GenerateButton,
            Focus::GenerateButton => return Focus::SystemPrompt,
        }
    }

    pub fn prev(&self) -> Focus {
        match self {
            Focus::SystemPrompt => return Focus::GenerateButton,
            Focus::UserRequest => return Focus::SystemPrompt,
            Focus::GenerateButton => return Focus::UserRequest,
        }
    }
}

pub struct AppState<'a> {
    pub focus: Focus,
    pub prompts: Prompts,
    pub system_prompt: tui_textarea::TextArea<'a>,
    pub user_request: tui_textarea::TextArea<'a>,
    pub ui_state: UiState,
}

impl<'a> AppState<'a> {
    pub fn new(prompts: Prompts, ui_state: UiState) -> AppState<'a> {
        let request = prompts.to_request();
        let messages = request.messages();

        let mut app_state = AppState {
            focus: Focus::UserRequest,
            system_prompt: TextArea::new("System prompt", &messages[0].content),
            user_request: TextArea::new("User request", &messages[1].content),
            prompts,
            ui_state,
        };
        app_state.sync_focus();

        return app_state;
    }

    fn sync_focus(&mut self) {
        TextArea::set_focused(&mut self.system_prompt, self.focus == Focus::SystemPrompt);
        TextArea::set_focused(&mut self.user_request, self.focus == Focus::UserRequest);
    }

    fn focused_textarea(&mut self) -> Option<&mut tui_textarea::TextArea<'a>> {
        match self.focus {
            Focus::SystemPrompt => return Some(&mut self.system_prompt),
            Focus::UserRequest => return Some(&mut self.user_request),
            Focus::GenerateButton => return None,
        }
    }

    fn sync_prompts(&self) {
        self.prompts
            .set_system_prompt(&self.system_prompt.lines().join("\n"));
        self.prompts
            .set_user_request(&self.user_request.lines().join("\n"));
    }

    fn edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut tui_textarea::TextArea<'a>),
    {
        if let Some(textarea) = self.focused_textarea() {
            f(textarea);
            self.sync_prompts();
        }
    }

    /// Applies one event. Returns true when the app should exit.
    pub fn handle_event(&mut self, event: Event, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        match event {
            Event::GenerationState(state) => {
                self.ui_state = state;
            }
            Event::KeyboardCTRLC() => {
                return Ok(true);
            }
            Event::KeyboardCTRLG() => {
                tx.send(Action::Generate())?;
            }
            Event::KeyboardEnter() => {
                if self.focus == Focus::GenerateButton {
                    tx.send(Action::Generate())?;
                } else {
                    self.edit(|textarea| {
                        textarea.insert_newline();
                    });
                }
            }
            Event::KeyboardTab() => {
                self.focus = self.focus.next();
                self.sync_focus();
            }
            Event::KeyboardBackTab() => {
                self.focus = self.focus.prev();
                self.sync_focus();
            }
            Event::KeyboardPaste(text) => {
                self.edit(|textarea| {
                    for c in text.replace("\r\n", "\n").chars() {
                        if c == '\n' {
                            textarea.insert_newline();
                        } else if !c.is_control() {
                            textarea.insert_char(c);
                        }
                    }
                });
            }
            Event::KeyboardCharInput(input) => {
                self.edit(|textarea| {
                    textarea.input(input);
                });
            }
            Event::UITick() => (),
        }

        return Ok(false);
    }

    #[cfg(feature = "dev")]
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.edit(|textarea| {
                textarea.input(tui_textarea::Input {
                    key: tui_textarea::Key::Char(c),
                    ctrl: false,
                    alt: false,
                });
            });
        }
    }
}
