mod action;
mod backend;
mod event;
mod message;
mod output_panel;
mod prompts;
mod textarea;
mod ui_state;

pub use action::*;
pub use backend::*;
pub use event::*;
pub use message::*;
pub use output_panel::*;
pub use prompts::*;
pub use textarea::*;
pub use ui_state::*;
