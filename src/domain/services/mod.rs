pub mod actions;
mod app_state;
mod engine_session;
pub mod events;
mod generation;
pub mod sanitize;

pub use app_state::*;
pub use engine_session::*;
pub use generation::*;
