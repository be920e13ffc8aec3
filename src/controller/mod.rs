//! Session state machine and page rendering.

pub mod session;
pub mod ui;

pub use session::{DownloadPayload, InteractionController, Rendition, SessionState, SourceImage};
pub use ui::{render, Phase, UiOutput};
