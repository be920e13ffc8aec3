//! # clahe-studio
//!
//! Interactive contrast enhancement for grayscale images such as dental
//! radiographs. An upload is decoded once to an 8-bit luminance buffer; every
//! change of the strength slider re-runs CLAHE on it and re-encodes the result
//! as PNG for display and download.
//!
//! ```no_run
//! use clahe_studio::{render, ClipLimit, InteractionController};
//!
//! # fn main() -> clahe_studio::Result<()> {
//! let bytes = std::fs::read("radiograph.png").unwrap();
//! let mut ctl = InteractionController::new();
//! ctl.upload("radiograph.png", &bytes)?;
//! ctl.set_clip_limit(ClipLimit::new(6.0)?)?;
//! let ui = render(&ctl);
//! # Ok(())
//! # }
//! ```

pub mod clip_limit;
pub mod controller;
pub mod error;
pub mod imaging;

pub use clip_limit::ClipLimit;
pub use controller::{render, InteractionController, UiOutput};
pub use error::{Error, Result};
