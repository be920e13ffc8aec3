//! Grayscale image decoding, CLAHE enhancement and PNG encoding.

pub mod clahe;
pub mod decode;
pub mod encode;

pub use clahe::{enhance, enhance_with_grid, TILE_GRID};
pub use decode::{check_extension, decode, ACCEPTED_EXTENSIONS};
pub use encode::encode_png;

/// MIME type of every image this crate produces.
pub const PNG_MIME: &str = "image/png";
