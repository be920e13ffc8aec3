//! Upload bytes to grayscale buffer.

use std::path::Path;

use image::{GrayImage, ImageFormat};
use tracing::debug;

use crate::error::{Error, Result};

/// File extensions the upload control accepts (lowercase, without the dot).
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Rejects file names whose extension is not in [`ACCEPTED_EXTENSIONS`].
///
/// Names without any extension pass; the content is sniffed by [`decode`].
pub fn check_extension(file_name: &str) -> Result<()> {
    let extension = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return Ok(()),
    };
    if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedExtension { extension })
    }
}

/// Decodes JPEG, PNG or BMP bytes into an 8-bit luminance buffer.
///
/// Colour sources are converted with the standard luminance weights; 16-bit
/// sources are scaled down to 8 bits.
///
/// # Errors
///
/// Returns a decode-class [`Error`] when the bytes are empty, are not an image,
/// are an image format outside JPEG/PNG/BMP, or decode to zero pixels.
pub fn decode(bytes: &[u8]) -> Result<GrayImage> {
    if bytes.is_empty() {
        return Err(Error::EmptyUpload);
    }

    let format = image::guess_format(bytes).map_err(|source| Error::Decode { source })?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Bmp) {
        return Err(Error::UnsupportedFormat {
            format: format!("{format:?}"),
        });
    }

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|source| Error::Decode { source })?;
    let gray = img.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(Error::EmptyImage);
    }

    debug!(
        ?format,
        width = gray.width(),
        height = gray.height(),
        "decoded upload"
    );
    Ok(gray)
}
