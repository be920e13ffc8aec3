//! Grayscale buffer to PNG bytes.

use image::codecs::png::PngEncoder;
use image::{ColorType, GrayImage, ImageEncoder as _};

use crate::error::{Error, Result};

/// Encodes an 8-bit grayscale buffer as a lossless PNG.
///
/// Decoding the returned bytes reproduces `img` exactly.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::L8)
        .map_err(|source| Error::Encode { source })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::decode;
    use image::Luma;

    #[test]
    fn test_png_signature() {
        let img = GrayImage::from_pixel(3, 3, Luma([1]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_round_trip_exact() {
        let img = GrayImage::from_fn(33, 17, |x, y| Luma([((x * 7 + y * 31) % 256) as u8]));
        let bytes = encode_png(&img).unwrap();
        let back = decode(&bytes).unwrap();
        assert_eq!(back.dimensions(), img.dimensions());
        assert_eq!(back.as_raw(), img.as_raw());
    }
}
