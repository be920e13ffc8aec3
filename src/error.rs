//! Error types for clahe-studio.

use thiserror::Error;

/// Main error type for the clahe-studio library.
#[derive(Error, Debug)]
pub enum Error {
    /// The upload carried no bytes at all.
    #[error("no image data was uploaded")]
    EmptyUpload,

    /// The uploaded file name has an extension outside the accepted set.
    #[error("unsupported file extension '.{extension}' (expected .jpg, .jpeg, .png or .bmp)")]
    UnsupportedExtension { extension: String },

    /// The bytes are a recognised image format that this tool does not accept.
    #[error("unsupported image format {format} (expected JPEG, PNG or BMP)")]
    UnsupportedFormat { format: String },

    /// The bytes could not be decoded as an image.
    #[error("could not decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    /// The image decoded but has no pixels.
    #[error("image has zero width or height")]
    EmptyImage,

    /// Clip limit outside [1.0, 15.0] or not a finite number.
    #[error("clip limit {value} is outside the range [1.0, 15.0]")]
    ParameterOutOfRange { value: f64 },

    /// PNG encoding failed.
    #[error("could not encode PNG: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },
}

impl Error {
    /// True for every failure that happens while turning upload bytes into a
    /// grayscale buffer.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyUpload
                | Error::UnsupportedExtension { .. }
                | Error::UnsupportedFormat { .. }
                | Error::Decode { .. }
                | Error::EmptyImage
        )
    }
}

/// Result type alias for clahe-studio operations.
pub type Result<T> = std::result::Result<T, Error>;
