use std::time::Instant;

use image::GrayImage;
use tracing::{debug, info, warn};

use crate::clip_limit::ClipLimit;
use crate::error::Result;
use crate::imaging::{self, PNG_MIME};

// ---------------------------------------------------------------------------
// Source image
// ---------------------------------------------------------------------------

/// The decoded upload. Created once per upload and never mutated; a new
/// upload replaces it wholesale.
#[derive(Debug, Clone)]
pub struct SourceImage {
    file_name: String,
    pixels: GrayImage,
    /// PNG of `pixels`, served in the "Original" panel.
    png: Vec<u8>,
}

impl SourceImage {
    /// Runs the extension filter and the decoder, then encodes the display PNG.
    pub fn from_upload(file_name: &str, bytes: &[u8]) -> Result<SourceImage> {
        imaging::check_extension(file_name)?;
        let pixels = imaging::decode(bytes)?;
        let png = imaging::encode_png(&pixels)?;
        Ok(SourceImage {
            file_name: file_name.to_owned(),
            pixels,
            png,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// PNG bytes offered by the download action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPayload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Enhanced image plus its download payload, always computed together from
/// one (source, clip limit) pair.
#[derive(Debug, Clone)]
pub struct Rendition {
    clip: ClipLimit,
    pixels: GrayImage,
    download: DownloadPayload,
}

impl Rendition {
    pub fn compute(source: &SourceImage, clip: ClipLimit) -> Result<Rendition> {
        let started = Instant::now();
        let pixels = imaging::enhance(source.pixels(), clip);
        let bytes = imaging::encode_png(&pixels)?;
        debug!(
            %clip,
            elapsed_ms = started.elapsed().as_millis() as u64,
            png_bytes = bytes.len(),
            "recomputed enhanced image"
        );
        Ok(Rendition {
            clip,
            pixels,
            download: DownloadPayload {
                file_name: clip.download_file_name(),
                mime: PNG_MIME,
                bytes,
            },
        })
    }

    pub fn clip(&self) -> ClipLimit {
        self.clip
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn download(&self) -> &DownloadPayload {
        &self.download
    }
}

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SessionState {
    /// No upload; only the upload control is shown.
    Idle,
    /// Upload decoded. `rendition` is `None` only when encoding the enhanced
    /// image failed for the current clip limit.
    Ready {
        source: SourceImage,
        rendition: Option<Rendition>,
    },
}

/// Owns one user's session: the uploaded image, the slider value and the
/// values derived from them.
///
/// Every input event goes through a `&mut self` method that fully
/// recomputes the affected derived state before returning, so
/// [`render`](crate::controller::render) always sees a consistent snapshot.
pub struct InteractionController {
    state: SessionState,
    clip: ClipLimit,
    revision: u64,
}

impl InteractionController {
    pub fn new() -> Self {
        InteractionController {
            state: SessionState::Idle,
            clip: ClipLimit::default(),
            revision: 0,
        }
    }

    /// Handles a file upload.
    ///
    /// On success the session is Ready with the new image enhanced at the
    /// current clip limit. On any failure the session drops back to Idle so
    /// that no image from an earlier upload stays on screen, and the slider
    /// returns to its default.
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<()> {
        self.revision += 1;
        let source = match SourceImage::from_upload(file_name, bytes) {
            Ok(source) => source,
            Err(e) => {
                warn!(file_name, error = %e, "upload rejected");
                self.reset();
                return Err(e);
            }
        };

        let (width, height) = source.dimensions();
        info!(file_name, width, height, "image uploaded");

        match Rendition::compute(&source, self.clip) {
            Ok(rendition) => {
                self.state = SessionState::Ready {
                    source,
                    rendition: Some(rendition),
                };
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Removes the upload. The slider goes back to its default, so the next
    /// upload starts at 3.0.
    pub fn clear(&mut self) {
        if self.is_ready() {
            info!("upload removed");
        }
        self.revision += 1;
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.clip = ClipLimit::default();
    }

    /// Handles a slider change. In Ready the enhanced image and the download
    /// payload are recomputed before this returns.
    ///
    /// If encoding fails the session stays Ready without a rendition and the
    /// error is returned.
    pub fn set_clip_limit(&mut self, clip: ClipLimit) -> Result<()> {
        self.clip = clip;
        self.revision += 1;

        if let SessionState::Ready { source, rendition } = &mut self.state {
            *rendition = None;
            *rendition = Some(Rendition::compute(source, clip)?);
        }
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn clip_limit(&self) -> ClipLimit {
        self.clip
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready { .. })
    }

    /// Bumped on every input event; lets clients tell renders apart.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn source(&self) -> Option<&SourceImage> {
        match &self.state {
            SessionState::Ready { source, .. } => Some(source),
            SessionState::Idle => None,
        }
    }

    pub fn rendition(&self) -> Option<&Rendition> {
        match &self.state {
            SessionState::Ready { rendition, .. } => rendition.as_ref(),
            SessionState::Idle => None,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.source().map(SourceImage::dimensions)
    }

    pub fn original_png(&self) -> Option<&[u8]> {
        self.source().map(SourceImage::png)
    }

    pub fn enhanced_png(&self) -> Option<&[u8]> {
        self.download().map(|d| d.bytes.as_slice())
    }

    pub fn download(&self) -> Option<&DownloadPayload> {
        self.rendition().map(Rendition::download)
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}
