use serde::Serialize;

use crate::clip_limit::ClipLimit;
use crate::controller::session::InteractionController;
use crate::imaging::{ACCEPTED_EXTENSIONS, PNG_MIME};

pub const TITLE: &str = "CLAHE Contrast Tool";
pub const INTRO: &str =
    "Upload a radiograph or dental image to improve its contrast and bring out detail.";
pub const SLIDER_LABEL: &str = "Contrast Strength (Clip Limit)";

/// Framework-agnostic description of what the page should show.
///
/// Produced by [`render`]; the studio turns it into HTML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiOutput {
    pub title: &'static str,
    pub intro: &'static str,
    pub phase: Phase,
    /// Bumped on every input event.
    pub revision: u64,
    pub upload: UploadControl,
    /// Present only in [`Phase::Ready`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<ReadyView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadControl {
    pub label: &'static str,
    /// Extensions with a leading dot, e.g. `.png`.
    pub accept: Vec<String>,
    pub current_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub heading: &'static str,
    pub slider: Slider,
    pub width: u32,
    pub height: u32,
    pub original: Panel,
    pub enhanced: Panel,
    pub download: Download,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub caption: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Download {
    pub heading: &'static str,
    pub label: &'static str,
    pub file_name: String,
    pub mime: &'static str,
    /// False when the enhanced image could not be encoded.
    pub available: bool,
}

/// Renders the session as a [`UiOutput`]. Pure function of the controller's
/// state.
pub fn render(ctl: &InteractionController) -> UiOutput {
    let clip = ctl.clip_limit();

    let upload = UploadControl {
        label: "Choose an image...",
        accept: ACCEPTED_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect(),
        current_file: ctl.source().map(|s| s.file_name().to_owned()),
    };

    let ready = ctl.dimensions().map(|(width, height)| {
        let enhanced_available = ctl.rendition().is_some();
        ReadyView {
            heading: "Adjust the Contrast in Real Time",
            slider: slider(clip),
            width,
            height,
            original: Panel {
                caption: "Original".to_owned(),
                available: true,
            },
            enhanced: Panel {
                caption: enhanced_caption(clip),
                available: enhanced_available,
            },
            download: Download {
                heading: "Download the Result",
                label: "Download Enhanced Image",
                file_name: clip.download_file_name(),
                mime: PNG_MIME,
                available: enhanced_available,
            },
        }
    });

    UiOutput {
        title: TITLE,
        intro: INTRO,
        phase: if ready.is_some() { Phase::Ready } else { Phase::Idle },
        revision: ctl.revision(),
        upload,
        ready,
    }
}

pub fn enhanced_caption(clip: ClipLimit) -> String {
    format!("CLAHE (Strength: {clip})")
}

fn slider(clip: ClipLimit) -> Slider {
    Slider {
        label: SLIDER_LABEL,
        min: ClipLimit::MIN.value(),
        max: ClipLimit::MAX.value(),
        step: ClipLimit::STEP,
        value: clip.value(),
    }
}
