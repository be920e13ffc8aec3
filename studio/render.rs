/// HTML rendering for the studio page.
///
/// The page is a single template (`studio/assets/studio.html`) with
/// placeholder tokens like `{{TOKEN}}`, loaded at compile time. Sections are
/// built from the controller's `UiOutput`, so the HTML is a pure function of
/// session state plus the one-shot flash message.

use clahe_studio::controller::ui::{ReadyView, UploadControl};
use clahe_studio::UiOutput;

use crate::state::{FlashKind, FlashMessage};

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Renders the full page.
pub fn render_page(ui: &UiOutput, flash: Option<&FlashMessage>) -> String {
    let ready_html = ui
        .ready
        .as_ref()
        .map(|ready| ready_section(ready, ui.revision))
        .unwrap_or_default();

    let html = TEMPLATE
        .replace("{{TITLE}}", &html_escape(ui.title))
        .replace("{{INTRO}}", &html_escape(ui.intro))
        .replace("{{FLASH}}", &render_flash_html(flash))
        .replace("{{UPLOAD_SECTION}}", &upload_section(&ui.upload))
        .replace("{{READY_SECTION}}", &ready_html);

    blank_remaining(html)
}

/// Escapes markup characters. Braces are escaped too, so user text can never
/// form a `{{TOKEN}}` during substitution or blanking.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
     .replace('{', "&#123;")
     .replace('}', "&#125;")
}

pub fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        None    => String::new(),
        Some(f) => {
            let cls = match f.kind {
                FlashKind::Success => "flash-success",
                FlashKind::Error   => "flash-error",
            };
            format!(r#"<div class="flash {}" role="alert">{}</div>"#, cls, html_escape(&f.text))
        }
    }
}

fn upload_section(upload: &UploadControl) -> String {
    let accept = upload.accept.join(",");

    let current = match &upload.current_file {
        Some(name) => format!(
            r#"<div class="current-file">
  <span>Current file: <strong>{name}</strong></span>
  <form method="POST" action="/reset"><button type="submit" class="btn btn-ghost">Remove</button></form>
</div>"#,
            name = html_escape(name)
        ),
        None => String::new(),
    };

    format!(
        r#"<section class="card">
<form method="POST" action="/upload" enctype="multipart/form-data" id="upload-form">
  <label for="image">{label}</label>
  <input type="file" id="image" name="image" accept="{accept}">
  <p class="hint">Accepted formats: {accept_hint}</p>
  <noscript><button type="submit" class="btn btn-primary">Upload</button></noscript>
</form>
{current}
</section>"#,
        label       = html_escape(upload.label),
        accept      = html_escape(&accept),
        accept_hint = html_escape(&upload.accept.join(" ")),
        current     = current,
    )
}

fn ready_section(ready: &ReadyView, revision: u64) -> String {
    let slider = &ready.slider;

    let enhanced_img = if ready.enhanced.available {
        format!(
            r#"<img id="img-enhanced" src="/image/enhanced.png?v={rev}" alt="{caption}">"#,
            rev = revision,
            caption = html_escape(&ready.enhanced.caption),
        )
    } else {
        r#"<div class="error-box" id="img-enhanced">The enhanced image could not be produced.</div>"#.to_owned()
    };

    let download = if ready.download.available {
        format!(
            r#"<a id="download" class="btn btn-primary" href="/download?v={rev}" download="{file}" type="{mime}">{label}</a>"#,
            rev   = revision,
            file  = html_escape(&ready.download.file_name),
            mime  = ready.download.mime,
            label = html_escape(ready.download.label),
        )
    } else {
        format!(
            r#"<button id="download" class="btn btn-primary" disabled>{}</button>"#,
            html_escape(ready.download.label)
        )
    };

    format!(
        r#"<section class="card" id="ready">
<h2>{heading}</h2>
<form method="POST" action="/clip" id="clip-form">
  <label for="clip">{slider_label}: <output id="clip-value" for="clip">{value:.1}</output></label>
  <input type="range" id="clip" name="clip" min="{min:.1}" max="{max:.1}" step="{step}" value="{value:.1}">
  <noscript><button type="submit" class="btn">Apply</button></noscript>
</form>
<p class="hint">{width} &times; {height} px</p>
<div class="columns">
  <figure>
    <img id="img-original" src="/image/original.png?v={rev}" alt="{original}">
    <figcaption>{original}</figcaption>
  </figure>
  <figure>
    {enhanced_img}
    <figcaption id="caption-enhanced">{enhanced}</figcaption>
  </figure>
</div>
<h2>{download_heading}</h2>
{download}
</section>"#,
        heading          = html_escape(ready.heading),
        slider_label     = html_escape(slider.label),
        value            = slider.value,
        min              = slider.min,
        max              = slider.max,
        step             = slider.step,
        width            = ready.width,
        height           = ready.height,
        rev              = revision,
        original         = html_escape(&ready.original.caption),
        enhanced_img     = enhanced_img,
        enhanced         = html_escape(&ready.enhanced.caption),
        download_heading = html_escape(ready.download.heading),
        download         = download,
    )
}

/// Replaces any `{{UPPERCASE_TOKEN}}` that wasn't already substituted with an
/// empty string, so a missed token never reaches the browser.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use clahe_studio::imaging::encode_png;
    use clahe_studio::{render, InteractionController};
    use image::{GrayImage, Luma};

    fn ready_controller() -> InteractionController {
        let img = GrayImage::from_fn(48, 32, |x, y| Luma([(x + y * 3) as u8]));
        let mut ctl = InteractionController::new();
        ctl.upload("molar <1>.png", &encode_png(&img).unwrap()).unwrap();
        ctl
    }

    #[test]
    fn test_idle_page_has_no_slider() {
        let html = render_page(&render(&InteractionController::new()), None);
        assert!(html.contains(r#"name="image""#));
        assert!(html.contains(".jpg,.jpeg,.png,.bmp"));
        assert!(!html.contains(r#"type="range""#));
        assert!(!html.contains("/image/original.png"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_ready_page() {
        let html = render_page(&render(&ready_controller()), None);
        assert!(html.contains(r#"type="range" id="clip" name="clip" min="1.0" max="15.0" step="0.5" value="3.0""#));
        assert!(html.contains("<figcaption>Original</figcaption>"));
        assert!(html.contains("CLAHE (Strength: 3.0)"));
        assert!(html.contains(r#"download="imagem_melhorada_clahe_3.0.png""#));
        assert!(html.contains("48 &times; 32 px"));
        assert!(html.contains("molar &lt;1&gt;.png"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_flash_rendered_and_escaped() {
        let flash = FlashMessage::error("could not decode <bytes>");
        let html = render_page(&render(&InteractionController::new()), Some(&flash));
        assert!(html.contains(r#"class="flash flash-error""#));
        assert!(html.contains("could not decode &lt;bytes&gt;"));
    }

    #[test]
    fn test_braces_in_user_text_survive() {
        let img = GrayImage::from_fn(8, 8, |x, _| Luma([x as u8 * 20]));
        let mut ctl = InteractionController::new();
        ctl.upload("scan{{v2}}.png", &encode_png(&img).unwrap()).unwrap();
        let flash = FlashMessage::success("Loaded {{READY_SECTION}}");

        let html = render_page(&render(&ctl), Some(&flash));
        assert!(html.contains("<strong>scan&#123;&#123;v2&#125;&#125;.png</strong>"));
        assert!(html.contains("Loaded &#123;&#123;READY_SECTION&#125;&#125;"));
        assert_eq!(html.matches(r#"id="ready""#).count(), 1);
    }

    #[test]
    fn test_blank_remaining() {
        assert_eq!(blank_remaining("a{{X}}b{{Y}}c".to_owned()), "abc");
        assert_eq!(blank_remaining("a{{open".to_owned()), "a{{open");
    }
}
