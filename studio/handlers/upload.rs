use std::io::Read;

use tiny_http::Request;
use tracing::warn;

use crate::routes::{header_value, redirect, HttpResponse};
use crate::state::{lock, FlashMessage, SharedSession};
use crate::util::multipart::{extract_boundary, extract_file_part};

/// Name of the file input on the upload form.
const FILE_FIELD: &str = "image";

// ---------------------------------------------------------------------------
// POST /upload
// ---------------------------------------------------------------------------

pub fn handle_upload(request: &mut Request, session: &SharedSession, max_bytes: usize) -> HttpResponse {
    let content_type = header_value(request, "Content-Type").unwrap_or_default();

    // Read one byte past the limit so an over-size body is detectable.
    let mut body: Vec<u8> = Vec::new();
    if let Err(e) = request.as_reader().take(max_bytes as u64 + 1).read_to_end(&mut body) {
        warn!(error = %e, "could not read upload body");
        fail(session, "The upload could not be read.");
        return redirect("/");
    }

    process_upload(session, &content_type, &body, max_bytes);
    redirect("/")
}

/// Feeds a multipart upload body into the session's controller and leaves a
/// flash message describing the outcome.
pub fn process_upload(session: &SharedSession, content_type: &str, body: &[u8], max_bytes: usize) {
    let boundary = match extract_boundary(content_type) {
        Some(b) => b,
        None    => return fail(session, "Invalid multipart request."),
    };

    if body.len() > max_bytes {
        return fail(session, &format!("File exceeds the {} MB limit.", max_bytes / (1024 * 1024)));
    }

    // A missing part is handled like an empty one: the controller rejects it.
    let (filename, bytes) = match extract_file_part(body, &boundary, FILE_FIELD) {
        Some(part) => (part.filename, part.bytes),
        None       => (String::new(), Vec::new()),
    };

    let mut s = lock(session);
    let flash = match s.controller.upload(&filename, &bytes) {
        Ok(()) => {
            let (w, h) = s.controller.dimensions().unwrap_or_default();
            FlashMessage::success(format!("Loaded {} ({} \u{d7} {} px).", filename, w, h))
        }
        Err(e) => FlashMessage::error(e.to_string()),
    };
    s.flash = Some(flash);
}

// ---------------------------------------------------------------------------
// POST /reset
// ---------------------------------------------------------------------------

pub fn handle_reset(session: &SharedSession) -> HttpResponse {
    lock(session).controller.clear();
    redirect("/")
}

/// A failed upload never leaves an earlier image on screen.
fn fail(session: &SharedSession, msg: &str) {
    let mut s = lock(session);
    s.controller.clear();
    s.flash = Some(FlashMessage::error(msg));
}
