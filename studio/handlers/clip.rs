use std::io::Read;

use tiny_http::Request;
use tracing::warn;

use clahe_studio::{render, ClipLimit, UiOutput};

use crate::routes::{json_response, redirect, text_response, HttpResponse};
use crate::state::{lock, FlashMessage, SharedSession};
use crate::util::form::{form_get, parse_form};

/// Parses the `clip` field of an urlencoded body into a slider value.
pub fn parse_clip(body: &str) -> Result<ClipLimit, String> {
    let pairs = parse_form(body);
    let raw = form_get(&pairs, "clip").ok_or_else(|| "Missing clip value.".to_owned())?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Clip limit '{}' is not a number.", raw))?;
    ClipLimit::new(value).map_err(|e| e.to_string())
}

fn read_clip(request: &mut Request) -> Result<ClipLimit, String> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|_| "The request body could not be read.".to_owned())?;
    parse_clip(&body)
}

/// Applies a slider value to the session. Returns the HTTP status, an error
/// message for the user if any, and the page state after the update.
fn apply_clip(session: &SharedSession, clip: Result<ClipLimit, String>) -> (u16, Option<String>, UiOutput) {
    let mut s = lock(session);
    let (status, error) = match clip {
        Ok(clip) => match s.controller.set_clip_limit(clip) {
            Ok(()) => (200, None),
            Err(e) => {
                warn!(%clip, error = %e, "enhancement failed");
                (500, Some(e.to_string()))
            }
        },
        Err(msg) => (400, Some(msg)),
    };
    (status, error, render(&s.controller))
}

// ---------------------------------------------------------------------------
// POST /clip  (form fallback without JavaScript)
// ---------------------------------------------------------------------------

pub fn handle_form(request: &mut Request, session: &SharedSession) -> HttpResponse {
    let clip = read_clip(request);
    if let (_, Some(error), _) = apply_clip(session, clip) {
        lock(session).flash = Some(FlashMessage::error(error));
    }
    redirect("/")
}

// ---------------------------------------------------------------------------
// POST /api/clip  and  GET /api/state
// ---------------------------------------------------------------------------

pub fn handle_api(request: &mut Request, session: &SharedSession) -> HttpResponse {
    let clip = read_clip(request);
    let (status, error, ui) = apply_clip(session, clip);
    ui_json(status, &ui, error)
}

pub fn handle_state(session: &SharedSession) -> HttpResponse {
    let ui = render(&lock(session).controller);
    ui_json(200, &ui, None)
}

/// Serializes `ui` with an optional top-level `error` field.
fn ui_json(status: u16, ui: &UiOutput, error: Option<String>) -> HttpResponse {
    let mut value = match serde_json::to_value(ui) {
        Ok(v)  => v,
        Err(e) => return text_response(500, &format!("could not serialize page state: {}", e)),
    };
    if let (Some(error), Some(map)) = (error, value.as_object_mut()) {
        map.insert("error".to_owned(), serde_json::Value::String(error));
    }
    json_response(status, value.to_string())
}
