use std::io::Cursor;
use std::time::Instant;

use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::debug;

use crate::handlers;
use crate::state::{lock, SharedSession, SharedState, StudioState};
use crate::util::cookie::{parse_cookie, session_cookie, SESSION_COOKIE};

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Builds headers from static-ish pairs; pairs that are not valid header
/// bytes are dropped.
fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
    pairs
        .iter()
        .filter_map(|(k, v)| Header::from_bytes(k.as_bytes(), v.as_bytes()).ok())
        .collect()
}

fn bytes_response(status: u16, pairs: &[(&str, &str)], bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(StatusCode(status), headers(pairs), Cursor::new(bytes), Some(len), None)
}

pub fn html_response(body: String) -> HttpResponse {
    bytes_response(200, &[("Content-Type", "text/html; charset=utf-8")], body.into_bytes())
}

pub fn redirect(location: &str) -> HttpResponse {
    bytes_response(303, &[("Location", location)], Vec::new())
}

pub fn json_response(status: u16, body: String) -> HttpResponse {
    bytes_response(
        status,
        &[("Content-Type", "application/json"), ("Cache-Control", "no-store")],
        body.into_bytes(),
    )
}

pub fn png_response(bytes: Vec<u8>) -> HttpResponse {
    bytes_response(
        200,
        &[("Content-Type", clahe_studio::imaging::PNG_MIME), ("Cache-Control", "no-store")],
        bytes,
    )
}

pub fn download_response(bytes: Vec<u8>, mime: &str, filename: &str) -> HttpResponse {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    bytes_response(
        200,
        &[
            ("Content-Type", mime),
            ("Content-Disposition", disposition.as_str()),
            ("Cache-Control", "no-store"),
        ],
        bytes,
    )
}

pub fn text_response(status: u16, text: &str) -> HttpResponse {
    bytes_response(status, &[("Content-Type", "text/plain; charset=utf-8")], text.as_bytes().to_vec())
}

pub fn not_found() -> HttpResponse {
    text_response(404, "404 Not Found")
}

/// Returns the value of the first request header named `name`.
pub fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_owned())
}

// ---------------------------------------------------------------------------
// Session binding
// ---------------------------------------------------------------------------

/// Resolves the session named by a `Cookie` header value. Returns the
/// session and, when a new one had to be created, the `Set-Cookie` header
/// that hands its id to the browser.
pub fn bind_session(state: &StudioState, cookie_header: Option<&str>) -> (SharedSession, Option<Header>) {
    let cookie_id = cookie_header.and_then(|c| parse_cookie(c, SESSION_COOKIE));
    let (session_id, session, created) = lock(&state.sessions).get_or_create(cookie_id);
    let set_cookie = if created {
        Header::from_bytes(&b"Set-Cookie"[..], session_cookie(&session_id).as_bytes()).ok()
    } else {
        None
    };
    (session, set_cookie)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches one request to its handler.
///
/// Every request is bound to a browser session first (see [`bind_session`]).
pub fn dispatch(mut request: Request, state: SharedState) {
    let started = Instant::now();
    let method  = request.method().clone();
    let url     = request.url().to_owned();
    let path    = url.split('?').next().unwrap_or("").to_owned();

    let (session, set_cookie) = bind_session(&state, header_value(&request, "Cookie").as_deref());

    let response = match (&method, path.as_str()) {
        // ── Page ─────────────────────────────────────────────────────────
        (Method::Get,  "/")       => handlers::page::handle_get(&session),

        // ── Upload ───────────────────────────────────────────────────────
        (Method::Post, "/upload") => handlers::upload::handle_upload(&mut request, &session, state.max_upload_bytes),
        (Method::Post, "/reset")  => handlers::upload::handle_reset(&session),

        // ── Slider ───────────────────────────────────────────────────────
        (Method::Post, "/clip")      => handlers::clip::handle_form(&mut request, &session),
        (Method::Post, "/api/clip")  => handlers::clip::handle_api(&mut request, &session),
        (Method::Get,  "/api/state") => handlers::clip::handle_state(&session),

        // ── Images ───────────────────────────────────────────────────────
        (Method::Get, "/image/original.png") => handlers::media::handle_original(&session),
        (Method::Get, "/image/enhanced.png") => handlers::media::handle_enhanced(&session),
        (Method::Get, "/download")           => handlers::media::handle_download(&session),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let response = match set_cookie {
        Some(h) => response.with_header(h),
        None    => response,
    };

    debug!(
        %method,
        path = %path,
        status = response.status_code().0,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    let _ = request.respond(response);
}

/// Writes `response` as HTTP/1.0 and returns only the body bytes.
#[cfg(test)]
pub fn body_of(response: HttpResponse) -> Vec<u8> {
    let mut raw = Vec::new();
    response
        .raw_print(&mut raw, tiny_http::HTTPVersion(1, 0), &[], false, None)
        .unwrap();
    let start = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| p + 4)
        .unwrap_or(raw.len());
    raw.split_off(start)
}
