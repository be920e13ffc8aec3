use clahe_studio::render;

use crate::render::render_page;
use crate::routes::{html_response, HttpResponse};
use crate::state::{lock, SharedSession};

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_get(session: &SharedSession) -> HttpResponse {
    let mut s = lock(session);
    let flash = s.take_flash();
    let ui = render(&s.controller);
    drop(s);

    html_response(render_page(&ui, flash.as_ref()))
}
