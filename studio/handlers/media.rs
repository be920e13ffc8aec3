use crate::routes::{download_response, not_found, png_response, text_response, HttpResponse};
use crate::state::{lock, SharedSession};

// ---------------------------------------------------------------------------
// GET /image/original.png  and  GET /image/enhanced.png
// ---------------------------------------------------------------------------

pub fn handle_original(session: &SharedSession) -> HttpResponse {
    let png = lock(session).controller.original_png().map(<[u8]>::to_vec);
    png.map(png_response).unwrap_or_else(not_found)
}

pub fn handle_enhanced(session: &SharedSession) -> HttpResponse {
    let png = lock(session).controller.enhanced_png().map(<[u8]>::to_vec);
    png.map(png_response).unwrap_or_else(not_found)
}

// ---------------------------------------------------------------------------
// GET /download
// ---------------------------------------------------------------------------

/// Serves the enhanced PNG as `imagem_melhorada_clahe_{clip}.png`.
pub fn handle_download(session: &SharedSession) -> HttpResponse {
    let s = lock(session);
    match s.controller.download() {
        Some(d) => download_response(d.bytes.clone(), d.mime, &d.file_name),
        None if s.controller.is_ready() => text_response(
            500,
            "The enhanced image could not be encoded. Move the slider to try again.",
        ),
        None => not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::body_of;
    use crate::state::Session;
    use clahe_studio::imaging::{decode, encode_png};
    use clahe_studio::ClipLimit;
    use image::{GrayImage, Luma};
    use std::sync::{Arc, Mutex};

    fn header(resp: &HttpResponse, name: &'static str) -> Option<String> {
        resp.headers()
            .iter()
            .find(|h| h.field.equiv(name))
            .map(|h| h.value.as_str().to_owned())
    }

    fn source() -> GrayImage {
        GrayImage::from_fn(80, 60, |x, y| Luma([(100 + (x * 3 + y) % 25) as u8]))
    }

    fn ready_session() -> SharedSession {
        let session = Arc::new(Mutex::new(Session::new()));
        lock(&session)
            .controller
            .upload("scan.png", &encode_png(&source()).unwrap())
            .unwrap();
        session
    }

    #[test]
    fn test_idle_has_no_images() {
        let session = Arc::new(Mutex::new(Session::new()));
        assert_eq!(handle_original(&session).status_code().0, 404);
        assert_eq!(handle_enhanced(&session).status_code().0, 404);
        assert_eq!(handle_download(&session).status_code().0, 404);
    }

    #[test]
    fn test_original_is_source_pixels() {
        let resp = handle_original(&ready_session());
        assert_eq!(resp.status_code().0, 200);
        assert_eq!(header(&resp, "Content-Type").as_deref(), Some("image/png"));
        assert_eq!(decode(&body_of(resp)).unwrap(), source());
    }

    #[test]
    fn test_download_headers() {
        let session = ready_session();
        lock(&session).controller.set_clip_limit(ClipLimit::new(1.0).unwrap()).unwrap();

        let resp = handle_download(&session);
        assert_eq!(resp.status_code().0, 200);
        assert_eq!(header(&resp, "Content-Type").as_deref(), Some("image/png"));
        assert_eq!(
            header(&resp, "Content-Disposition").as_deref(),
            Some("attachment; filename=\"imagem_melhorada_clahe_1.0.png\"")
        );
        let downloaded = body_of(resp);
        assert_eq!(downloaded, body_of(handle_enhanced(&session)));
    }
}
