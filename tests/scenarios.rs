//! End-to-end sessions driven through the public controller API.

use std::io::Cursor;

use clahe_studio::controller::Phase;
use clahe_studio::imaging::{decode, encode_png, enhance};
use clahe_studio::{render, ClipLimit, Error, InteractionController};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};

/// Synthetic radiograph: a bright "tooth" ellipse with low-contrast texture
/// over a darker, noisy background.
fn radiograph(width: u32, height: u32) -> GrayImage {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    GrayImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 - cx) / (width as f32 * 0.3);
        let dy = (y as f32 - cy) / (height as f32 * 0.4);
        let texture = ((x * 13 + y * 7) % 11) as u8;
        if dx * dx + dy * dy < 1.0 {
            Luma([150 + texture])
        } else {
            Luma([70 + texture])
        }
    })
}

fn as_bmp(img: &GrayImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut cursor, ImageOutputFormat::Bmp)
        .unwrap();
    cursor.into_inner()
}

#[test]
fn decode_then_encode_is_pixel_exact() {
    let img = radiograph(90, 70);
    for bytes in [encode_png(&img).unwrap(), as_bmp(&img)] {
        let decoded = decode(&bytes).unwrap();
        let reencoded = encode_png(&decoded).unwrap();
        assert_eq!(decode(&reencoded).unwrap(), img);
    }
}

#[test]
fn uniform_upload_stays_uniform() {
    let flat = GrayImage::from_pixel(100, 100, Luma([128]));
    let mut ctl = InteractionController::new();
    ctl.upload("flat.png", &encode_png(&flat).unwrap()).unwrap();
    assert_eq!(ctl.dimensions(), Some((100, 100)));

    for clip in ClipLimit::all() {
        ctl.set_clip_limit(clip).unwrap();
        let enhanced = decode(ctl.enhanced_png().unwrap()).unwrap();
        assert_eq!(enhanced.dimensions(), (100, 100));
        let first = enhanced.get_pixel(0, 0).0[0];
        assert!(enhanced.pixels().all(|p| p.0[0] == first), "clip {clip}");
    }
}

#[test]
fn corrupted_upload_is_reported_and_nothing_rendered() {
    let mut ctl = InteractionController::new();
    let err = ctl
        .upload("xray.jpg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'])
        .unwrap_err();
    assert!(err.is_decode_error(), "{err}");

    let ui = render(&ctl);
    assert_eq!(ui.phase, Phase::Idle);
    assert!(ui.ready.is_none());
    assert!(ctl.download().is_none());
}

#[test]
fn corrupted_upload_after_good_one_hides_old_images() {
    let mut ctl = InteractionController::new();
    ctl.upload("good.png", &encode_png(&radiograph(64, 64)).unwrap()).unwrap();
    assert_eq!(render(&ctl).phase, Phase::Ready);

    assert!(ctl.upload("bad.png", b"garbage").is_err());
    let ui = render(&ctl);
    assert_eq!(ui.phase, Phase::Idle);
    assert!(ui.upload.current_file.is_none());
    assert!(ctl.original_png().is_none());
}

#[test]
fn slider_extremes_give_different_results_and_names() {
    let img = radiograph(160, 120);
    let mut ctl = InteractionController::new();
    ctl.upload("xray.bmp", &as_bmp(&img)).unwrap();

    ctl.set_clip_limit(ClipLimit::new(1.0).unwrap()).unwrap();
    let weak = ctl.download().unwrap().clone();
    ctl.set_clip_limit(ClipLimit::new(15.0).unwrap()).unwrap();
    let strong = ctl.download().unwrap().clone();

    assert_eq!(weak.file_name, "imagem_melhorada_clahe_1.0.png");
    assert_eq!(strong.file_name, "imagem_melhorada_clahe_15.0.png");
    assert_eq!(weak.mime, "image/png");

    let weak = decode(&weak.bytes).unwrap();
    let strong = decode(&strong.bytes).unwrap();
    assert_eq!(weak.dimensions(), (160, 120));
    assert_eq!(strong.dimensions(), (160, 120));
    assert_ne!(weak, strong);
}

#[test]
fn download_matches_enhancer_output() {
    let img = radiograph(128, 128);
    let clip = ClipLimit::new(5.5).unwrap();
    let mut ctl = InteractionController::new();
    ctl.upload("xray.png", &encode_png(&img).unwrap()).unwrap();
    ctl.set_clip_limit(clip).unwrap();

    let downloaded = decode(&ctl.download().unwrap().bytes).unwrap();
    assert_eq!(downloaded, enhance(&img, clip));
}

#[test]
fn out_of_range_parameter_is_rejected() {
    assert!(matches!(
        ClipLimit::new(0.0),
        Err(Error::ParameterOutOfRange { .. })
    ));
    assert!(matches!(
        ClipLimit::new(30.0),
        Err(Error::ParameterOutOfRange { .. })
    ));
}
