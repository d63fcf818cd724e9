//! Integration test: upload, crop, and composite two synthesized images
//! through the public API, the way the web app drives it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_truncation)]

use blendcrop_pipeline::encode::{self, StillFormat};
use blendcrop_pipeline::{
    BlendMode, BlendParams, CanvasSize, CropChoice, CropView, Dimensions, Opacity,
    PublishOutcome, Session, SessionState, Slot, crop, decode, intake,
};

fn landscape_png() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(320, 180, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    encode::encode_png(&img).unwrap()
}

fn portrait_jpeg() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(120, 240, image::Rgba([30, 60, 200, 255]));
    encode::encode(
        &img,
        StillFormat::Jpeg {
            quality: StillFormat::DEFAULT_JPEG_QUALITY,
        },
    )
    .unwrap()
}

/// Intake check, decode, crop window at the canvas aspect, produce.
fn upload_and_crop(
    session: &Session,
    name: &str,
    bytes: &[u8],
    view: CropView,
) -> image::RgbaImage {
    intake::check(name, bytes).expect("upload should be accepted");
    let source = decode::decode(bytes).unwrap();
    let aspect = session.params().canvas_size.aspect_ratio();
    let rect = crop::crop_rect_for_view(source.dimensions(), aspect, view).unwrap();
    crop::produce(&source, rect).unwrap()
}

#[test]
fn two_uploads_produce_a_downloadable_composite() {
    let mut session = Session::new();
    assert_eq!(session.state(), SessionState::Empty);

    let still_a = upload_and_crop(&session, "beach.png", &landscape_png(), CropView::default());
    assert_eq!(Dimensions::of(&still_a), Dimensions::new(180, 180));
    assert!(session.finalize(Slot::A, still_a).is_none());
    assert_eq!(session.state(), SessionState::AwaitingSecondImage);

    let zoomed = CropView {
        zoom: 2.0,
        center_x: 0.5,
        center_y: 0.25,
    };
    let still_b = upload_and_crop(&session, "sky.JPG", &portrait_jpeg(), zoomed);
    assert_eq!(Dimensions::of(&still_b), Dimensions::new(60, 60));
    let request = session.finalize(Slot::B, still_b).unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    let outcome = session.publish(request.generation, request.run());
    assert!(matches!(outcome, PublishOutcome::Published));

    let output = session.result().unwrap();
    assert_eq!(output.dimensions, CanvasSize::DEFAULT.dimensions());
    let decoded = decode::decode(&output.png).unwrap();
    assert_eq!(decoded.dimensions(), Dimensions::new(1080, 1080));

    // Opaque B at source-over covers A completely.
    let center = decoded.pixels().get_pixel(540, 540).0;
    assert!(center[2] > 150, "expected the blue top layer, got {center:?}");
}

#[test]
fn rapid_parameter_changes_publish_only_the_latest() {
    let mut session = Session::new();
    let still_a = upload_and_crop(&session, "a.png", &landscape_png(), CropView::default());
    let still_b = upload_and_crop(&session, "b.jpeg", &portrait_jpeg(), CropView::default());
    session.finalize(Slot::A, still_a);
    let first = session.finalize(Slot::B, still_b).unwrap();

    let second = session.set_blend_mode(BlendMode::Multiply).unwrap();
    let third = session.set_opacity(Opacity::new(0.3).unwrap()).unwrap();
    let small = CanvasSize::new(64, 36).unwrap();
    let last = session.set_canvas_size(small).unwrap();

    // Completions arrive out of order; only the last request may publish.
    for request in [&third, &first, &second] {
        let outcome = session.publish(request.generation, request.run());
        assert!(matches!(outcome, PublishOutcome::Stale));
        assert!(session.result().is_none());
    }
    assert!(matches!(
        session.publish(last.generation, last.run()),
        PublishOutcome::Published
    ));

    let output = session.result().unwrap();
    assert_eq!(output.dimensions, Dimensions::new(64, 36));
    assert_eq!(
        output.params,
        BlendParams {
            canvas_size: small,
            blend_mode: BlendMode::Multiply,
            opacity: Opacity::new(0.3).unwrap(),
        }
    );
}

#[test]
fn non_image_upload_is_rejected_without_state_change() {
    let mut session = Session::new();
    let still_a = upload_and_crop(&session, "a.png", &landscape_png(), CropView::default());
    session.finalize(Slot::A, still_a);
    let generation = session.generation();

    let err = intake::check("report.pdf", b"%PDF-1.7").unwrap_err();
    session.reject_upload(&err);

    assert_eq!(session.state(), SessionState::AwaitingSecondImage);
    assert_eq!(session.generation(), generation);
    assert!(session.image(Slot::B).is_none());
}

#[test]
fn composite_is_byte_identical_across_runs() {
    let params = BlendParams {
        canvas_size: CanvasSize::new(100, 100).unwrap(),
        blend_mode: BlendMode::Exclusion,
        opacity: Opacity::new(0.8).unwrap(),
    };
    let (a, b) = (landscape_png(), portrait_jpeg());
    let run = || {
        let centered = CropChoice::Centered;
        blendcrop_pipeline::blend_sources(&a, centered, &b, centered, &params)
            .unwrap()
            .output
    };
    let (first, second) = (run(), run());
    assert_eq!(first.png, second.png);

    let uri = encode::to_data_uri(&first.png, StillFormat::Png.mime_type());
    let round_trip = decode::decode(&decode::data_uri_payload(&uri).unwrap()).unwrap();
    assert_eq!(round_trip.dimensions(), Dimensions::new(100, 100));
}
