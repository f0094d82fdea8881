//! # Scenario Tests
//!
//! End-to-end checks through the public API: a session is opened on
//! in-memory PNG captures, mutated, rendered, and the output surface is
//! probed at known coordinates.

use chrono::Utc;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use showcase::interact::{Handle, PointerEvent};
use showcase::raster::Rgba8;
use showcase::source::{CaptureKind, DeviceClass};
use showcase::{
    Background, CompositionState, Compositor, DeviceFrameKind, ImageId, MemoryStore, ShowcaseError,
    ShowcaseSession, SourceImage,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn capture(id: &str, class: DeviceClass, width: u32, height: u32, rgb: [u8; 3]) -> SourceImage {
    SourceImage {
        id: ImageId::new(id),
        data: Arc::new(png(width, height, rgb)),
        pixel_width: width,
        pixel_height: height,
        device_class: class,
        capture_kind: CaptureKind::Viewport,
        domain: format!("{}.example.com", id),
        timestamp: Utc::now(),
    }
}

fn desktop(id: &str, rgb: [u8; 3]) -> SourceImage {
    capture(id, DeviceClass::Desktop, 1600, 900, rgb)
}

async fn white_background(session: &mut ShowcaseSession) {
    session
        .set_background(Background::Solid(Rgba8::WHITE))
        .await
        .unwrap();
}

fn pixel(session: &ShowcaseSession, x: u32, y: u32) -> [u8; 4] {
    session.surface().pixel(x, y).unwrap()
}

// ============================================================================
// TEMPLATE SCENARIOS
// ============================================================================

#[tokio::test]
async fn single_device_unframed_is_centered_at_width_900() {
    let mut session = ShowcaseSession::open_single(desktop("site", [255, 0, 0]), Compositor::default()).unwrap();
    white_background(&mut session).await;
    session
        .update(|s| s.set_slot_frame("single-device", "main", DeviceFrameKind::None))
        .await
        .unwrap();

    // 900 x 506.25 centered at (960, 540)
    assert_eq!(pixel(&session, 960, 540), RED);
    assert_eq!(pixel(&session, 512, 290), RED);
    assert_eq!(pixel(&session, 1408, 791), RED);
    assert_eq!(pixel(&session, 505, 540), WHITE);
    assert_eq!(pixel(&session, 1415, 540), WHITE);
    assert_eq!(pixel(&session, 960, 282), WHITE);
    assert_eq!(pixel(&session, 960, 798), WHITE);
}

#[tokio::test]
async fn single_device_unframed_tall_image_caps_height() {
    let tall = capture("tall", DeviceClass::Desktop, 400, 800, [255, 0, 0]);
    let mut session = ShowcaseSession::open_single(tall, Compositor::default()).unwrap();
    white_background(&mut session).await;
    session
        .update(|s| s.set_slot_frame("single-device", "main", DeviceFrameKind::None))
        .await
        .unwrap();

    // Capped at 900 tall, width rescaled to 450
    assert_eq!(pixel(&session, 960, 95), RED);
    assert_eq!(pixel(&session, 960, 985), RED);
    assert_eq!(pixel(&session, 760, 540), RED);
    assert_eq!(pixel(&session, 730, 540), WHITE);
    assert_eq!(pixel(&session, 960, 85), WHITE);
}

#[tokio::test]
async fn comparison_places_before_and_after() {
    let images = vec![desktop("old", [255, 0, 0]), desktop("new", [0, 0, 255])];
    let mut session = ShowcaseSession::open(images, Compositor::default()).unwrap();
    session.switch_template("comparison").await.unwrap();
    white_background(&mut session).await;

    assert_eq!(pixel(&session, 500, 540), RED);
    assert_eq!(pixel(&session, 1420, 540), BLUE);
    // Divider above the badge, badge at the center
    assert_eq!(pixel(&session, 960, 200), [0xd1, 0xd5, 0xdb, 255]);
    assert_eq!(pixel(&session, 960, 540), [0x11, 0x18, 0x27, 255]);
}

#[tokio::test]
async fn comparison_layout_holds_for_every_frame_kind() {
    let images = vec![desktop("old", [255, 0, 0]), desktop("new", [0, 0, 255])];
    let mut session = ShowcaseSession::open(images, Compositor::default()).unwrap();
    session.switch_template("comparison").await.unwrap();
    white_background(&mut session).await;

    for before in DeviceFrameKind::ALL {
        for after in DeviceFrameKind::ALL {
            session
                .update(|s| {
                    s.set_slot_frame("comparison", "before", before)?;
                    s.set_slot_frame("comparison", "after", after)
                })
                .await
                .unwrap();

            let kinds = format!("before={} after={}", before.id(), after.id());
            assert_eq!(pixel(&session, 960, 200), [0xd1, 0xd5, 0xdb, 255], "divider, {}", kinds);
            assert_eq!(pixel(&session, 500, 540), RED, "left image, {}", kinds);
            assert_eq!(pixel(&session, 1420, 540), BLUE, "right image, {}", kinds);
        }
    }
}

#[tokio::test]
async fn picker_assignment_swaps_sides() {
    let images = vec![desktop("old", [255, 0, 0]), desktop("new", [0, 0, 255])];
    let mut session = ShowcaseSession::open(images, Compositor::default()).unwrap();
    session.switch_template("comparison").await.unwrap();
    white_background(&mut session).await;

    let err = session.assign("after", &ImageId::new("old")).await.unwrap_err();
    assert!(matches!(err, ShowcaseError::ImageInUse { .. }));

    session.update(|s| s.set_slot_image("before", None)).await.unwrap();
    session.assign("after", &ImageId::new("old")).await.unwrap();
    assert_eq!(pixel(&session, 1420, 540), RED);
    assert_eq!(pixel(&session, 500, 540), WHITE);
}

#[test]
fn switching_templates_clears_assignments_first() {
    let images = vec![
        desktop("a", [0, 0, 0]),
        capture("m", DeviceClass::Mobile, 390, 844, [0, 0, 0]),
    ];
    let mut state = CompositionState::new("desktop-mobile").unwrap();
    state.switch_template("desktop-mobile", &images).unwrap();
    assert_eq!(state.assigned_images().len(), 2);

    state.set_active_template("app-screens", &images).unwrap();
    assert!(state.assigned_images().is_empty());
    state.switch_template("app-screens", &images).unwrap();
    assert_eq!(state.slot_image("left").map(|i| i.id.as_str()), Some("m"));
}

// ============================================================================
// CUSTOM CANVAS SCENARIOS
// ============================================================================

async fn canvas_with_item() -> (ShowcaseSession, u64) {
    let mut session = ShowcaseSession::open_custom(vec![desktop("site", [255, 0, 0])], Compositor::default()).unwrap();
    let id = session.add_item(&ImageId::new("site")).await.unwrap();
    (session, id)
}

#[tokio::test]
async fn custom_drag_moves_item() {
    let (mut session, id) = canvas_with_item().await;
    let item = session.state().item(id).unwrap();
    assert_eq!((item.center_x, item.center_y, item.width), (960.0, 540.0, 800.0));

    session.pointer(PointerEvent::Down { x: 900.0, y: 500.0 }).await.unwrap();
    session.pointer(PointerEvent::Move { x: 950.0, y: 470.0 }).await.unwrap();
    session.pointer(PointerEvent::Up).await.unwrap();

    let item = session.state().item(id).unwrap();
    assert_eq!((item.center_x, item.center_y, item.width), (1010.0, 510.0, 800.0));
}

#[tokio::test]
async fn custom_left_resize_keeps_right_edge() {
    let (mut session, id) = canvas_with_item().await;
    let bounds = session.state().item(id).unwrap().bounds();
    let right = bounds.x + bounds.width;
    let (hx, hy) = Handle::Left.point(&bounds);

    session.pointer(PointerEvent::Down { x: hx, y: hy }).await.unwrap();
    for dx in [120.0, -60.0, 333.0] {
        assert!(session.pointer(PointerEvent::Move { x: hx + dx, y: hy }).await.unwrap());
        let item = session.state().item(id).unwrap();
        assert!((item.center_x + item.width / 2.0 - right).abs() < 1e-3);
    }
    session.pointer(PointerEvent::Leave).await.unwrap();
    assert_eq!(session.state().item(id).unwrap().width, 800.0 - 333.0);
}

#[tokio::test]
async fn reorder_front_then_back_restores_relative_order() {
    let images = vec![
        desktop("a", [255, 0, 0]),
        desktop("b", [0, 255, 0]),
        desktop("c", [0, 0, 255]),
    ];
    let mut session = ShowcaseSession::open_custom(images, Compositor::default()).unwrap();
    let ids = |s: &ShowcaseSession| s.state().custom_items().iter().map(|i| i.id).collect::<Vec<_>>();
    let before = ids(&session);
    let target = before[1];

    session.update(|s| s.reorder_to_front(target)).await.unwrap();
    session.update(|s| s.reorder_to_back(target)).await.unwrap();

    let after = ids(&session);
    assert_eq!(after[0], target);
    let others = |v: &[u64]| v.iter().copied().filter(|&i| i != target).collect::<Vec<_>>();
    assert_eq!(others(&before), others(&after));
}

// ============================================================================
// EXPORT AND LIFECYCLE
// ============================================================================

#[tokio::test]
async fn saving_empty_composition_uses_fallback_domain() {
    let mut session = ShowcaseSession::open(vec![desktop("site", [255, 0, 0])], Compositor::default()).unwrap();
    session.update(|s| s.set_slot_image("main", None)).await.unwrap();

    let store = MemoryStore::new();
    session.save(&store).await.unwrap();
    let saved = store.images().await;
    assert_eq!(saved[0].domain, "Showcase");
    assert_eq!(saved[0].device_class, DeviceClass::Showcase);
}

#[tokio::test]
async fn exported_png_decodes_at_output_size() {
    let mut session = ShowcaseSession::open(vec![desktop("site", [255, 0, 0])], Compositor::default()).unwrap();
    let png = session.export_png().await.unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1920, 1080));
}

#[tokio::test]
async fn close_during_decode_discards_render() {
    let mut session = ShowcaseSession::open(vec![desktop("site", [255, 0, 0])], Compositor::default()).unwrap();
    let alive = session.liveness();

    let (result, _) = tokio::join!(session.render(), async move {
        alive.store(false, Ordering::SeqCst);
    });
    assert!(matches!(result, Err(ShowcaseError::Closed)));
    assert_eq!(session.render_count(), 0);
    assert!(!session.is_alive());
}
