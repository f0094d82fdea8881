//! Device frame renderer.
//!
//! Draws one image inside a device chrome centered at a point. Stateless:
//! the only side effect is on the target surface.

use tiny_skia::{Path, PathBuilder, Pixmap, Rect};

use super::{BROWSER_TITLE_BAR, DeviceFrameKind, FrameSize, frame_size};
use crate::raster::{self, Corners, Rgba8, Surface, cover_rect, ellipse, polygon, rounded_rect};

const PHONE_BODY: Rgba8 = Rgba8::rgb(0x1c, 0x1c, 0x1e);
const PHONE_RIM: Rgba8 = Rgba8::rgb(0x3a, 0x3a, 0x3c);
const TABLET_BODY: Rgba8 = Rgba8::rgb(0x2c, 0x2c, 0x2e);
const CAMERA: Rgba8 = Rgba8::rgb(0x48, 0x48, 0x4a);
const LAPTOP_LID: Rgba8 = Rgba8::rgb(0x1d, 0x1d, 0x1f);
const LAPTOP_BASE: Rgba8 = Rgba8::rgb(0xc7, 0xc8, 0xca);
const LAPTOP_HINGE: Rgba8 = Rgba8::rgb(0xa1, 0xa2, 0xa5);
const MONITOR_BODY: Rgba8 = Rgba8::rgb(0x11, 0x11, 0x13);
const MONITOR_NECK: Rgba8 = Rgba8::rgb(0x2a, 0x2a, 0x2c);
const MONITOR_BASE: Rgba8 = Rgba8::rgb(0x3a, 0x3a, 0x3c);
const IMAC_GLASS: Rgba8 = Rgba8::rgb(0x0b, 0x0b, 0x0c);
const IMAC_ALUMINUM: Rgba8 = Rgba8::rgb(0xe3, 0xe4, 0xe6);
const IMAC_CHIN: Rgba8 = Rgba8::rgb(0xd4, 0xd5, 0xd7);
const IMAC_STAND: Rgba8 = Rgba8::rgb(0xc9, 0xca, 0xcc);
const IMAC_FOOT: Rgba8 = Rgba8::rgb(0xb9, 0xba, 0xbd);
const TRAFFIC_LIGHTS: [Rgba8; 3] = [
    Rgba8::rgb(0xff, 0x5f, 0x57),
    Rgba8::rgb(0xfe, 0xbc, 0x2e),
    Rgba8::rgb(0x28, 0xc8, 0x40),
];

const BROWSER_RADIUS: f32 = 12.0;

/// Bounding box of the frame body centered at `(cx, cy)`.
pub fn frame_rect(kind: DeviceFrameKind, cx: f32, cy: f32, target_width: f32, image_aspect: f32) -> Option<Rect> {
    let size = frame_size(kind, target_width, image_aspect);
    Rect::from_xywh(cx - size.width / 2.0, cy - size.height / 2.0, size.width, size.height)
}

/// Draw `image` inside a `kind` frame centered at `(cx, cy)`.
///
/// An image that is not decoded yet (`None`) draws nothing.
pub fn render_frame(
    surface: &mut Surface,
    kind: DeviceFrameKind,
    image: Option<&Pixmap>,
    cx: f32,
    cy: f32,
    target_width: f32,
) {
    let Some(image) = image else {
        return;
    };
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let aspect = image.height() as f32 / image.width() as f32;
    let size = frame_size(kind, target_width, aspect);
    let x = cx - size.width / 2.0;
    let y = cy - size.height / 2.0;

    match kind {
        DeviceFrameKind::None => draw_unframed(surface, image, x, y, size),
        DeviceFrameKind::Phone => draw_phone(surface, image, x, y, size),
        DeviceFrameKind::Tablet => draw_tablet(surface, image, x, y, size),
        DeviceFrameKind::Laptop => draw_laptop(surface, image, x, y, size),
        DeviceFrameKind::DesktopMonitor => draw_monitor(surface, image, x, y, size),
        DeviceFrameKind::Imac => draw_imac(surface, image, x, y, size),
        DeviceFrameKind::BrowserLight => draw_browser(surface, image, x, y, size, false),
        DeviceFrameKind::BrowserDark => draw_browser(surface, image, x, y, size, true),
    }
}

/// Draw the image covering `screen`, clipped to `clip`.
fn fill_screen(surface: &mut Surface, image: &Pixmap, screen: Rect, clip: &Path) {
    if let Some(dest) = cover_rect(screen, image.width(), image.height()) {
        surface.draw_image(image, dest, clip);
    }
}

/// Shadow of `path` using the frame kind's shadow constants.
fn shadow_under(surface: &mut Surface, kind: DeviceFrameKind, path: &Path) {
    if let Some(shadow) = kind.shadow() {
        surface.drop_shadow(path, &shadow);
    }
}

/// Inset screen rectangle and its clip path.
fn screen(x: f32, y: f32, w: f32, h: f32, corners: Corners) -> Option<(Rect, Path)> {
    let rect = Rect::from_xywh(x, y, w, h)?;
    let path = rounded_rect(x, y, w, h, corners)?;
    Some((rect, path))
}

fn draw_unframed(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize) {
    if let Some((rect, clip)) = screen(x, y, size.width, size.height, Corners::default()) {
        fill_screen(surface, image, rect, &clip);
    }
}

fn draw_phone(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize) {
    let w = size.width;
    let Some(body) = rounded_rect(x, y, w, size.height, Corners::all(w * 0.14)) else {
        return;
    };
    shadow_under(surface, DeviceFrameKind::Phone, &body);
    surface.fill_path(&body, PHONE_BODY);
    surface.stroke_path(&body, PHONE_RIM, w * 0.01, None);

    let bezel = w * 0.045;
    if let Some((rect, clip)) = screen(
        x + bezel,
        y + bezel,
        w - bezel * 2.0,
        size.height - bezel * 2.0,
        Corners::all(w * 0.1),
    ) {
        fill_screen(surface, image, rect, &clip);
    }

    // Dynamic island
    let island_w = w * 0.28;
    let island_h = w * 0.075;
    if let Some(island) = rounded_rect(
        x + (w - island_w) / 2.0,
        y + bezel + w * 0.03,
        island_w,
        island_h,
        Corners::all(island_h / 2.0),
    ) {
        surface.fill_path(&island, Rgba8::BLACK);
    }
}

fn draw_tablet(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize) {
    let w = size.width;
    let Some(body) = rounded_rect(x, y, w, size.height, Corners::all(w * 0.06)) else {
        return;
    };
    shadow_under(surface, DeviceFrameKind::Tablet, &body);
    surface.fill_path(&body, TABLET_BODY);

    let bezel = w * 0.045;
    if let Some((rect, clip)) = screen(
        x + bezel,
        y + bezel,
        w - bezel * 2.0,
        size.height - bezel * 2.0,
        Corners::all(w * 0.025),
    ) {
        fill_screen(surface, image, rect, &clip);
    }

    if let Some(camera) = ellipse(x + w / 2.0, y + bezel / 2.0, w * 0.008, w * 0.008) {
        surface.fill_path(&camera, CAMERA);
    }
}

/// Keyboard base wedge below the hinge: wider than the lid, tapering
/// slightly toward the bottom.
fn push_laptop_base(pb: &mut PathBuilder, x: f32, y: f32, size: FrameSize) {
    let w = size.width;
    let top = y + size.height;
    let depth = w * 0.03;
    let top_over = w * 0.07;
    let bottom_over = w * 0.05;
    pb.move_to(x - top_over, top);
    pb.line_to(x + w + top_over, top);
    pb.line_to(x + w + bottom_over, top + depth * 0.7);
    pb.quad_to(x + w + bottom_over - depth * 0.3, top + depth, x + w + bottom_over - depth, top + depth);
    pb.line_to(x - bottom_over + depth, top + depth);
    pb.quad_to(x - bottom_over + depth * 0.3, top + depth, x - bottom_over, top + depth * 0.7);
    pb.close();
}

fn laptop_base(x: f32, y: f32, size: FrameSize) -> Option<Path> {
    let mut pb = PathBuilder::new();
    push_laptop_base(&mut pb, x, y, size);
    pb.finish()
}

fn draw_laptop(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize) {
    let w = size.width;
    let h = size.height;
    let lid_corners = Corners {
        top_left: w * 0.025,
        top_right: w * 0.025,
        bottom_right: w * 0.006,
        bottom_left: w * 0.006,
    };
    let Some(lid) = rounded_rect(x, y, w, h, lid_corners) else {
        return;
    };
    let base = laptop_base(x, y, size);

    // One silhouette for lid and base so the shadow is continuous.
    let mut silhouette = PathBuilder::new();
    raster::push_rounded_rect(&mut silhouette, x, y, w, h, lid_corners);
    push_laptop_base(&mut silhouette, x, y, size);
    if let Some(silhouette) = silhouette.finish() {
        shadow_under(surface, DeviceFrameKind::Laptop, &silhouette);
    }

    surface.fill_path(&lid, LAPTOP_LID);

    let side = w * 0.022;
    let top = w * 0.03;
    let bottom = w * 0.045;
    let screen_x = x + side;
    let screen_y = y + top;
    let screen_w = w - side * 2.0;
    if let Some((rect, clip)) = screen(
        screen_x,
        screen_y,
        screen_w,
        h - top - bottom,
        Corners::all(w * 0.006),
    ) {
        fill_screen(surface, image, rect, &clip);
    }

    // Camera notch cut into the top of the screen
    let notch_w = w * 0.1;
    let notch_h = w * 0.016;
    if let Some(notch) = rounded_rect(
        x + (w - notch_w) / 2.0,
        screen_y - 0.5,
        notch_w,
        notch_h + 0.5,
        Corners::bottom(notch_h * 0.45),
    ) {
        surface.fill_path(&notch, LAPTOP_LID);
    }
    if let Some(camera) = ellipse(x + w / 2.0, screen_y + notch_h * 0.45, w * 0.0035, w * 0.0035) {
        surface.fill_path(&camera, CAMERA);
    }

    if let Some(base) = &base {
        surface.fill_path(base, LAPTOP_BASE);
    }
    // Finger indent at the front edge of the base
    let indent_w = w * 0.16;
    if let Some(indent) = rounded_rect(
        x + (w - indent_w) / 2.0,
        y + h,
        indent_w,
        w * 0.008,
        Corners::bottom(w * 0.006),
    ) {
        surface.fill_path(&indent, LAPTOP_HINGE);
    }
}

fn draw_monitor(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize) {
    let w = size.width;
    let h = size.height;
    let neck_w = w * 0.09;
    let neck_h = w * 0.11;
    let neck = Rect::from_xywh(x + (w - neck_w) / 2.0, y + h, neck_w, neck_h);
    let foot_rect = Rect::from_xywh(x + w / 2.0 - w * 0.17, y + h + neck_h - w * 0.022, w * 0.34, w * 0.044);
    let Some(body) = rounded_rect(x, y, w, h, Corners::all(w * 0.012)) else {
        return;
    };

    let mut silhouette = PathBuilder::new();
    raster::push_rounded_rect(&mut silhouette, x, y, w, h, Corners::all(w * 0.012));
    if let Some(neck) = neck {
        silhouette.push_rect(neck);
    }
    if let Some(foot) = foot_rect {
        silhouette.push_oval(foot);
    }
    if let Some(silhouette) = silhouette.finish() {
        shadow_under(surface, DeviceFrameKind::DesktopMonitor, &silhouette);
    }

    if let Some(neck) = neck {
        surface.fill_path(&PathBuilder::from_rect(neck), MONITOR_NECK);
    }
    if let Some(foot) = foot_rect.and_then(PathBuilder::from_oval) {
        surface.fill_path(&foot, MONITOR_BASE);
    }
    surface.fill_path(&body, MONITOR_BODY);

    let bezel = w * 0.018;
    let chin = w * 0.035;
    if let Some((rect, clip)) = screen(
        x + bezel,
        y + bezel,
        w - bezel * 2.0,
        h - bezel - chin,
        Corners::all(w * 0.004),
    ) {
        fill_screen(surface, image, rect, &clip);
    }
}

fn draw_imac(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize) {
    let w = size.width;
    let h = size.height;
    let radius = w * 0.018;
    let glass_h = h * 0.82;
    let stand_h = w * 0.14;
    let stand_top = w * 0.18;
    let stand_bottom = w * 0.2;
    let cx = x + w / 2.0;

    let stand_points = [
        (cx - stand_top / 2.0, y + h),
        (cx + stand_top / 2.0, y + h),
        (cx + stand_bottom / 2.0, y + h + stand_h),
        (cx - stand_bottom / 2.0, y + h + stand_h),
    ];
    let foot_rect = Rect::from_xywh(cx - w * 0.13, y + h + stand_h - w * 0.018, w * 0.26, w * 0.036);
    let Some(body) = rounded_rect(x, y, w, h, Corners::all(radius)) else {
        return;
    };

    let mut silhouette = PathBuilder::new();
    raster::push_rounded_rect(&mut silhouette, x, y, w, h, Corners::all(radius));
    raster::push_polygon(&mut silhouette, &stand_points);
    if let Some(foot) = foot_rect {
        silhouette.push_oval(foot);
    }
    if let Some(silhouette) = silhouette.finish() {
        shadow_under(surface, DeviceFrameKind::Imac, &silhouette);
    }

    if let Some(stand) = polygon(&stand_points) {
        surface.fill_path(&stand, IMAC_STAND);
    }
    if let Some(foot) = foot_rect.and_then(PathBuilder::from_oval) {
        surface.fill_path(&foot, IMAC_FOOT);
    }
    surface.fill_path(&body, IMAC_ALUMINUM);

    // Glass panel above the chin, chin band below
    if let Some(glass) = rounded_rect(x, y, w, glass_h, Corners::top(radius)) {
        surface.fill_path(&glass, IMAC_GLASS);
    }
    if let Some(chin) = rounded_rect(x, y + glass_h, w, h - glass_h, Corners::bottom(radius)) {
        surface.fill_path(&chin, IMAC_CHIN);
    }

    let bezel = w * 0.02;
    if let Some((rect, clip)) = screen(
        x + bezel,
        y + bezel,
        w - bezel * 2.0,
        glass_h - bezel * 2.0,
        Corners::default(),
    ) {
        fill_screen(surface, image, rect, &clip);
    }
}

fn draw_browser(surface: &mut Surface, image: &Pixmap, x: f32, y: f32, size: FrameSize, dark: bool) {
    let w = size.width;
    let h = size.height;
    let kind = if dark {
        DeviceFrameKind::BrowserDark
    } else {
        DeviceFrameKind::BrowserLight
    };
    let (bar, address) = if dark {
        (Rgba8::rgb(0x2b, 0x2b, 0x2e), Rgba8::rgb(0x3c, 0x3c, 0x40))
    } else {
        (Rgba8::rgb(0xec, 0xec, 0xec), Rgba8::WHITE)
    };

    let Some(window) = rounded_rect(x, y, w, h, Corners::all(BROWSER_RADIUS)) else {
        return;
    };
    shadow_under(surface, kind, &window);

    if let Some(title) = rounded_rect(x, y, w, BROWSER_TITLE_BAR, Corners::top(BROWSER_RADIUS)) {
        surface.fill_path(&title, bar);
    }
    for (i, color) in TRAFFIC_LIGHTS.iter().enumerate() {
        if let Some(dot) = ellipse(x + 20.0 + 20.0 * i as f32, y + BROWSER_TITLE_BAR / 2.0, 6.0, 6.0) {
            surface.fill_path(&dot, *color);
        }
    }
    if w > 200.0 {
        if let Some(pill) = rounded_rect(x + 90.0, y + 9.0, w - 110.0, 22.0, Corners::all(11.0)) {
            surface.fill_path(&pill, address);
        }
    }

    if let Some((rect, clip)) = screen(
        x,
        y + BROWSER_TITLE_BAR,
        w,
        h - BROWSER_TITLE_BAR,
        Corners::bottom(BROWSER_RADIUS),
    ) {
        fill_screen(surface, image, rect, &clip);
    }
}
