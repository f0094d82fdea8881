//! # Raster Surface
//!
//! The fixed-resolution output target and the drawing primitives the frame
//! renderer and compositor are built from. Drawing goes through
//! [`tiny_skia`]; a [`Surface`] carries a current transform the way a 2D
//! canvas context does, so rotated layouts can draw with ordinary
//! coordinates.
//!
//! ## Modules
//!
//! - [`color`]: `Rgba8` and hex parsing
//! - [`shadow`]: blurred drop shadows

pub mod color;
pub mod shadow;

pub use color::Rgba8;
pub use shadow::Shadow;

use tiny_skia::{
    FillRule, FilterQuality, GradientStop, LineCap, LinearGradient, Paint, Path, PathBuilder,
    Pattern, Pixmap, Point, PremultipliedColorU8, Rect, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::error::ShowcaseError;

/// Output width in output units (pixels).
pub const OUTPUT_WIDTH: u32 = 1920;
/// Output height in output units (pixels).
pub const OUTPUT_HEIGHT: u32 = 1080;

/// Bezier control-point factor for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// Corner radii, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corners {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl Corners {
    pub const fn all(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    pub const fn top(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: 0.0,
            bottom_left: 0.0,
        }
    }

    pub const fn bottom(r: f32) -> Self {
        Self {
            top_left: 0.0,
            top_right: 0.0,
            bottom_right: r,
            bottom_left: r,
        }
    }
}

/// Append a rounded rectangle to a path builder. Radii are clamped to half
/// the shorter side.
pub fn push_rounded_rect(pb: &mut PathBuilder, x: f32, y: f32, w: f32, h: f32, corners: Corners) {
    let max_r = (w.min(h) / 2.0).max(0.0);
    let tl = corners.top_left.clamp(0.0, max_r);
    let tr = corners.top_right.clamp(0.0, max_r);
    let br = corners.bottom_right.clamp(0.0, max_r);
    let bl = corners.bottom_left.clamp(0.0, max_r);

    pb.move_to(x + tl, y);
    pb.line_to(x + w - tr, y);
    if tr > 0.0 {
        pb.cubic_to(
            x + w - tr + tr * KAPPA,
            y,
            x + w,
            y + tr - tr * KAPPA,
            x + w,
            y + tr,
        );
    }
    pb.line_to(x + w, y + h - br);
    if br > 0.0 {
        pb.cubic_to(
            x + w,
            y + h - br + br * KAPPA,
            x + w - br + br * KAPPA,
            y + h,
            x + w - br,
            y + h,
        );
    }
    pb.line_to(x + bl, y + h);
    if bl > 0.0 {
        pb.cubic_to(
            x + bl - bl * KAPPA,
            y + h,
            x,
            y + h - bl + bl * KAPPA,
            x,
            y + h - bl,
        );
    }
    pb.line_to(x, y + tl);
    if tl > 0.0 {
        pb.cubic_to(x, y + tl - tl * KAPPA, x + tl - tl * KAPPA, y, x + tl, y);
    }
    pb.close();
}

/// Rounded rectangle path. `None` for empty or non-finite rectangles.
pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, corners: Corners) -> Option<Path> {
    if !(w > 0.0 && h > 0.0) {
        return None;
    }
    let mut pb = PathBuilder::new();
    push_rounded_rect(&mut pb, x, y, w, h, corners);
    pb.finish()
}

/// Append a closed polygon through `points`.
pub fn push_polygon(pb: &mut PathBuilder, points: &[(f32, f32)]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    pb.move_to(first.0, first.1);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();
}

/// Closed polygon through `points`.
pub fn polygon(points: &[(f32, f32)]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    push_polygon(&mut pb, points);
    pb.finish()
}

/// Ellipse path centered at `(cx, cy)`.
pub fn ellipse(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<Path> {
    let rect = Rect::from_xywh(cx - rx, cy - ry, rx * 2.0, ry * 2.0)?;
    PathBuilder::from_oval(rect)
}

/// Rectangle `dest` that covers `screen` with an image of the given pixel
/// size, preserving its aspect ratio. Horizontally centered, anchored to the
/// top edge so the top of a page capture stays visible.
pub fn cover_rect(screen: Rect, image_width: u32, image_height: u32) -> Option<Rect> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let scale = (screen.width() / image_width as f32).max(screen.height() / image_height as f32);
    let w = image_width as f32 * scale;
    let h = image_height as f32 * scale;
    Rect::from_xywh(screen.x() + (screen.width() - w) / 2.0, screen.y(), w, h)
}

/// A raster drawing target with a current transform.
pub struct Surface {
    pixmap: Pixmap,
    transform: Transform,
}

impl Surface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, ShowcaseError> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ShowcaseError::InvalidValue(format!("invalid surface size {}x{}", width, height))
        })?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
        })
    }

    /// Create a surface at the fixed output resolution.
    pub fn output() -> Result<Self, ShowcaseError> {
        Self::new(OUTPUT_WIDTH, OUTPUT_HEIGHT)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Reset every pixel to transparent and drop any transform.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.transform = Transform::identity();
    }

    /// Run `f` with `transform` applied on top of the current one, then
    /// restore (canvas `save`/`restore`).
    pub fn with_transform<R>(&mut self, transform: Transform, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.transform;
        self.transform = saved.pre_concat(transform);
        let result = f(self);
        self.transform = saved;
        result
    }

    /// Fill the whole surface (ignores the transform).
    pub fn fill_all(&mut self, color: Rgba8) {
        self.pixmap.fill(color.to_color());
    }

    pub fn fill_path(&mut self, path: &Path, color: Rgba8) {
        let mut paint = Paint::default();
        paint.set_color(color.to_color());
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.transform, None);
    }

    pub fn stroke_path(&mut self, path: &Path, color: Rgba8, width: f32, dash: Option<&[f32]>) {
        let mut paint = Paint::default();
        paint.set_color(color.to_color());
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            line_cap: LineCap::Butt,
            dash: dash.and_then(|d| StrokeDash::new(d.to_vec(), 0.0)),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, self.transform, None);
    }

    /// Fill `path` with a two-stop linear gradient from `start` to `end`.
    pub fn fill_gradient(&mut self, path: &Path, start: (f32, f32), end: (f32, f32), colors: [Rgba8; 2]) {
        let Some(shader) = LinearGradient::new(
            Point::from_xy(start.0, start.1),
            Point::from_xy(end.0, end.1),
            vec![
                GradientStop::new(0.0, colors[0].to_color()),
                GradientStop::new(1.0, colors[1].to_color()),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            // Degenerate gradient (start == end): tiny-skia cannot build it.
            self.fill_path(path, colors[0]);
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.transform, None);
    }

    /// Draw `image` stretched to `dest`, clipped to `clip`.
    pub fn draw_image(&mut self, image: &Pixmap, dest: Rect, clip: &Path) {
        let sx = dest.width() / image.width() as f32;
        let sy = dest.height() / image.height() as f32;
        let shader = Pattern::new(
            image.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            Transform::from_row(sx, 0.0, 0.0, sy, dest.x(), dest.y()),
        );
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap
            .fill_path(clip, &paint, FillRule::Winding, self.transform, None);
    }

    /// Blurred drop shadow of `path` under the current transform.
    pub fn drop_shadow(&mut self, path: &Path, shadow: &Shadow) {
        shadow::draw_shadow(&mut self.pixmap, path, self.transform, shadow);
    }

    /// Source-over blend of `color` at device pixel `(x, y)` with partial
    /// `coverage`. Used for glyph rasterization.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba8, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        let a = (color.3 as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let pixels = self.pixmap.pixels_mut();
        let dst = pixels[idx];
        let inv = 1.0 - a;
        let channel = |src: u8, dst: u8| (src as f32 * a + dst as f32 * inv).round() as u8;
        let out_a = (a * 255.0 + dst.alpha() as f32 * inv).round() as u8;
        let blended = PremultipliedColorU8::from_rgba(
            channel(color.0, dst.red()).min(out_a),
            channel(color.1, dst.green()).min(out_a),
            channel(color.2, dst.blue()).min(out_a),
            out_a,
        );
        if let Some(px) = blended {
            pixels[idx] = px;
        }
    }

    /// Straight-alpha RGBA of a device pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, ShowcaseError> {
        self.pixmap
            .encode_png()
            .map_err(|e| ShowcaseError::Encode(format!("Failed to encode PNG: {}", e)))
    }
}

/// Convert a decoded RGBA image into a premultiplied pixmap.
pub fn pixmap_from_rgba(image: &image::RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        let premul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        *dst = PremultipliedColorU8::from_rgba(premul(r), premul(g), premul(b), a)?;
    }
    Some(pixmap)
}
