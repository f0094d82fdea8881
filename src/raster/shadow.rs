//! Blurred drop shadows.
//!
//! A shadow is the silhouette of a path rendered into a scratch alpha
//! buffer, blurred with three box passes (a close Gaussian approximation),
//! and composited under the shape with a vertical offset in device space.

use tiny_skia::{
    Color, FillRule, Paint, Path, Pixmap, PixmapPaint, PremultipliedColorU8, Rect, Transform,
};

/// Shadow parameters, in output units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Canvas-style blur radius (Gaussian sigma is half of this).
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Shadow opacity in [0, 1].
    pub opacity: f32,
}

impl Shadow {
    pub const fn new(blur: f32, offset_y: f32, opacity: f32) -> Self {
        Self {
            blur,
            offset_x: 0.0,
            offset_y,
            opacity,
        }
    }
}

/// Box radius for each of three passes approximating a Gaussian of `sigma`.
fn box_radius(sigma: f32) -> usize {
    if sigma <= 0.0 {
        return 0;
    }
    let ideal = (12.0 * sigma * sigma / 3.0 + 1.0).sqrt();
    ((ideal - 1.0) / 2.0).round().max(0.0) as usize
}

/// One horizontal box pass with a running sum. Out-of-range samples are 0.
fn box_blur_h(src: &[f32], dst: &mut [f32], width: usize, height: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        let out = &mut dst[y * width..(y + 1) * width];
        let mut acc: f32 = row.iter().take(r + 1).sum();
        for x in 0..width {
            out[x] = acc * norm;
            let add = x + r + 1;
            if add < width {
                acc += row[add];
            }
            if x >= r {
                acc -= row[x - r];
            }
        }
    }
}

/// One vertical box pass with a running sum.
fn box_blur_v(src: &[f32], dst: &mut [f32], width: usize, height: usize, r: usize) {
    let norm = 1.0 / (2 * r + 1) as f32;
    for x in 0..width {
        let mut acc: f32 = (0..=r.min(height.saturating_sub(1)))
            .map(|y| src[y * width + x])
            .sum();
        for y in 0..height {
            dst[y * width + x] = acc * norm;
            let add = y + r + 1;
            if add < height {
                acc += src[add * width + x];
            }
            if y >= r {
                acc -= src[(y - r) * width + x];
            }
        }
    }
}

/// Approximate Gaussian blur of an alpha buffer in place.
pub fn blur_alpha(alpha: &mut [f32], width: usize, height: usize, sigma: f32) {
    let r = box_radius(sigma);
    if r == 0 || width == 0 || height == 0 {
        return;
    }
    let mut scratch = vec![0.0f32; alpha.len()];
    for _ in 0..3 {
        box_blur_h(alpha, &mut scratch, width, height, r);
        box_blur_v(&scratch, alpha, width, height, r);
    }
}

/// Device-space scratch area for a shadow: the padded silhouette bounds,
/// clipped to the part of the target the offset shadow can land on.
///
/// The clip keeps `pad` pixels of context past the visible window so the
/// blur is exact at the canvas edges. Returns `(x0, y0, width, height)`,
/// or `None` when the shadow falls entirely off the target.
fn scratch_region(
    bounds: Rect,
    pad: f32,
    offset: (f32, f32),
    target: (u32, u32),
) -> Option<(f32, f32, u32, u32)> {
    let left = (bounds.left() - pad).max(-offset.0 - pad).floor();
    let top = (bounds.top() - pad).max(-offset.1 - pad).floor();
    let right = (bounds.right() + pad).min(target.0 as f32 - offset.0 + pad).ceil();
    let bottom = (bounds.bottom() + pad).min(target.1 as f32 - offset.1 + pad).ceil();
    if !(right > left && bottom > top) {
        return None;
    }
    Some((left, top, (right - left) as u32 + 1, (bottom - top) as u32 + 1))
}

/// Paint the blurred silhouette of `path` (transformed by `transform`) onto `target`.
pub fn draw_shadow(target: &mut Pixmap, path: &Path, transform: Transform, shadow: &Shadow) {
    let Some(device_path) = path.clone().transform(transform) else {
        return;
    };
    let sigma = shadow.blur / 2.0;
    let pad = (box_radius(sigma) * 3 + 2) as f32;
    let Some((x0, y0, width, height)) = scratch_region(
        device_path.bounds(),
        pad,
        (shadow.offset_x, shadow.offset_y),
        (target.width(), target.height()),
    ) else {
        return;
    };

    let Some(mut layer) = Pixmap::new(width, height) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(Color::BLACK);
    layer.fill_path(
        &device_path,
        &paint,
        FillRule::Winding,
        Transform::from_translate(-x0, -y0),
        None,
    );

    let (w, h) = (width as usize, height as usize);
    let mut alpha: Vec<f32> = layer
        .pixels()
        .iter()
        .map(|p| p.alpha() as f32 / 255.0)
        .collect();
    blur_alpha(&mut alpha, w, h, sigma);

    let opacity = shadow.opacity.clamp(0.0, 1.0);
    for (px, a) in layer.pixels_mut().iter_mut().zip(&alpha) {
        let a = (a * opacity * 255.0).round().clamp(0.0, 255.0) as u8;
        *px = PremultipliedColorU8::from_rgba(0, 0, 0, a).unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }

    target.draw_pixmap(
        (x0 + shadow.offset_x).round() as i32,
        (y0 + shadow.offset_y).round() as i32,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::PathBuilder;

    #[test]
    fn test_box_radius() {
        assert_eq!(box_radius(0.0), 0);
        assert_eq!(box_radius(15.0), 15);
    }

    #[test]
    fn test_blur_preserves_mass() {
        let (w, h) = (64, 64);
        let mut alpha = vec![0.0f32; w * h];
        alpha[32 * w + 32] = 1.0;
        blur_alpha(&mut alpha, w, h, 3.0);
        let total: f32 = alpha.iter().sum();
        assert!((total - 1.0).abs() < 1e-3, "total = {}", total);
        // Spread out, so the peak dropped
        assert!(alpha[32 * w + 32] < 0.5);
    }

    #[test]
    fn test_blur_uniform_field_stays_uniform_inside() {
        let (w, h) = (40, 40);
        let mut alpha = vec![1.0f32; w * h];
        blur_alpha(&mut alpha, w, h, 2.0);
        assert!((alpha[20 * w + 20] - 1.0).abs() < 1e-4);
        // Edges fall off because outside samples count as empty
        assert!(alpha[0] < 0.9);
    }

    #[test]
    fn test_shadow_is_offset_below_shape() {
        let mut target = Pixmap::new(200, 200).unwrap();
        let rect = Rect::from_xywh(50.0, 50.0, 100.0, 60.0).unwrap();
        let path = PathBuilder::from_rect(rect);
        draw_shadow(&mut target, &path, Transform::identity(), &Shadow::new(10.0, 20.0, 0.5));

        let alpha_at = |x: u32, y: u32| target.pixel(x, y).map(|p| p.alpha()).unwrap_or(0);
        // Below the shape (covered only by the offset shadow)
        assert!(alpha_at(100, 125) > 0);
        // Far away from the shape
        assert_eq!(alpha_at(5, 5), 0);
    }

    #[test]
    fn test_scratch_region_is_clipped_to_target() {
        let wide = Rect::from_xywh(-50_000.0, 20.0, 100_000.0, 100.0).unwrap();
        let (_, _, w, h) = scratch_region(wide, 20.0, (0.0, 10.0), (200, 200)).unwrap();
        assert!(w <= 200 + 2 * 20 + 2, "w = {}", w);
        assert!(h <= 100 + 2 * 20 + 2, "h = {}", h);

        let small = Rect::from_xywh(50.0, 50.0, 100.0, 60.0).unwrap();
        let (x0, y0, w, h) = scratch_region(small, 20.0, (0.0, 10.0), (200, 200)).unwrap();
        assert_eq!((x0, y0), (30.0, 30.0));
        assert_eq!((w, h), (141, 101));
    }

    #[test]
    fn test_scratch_region_off_canvas_is_empty() {
        let far = Rect::from_xywh(20_000.0, 50.0, 4000.0, 2600.0).unwrap();
        assert_eq!(scratch_region(far, 20.0, (0.0, 10.0), (1920, 1080)), None);
        let above = Rect::from_xywh(100.0, -500.0, 100.0, 100.0).unwrap();
        assert_eq!(scratch_region(above, 20.0, (0.0, 10.0), (1920, 1080)), None);
    }

    #[test]
    fn test_huge_shape_shadow_still_lands_on_canvas() {
        let mut target = Pixmap::new(200, 200).unwrap();
        let rect = Rect::from_xywh(-40_000.0, 50.0, 80_000.0, 60.0).unwrap();
        let path = PathBuilder::from_rect(rect);
        draw_shadow(&mut target, &path, Transform::identity(), &Shadow::new(10.0, 20.0, 0.4));

        let alpha_at = |x: u32, y: u32| target.pixel(x, y).map(|p| p.alpha()).unwrap_or(0);
        // Clipping must not create a fall-off at the canvas edges
        assert_eq!(alpha_at(0, 100), alpha_at(100, 100));
        assert!(alpha_at(199, 100) > 0);
        assert_eq!(alpha_at(100, 5), 0);
    }
}
