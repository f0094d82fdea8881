//! # Canvas Compositor
//!
//! Paints a [`CompositionState`] onto the 1920×1080 output surface:
//!
//! 1. Clear, then paint the background
//! 2. Template mode: every placed slot with its decorators, then overlays
//!    and text. Custom mode: items back to front, then the selection
//! 3. Slots whose image has not decoded are skipped
//!
//! Decoding happens ahead of painting in [`ImageCache::prepare`], which
//! runs every missing decode on the blocking pool and awaits them all. The
//! paint itself is synchronous and never mutates the state.

use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{Pixmap, Rect, Transform};
use tracing::{debug, warn};

use crate::error::ShowcaseError;
use crate::frame::render::frame_rect;
use crate::frame::{DeviceFrameKind, render_frame};
use crate::interact::{HANDLE_RADIUS, handle_points};
use crate::raster::{Corners, Rgba8, Surface, ellipse, pixmap_from_rgba, rounded_rect};
use crate::source::{ImageId, SourceImage};
use crate::state::{Background, CompositionState, CustomItem};
use crate::template::{Decorator, Overlay, SlotPlacement, TemplateLayout};
use crate::text::{TextAlign, TextFont};

const SELECTION: Rgba8 = Rgba8::rgb(0x3b, 0x82, 0xf6);
const SELECTION_DASH: [f32; 2] = [8.0, 6.0];
const BADGE_LABEL_SIZE: f32 = 26.0;

/// Decode an encoded image into a premultiplied pixmap.
pub fn decode_image(data: &[u8]) -> Result<Pixmap, ShowcaseError> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| ShowcaseError::Decode(format!("Failed to decode image: {}", e)))?;
    let rgba = decoded.to_rgba8();
    pixmap_from_rgba(&rgba).ok_or_else(|| {
        ShowcaseError::Decode(format!("Image has unusable size {}x{}", rgba.width(), rgba.height()))
    })
}

/// Decoded pixmaps keyed by image id. A failed decode is remembered as
/// `None` so it is not retried on every render.
#[derive(Debug, Default, Clone)]
pub struct ImageCache {
    entries: HashMap<ImageId, Option<Arc<Pixmap>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ImageId) -> Option<&Pixmap> {
        self.entries.get(id).and_then(|e| e.as_deref())
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, id: ImageId, pixmap: Pixmap) {
        self.entries.insert(id, Some(Arc::new(pixmap)));
    }

    /// Decode every image not yet cached, concurrently on the blocking
    /// pool, and wait for all of them.
    pub async fn prepare(&mut self, images: &[&SourceImage]) {
        let mut pending = Vec::new();
        for image in images {
            if self.entries.contains_key(&image.id) || pending.iter().any(|(id, _)| id == &image.id) {
                continue;
            }
            let data = Arc::clone(&image.data);
            let handle = tokio::task::spawn_blocking(move || decode_image(&data));
            pending.push((image.id.clone(), handle));
        }

        for (id, handle) in pending {
            let entry = match handle.await {
                Ok(Ok(pixmap)) => {
                    debug!(image = %id, width = pixmap.width(), height = pixmap.height(), "decoded");
                    Some(Arc::new(pixmap))
                }
                Ok(Err(e)) => {
                    warn!(image = %id, "{}", e);
                    None
                }
                Err(e) => {
                    warn!(image = %id, "decode task failed: {}", e);
                    None
                }
            };
            self.entries.insert(id, entry);
        }
    }

    /// Drop cached images not in `keep`.
    pub fn retain(&mut self, keep: &[&SourceImage]) {
        self.entries.retain(|id, _| keep.iter().any(|img| &img.id == id));
    }
}

/// Paints composition state. Holds the optional text font.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    font: Option<TextFont>,
}

impl Compositor {
    pub fn new(font: Option<TextFont>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> Option<&TextFont> {
        self.font.as_ref()
    }

    /// Decode everything `state` references and paint it onto a fresh
    /// output surface.
    pub async fn render(&self, state: &CompositionState) -> Result<Surface, ShowcaseError> {
        let mut cache = ImageCache::new();
        cache.prepare(&state.referenced_images()).await;
        let mut surface = Surface::output()?;
        self.paint(&mut surface, state, &cache);
        Ok(surface)
    }

    /// Paint `state` onto `surface`, replacing its contents.
    pub fn paint(&self, surface: &mut Surface, state: &CompositionState, cache: &ImageCache) {
        surface.clear();
        paint_background(surface, state.background());

        if state.is_custom() {
            self.paint_custom(surface, state, cache);
        } else if let Some(layout) = state.template().layout() {
            self.paint_template(surface, state, cache, layout);
        }
    }

    fn paint_template(
        &self,
        surface: &mut Surface,
        state: &CompositionState,
        cache: &ImageCache,
        layout: &TemplateLayout,
    ) {
        let template = state.template();
        for placement in layout.slots {
            let Some(source) = state.slot_image(placement.slot) else {
                continue;
            };
            let Some(pixmap) = cache.get(&source.id) else {
                debug!(slot = placement.slot, image = %source.id, "slot image not decoded, skipped");
                continue;
            };
            let frame = state
                .slot_frame(template, placement.slot)
                .unwrap_or_default();
            paint_slot(surface, placement, frame, pixmap);
        }

        for overlay in layout.overlays {
            self.paint_overlay(surface, overlay);
        }

        if layout.texts.is_empty() {
            return;
        }
        let Some(font) = &self.font else {
            warn!(template = template.id, "no font loaded, text skipped");
            return;
        };
        for placement in layout.texts {
            let value = state.text_value(placement.text).unwrap_or_default();
            font.draw_wrapped(
                surface,
                value,
                placement.x,
                placement.y,
                placement.max_width,
                placement.size,
                placement.color,
                placement.align,
            );
        }
    }

    fn paint_overlay(&self, surface: &mut Surface, overlay: &Overlay) {
        match *overlay {
            Overlay::Divider {
                x,
                top,
                bottom,
                width,
                color,
            } => {
                if let Some(path) = Rect::from_ltrb(x - width / 2.0, top, x + width / 2.0, bottom)
                    .map(tiny_skia::PathBuilder::from_rect)
                {
                    surface.fill_path(&path, color);
                }
            }
            Overlay::Badge {
                x,
                y,
                radius,
                fill,
                label,
                label_color,
            } => {
                if let Some(circle) = ellipse(x, y, radius, radius) {
                    surface.fill_path(&circle, fill);
                }
                if let Some(font) = &self.font {
                    font.draw_line(
                        surface,
                        label,
                        x,
                        y + BADGE_LABEL_SIZE * 0.35,
                        BADGE_LABEL_SIZE,
                        label_color,
                        TextAlign::Center,
                    );
                }
            }
        }
    }

    fn paint_custom(&self, surface: &mut Surface, state: &CompositionState, cache: &ImageCache) {
        for item in state.custom_items() {
            match cache.get(&item.image.id) {
                Some(pixmap) => render_frame(surface, item.frame, Some(pixmap), item.center_x, item.center_y, item.width),
                None => debug!(item = item.id, "item image not decoded, skipped"),
            }
        }
        if let Some(item) = state.selected_item() {
            paint_selection(surface, item);
        }
    }
}

/// Clear-then-fill with the background.
pub fn paint_background(surface: &mut Surface, background: Background) {
    let (w, h) = (surface.width() as f32, surface.height() as f32);
    match background {
        Background::Transparent => {}
        Background::Solid(color) => surface.fill_all(color),
        Background::Gradient(colors) => {
            if let Some(path) = Rect::from_xywh(0.0, 0.0, w, h).map(tiny_skia::PathBuilder::from_rect) {
                surface.fill_gradient(&path, (0.0, 0.0), (w, h), colors);
            }
        }
    }
}

/// Draw one template slot with its decorators applied in order.
fn paint_slot(surface: &mut Surface, placement: &SlotPlacement, frame: DeviceFrameKind, pixmap: &Pixmap) {
    let (cx, cy, width) = (placement.center_x, placement.center_y, placement.width);
    let aspect = pixmap.height() as f32 / pixmap.width().max(1) as f32;
    let bounds = frame_rect(frame, cx, cy, width, aspect);

    let mut transform = Transform::identity();
    for decorator in placement.decorators {
        match *decorator {
            Decorator::Rotate { degrees } => {
                transform = transform.pre_concat(Transform::from_rotate_at(degrees, cx, cy));
            }
            Decorator::Shadow(shadow) => {
                if let Some(path) = bounds.and_then(|b| rounded_rect(b.x(), b.y(), b.width(), b.height(), Corners::all(16.0))) {
                    surface.with_transform(transform, |s| s.drop_shadow(&path, &shadow));
                }
            }
            Decorator::GridBorder { color, padding, radius } => {
                if let Some(card) = bounds.and_then(|b| {
                    rounded_rect(
                        b.x() - padding,
                        b.y() - padding,
                        b.width() + padding * 2.0,
                        b.height() + padding * 2.0,
                        Corners::all(radius),
                    )
                }) {
                    surface.with_transform(transform, |s| s.fill_path(&card, color));
                }
            }
        }
    }

    surface.with_transform(transform, |s| render_frame(s, frame, Some(pixmap), cx, cy, width));
}

/// Dashed bounding box and circular handles around the selected item.
fn paint_selection(surface: &mut Surface, item: &CustomItem) {
    let b = item.bounds();
    if let Some(outline) = Rect::from_xywh(b.x, b.y, b.width, b.height).map(tiny_skia::PathBuilder::from_rect) {
        surface.stroke_path(&outline, SELECTION, 2.0, Some(&SELECTION_DASH));
    }
    for (_, (hx, hy)) in handle_points(&b) {
        if let Some(dot) = ellipse(hx, hy, HANDLE_RADIUS, HANDLE_RADIUS) {
            surface.fill_path(&dot, Rgba8::WHITE);
            surface.stroke_path(&dot, SELECTION, 2.0, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixtures::image;
    use crate::source::{CaptureKind, DeviceClass};

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> Pixmap {
        let mut p = Pixmap::new(w, h).unwrap();
        p.fill(tiny_skia::Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255));
        p
    }

    fn png(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = ::image::RgbaImage::from_pixel(w, h, ::image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn with_data(mut img: SourceImage, data: Vec<u8>) -> SourceImage {
        img.data = Arc::new(data);
        img
    }

    fn white_state(template: &str) -> CompositionState {
        let mut state = CompositionState::new(template).unwrap();
        state.set_background(Background::Solid(Rgba8::WHITE));
        state
    }

    #[test]
    fn test_background_solid_and_transparent() {
        let mut surface = Surface::new(64, 32).unwrap();
        paint_background(&mut surface, Background::Solid(Rgba8::rgb(10, 20, 30)));
        assert_eq!(surface.pixel(5, 5), Some([10, 20, 30, 255]));

        surface.clear();
        paint_background(&mut surface, Background::Transparent);
        assert_eq!(surface.pixel(5, 5).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_background_gradient_runs_corner_to_corner() {
        let mut surface = Surface::new(100, 100).unwrap();
        paint_background(&mut surface, Background::Gradient([Rgba8::BLACK, Rgba8::WHITE]));
        let tl = surface.pixel(0, 0).unwrap();
        let br = surface.pixel(99, 99).unwrap();
        assert!(tl[0] < 20, "top-left {:?}", tl);
        assert!(br[0] > 235, "bottom-right {:?}", br);
    }

    #[test]
    fn test_undecoded_slot_is_skipped() {
        let mut state = white_state("single-device");
        state
            .set_slot_image("main", Some(image("d", DeviceClass::Desktop, CaptureKind::Viewport)))
            .unwrap();
        let mut surface = Surface::output().unwrap();
        Compositor::default().paint(&mut surface, &state, &ImageCache::new());
        assert_eq!(surface.pixel(960, 540), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_grid_border_drawn_behind_image() {
        let mut state = white_state("grid");
        let src = image("d", DeviceClass::Desktop, CaptureKind::Viewport);
        state.set_slot_image("top-left", Some(src.clone())).unwrap();
        let mut cache = ImageCache::new();
        cache.insert(src.id.clone(), solid(160, 90, [255, 0, 0]));

        let mut surface = Surface::output().unwrap();
        Compositor::default().paint(&mut surface, &state, &cache);
        // Image is 760 x 427.5 centered at (500, 290); the card extends 14 past it
        assert_eq!(surface.pixel(500, 290), Some([255, 0, 0, 255]));
        let top_edge = (290.0 - 427.5 / 2.0 - 7.0) as u32;
        assert_eq!(surface.pixel(500, top_edge), Some([0x63, 0x66, 0xf1, 255]));
    }

    #[test]
    fn test_rotated_slot_moves_corner() {
        let mut state = white_state("angled");
        let src = image("d", DeviceClass::Desktop, CaptureKind::Viewport);
        state.set_slot_image("main", Some(src.clone())).unwrap();
        state.set_slot_frame("angled", "main", DeviceFrameKind::None).unwrap();
        let mut cache = ImageCache::new();
        cache.insert(src.id.clone(), solid(160, 90, [255, 0, 0]));

        let mut surface = Surface::output().unwrap();
        Compositor::default().paint(&mut surface, &state, &cache);
        assert_eq!(surface.pixel(880, 500), Some([255, 0, 0, 255]));
        // Unrotated top-right corner region is outside the -8° rotated image
        let corner = surface.pixel(880 + 490, 500 - 270).unwrap();
        assert_ne!(corner, [255, 0, 0, 255]);
    }

    #[test]
    fn test_custom_items_drawn_back_to_front() {
        let mut state = white_state("custom");
        let a = image("a", DeviceClass::Desktop, CaptureKind::Viewport);
        let b = image("b", DeviceClass::Desktop, CaptureKind::Viewport);
        let id_a = state.add_custom_item(a.clone()).unwrap();
        state.add_custom_item(b.clone()).unwrap();
        state.set_item_frame(id_a, DeviceFrameKind::None).unwrap();
        let mut cache = ImageCache::new();
        cache.insert(a.id.clone(), solid(160, 90, [255, 0, 0]));
        cache.insert(b.id.clone(), solid(160, 90, [0, 0, 255]));

        let compositor = Compositor::default();
        let mut surface = Surface::output().unwrap();
        compositor.paint(&mut surface, &state, &cache);
        // b (laptop) is on top
        let center = surface.pixel(960, 500).unwrap();
        assert_eq!(center, [0, 0, 255, 255]);

        state.reorder_to_front(id_a).unwrap();
        compositor.paint(&mut surface, &state, &cache);
        assert_eq!(surface.pixel(960, 500), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_selection_handles_drawn() {
        let mut state = white_state("custom");
        let a = image("a", DeviceClass::Desktop, CaptureKind::Viewport);
        let id = state.add_custom_item(a.clone()).unwrap();
        state.set_item_frame(id, DeviceFrameKind::None).unwrap();
        let mut cache = ImageCache::new();
        cache.insert(a.id.clone(), solid(160, 90, [255, 0, 0]));

        let mut surface = Surface::output().unwrap();
        Compositor::default().paint(&mut surface, &state, &cache);
        // Top-left handle center is white
        let b = state.item(id).unwrap().bounds();
        assert_eq!(surface.pixel(b.x as u32, b.y as u32), Some([255, 255, 255, 255]));

        state.select_item(None).unwrap();
        Compositor::default().paint(&mut surface, &state, &cache);
        assert_ne!(surface.pixel(b.x as u32 - 4, b.y as u32 - 4), Some([0x3b, 0x82, 0xf6, 255]));
    }

    #[test]
    fn test_off_canvas_item_draws_nothing() {
        let mut state = white_state("custom");
        let src = image("d", DeviceClass::Desktop, CaptureKind::Viewport);
        let id = state.add_custom_item(src.clone()).unwrap();
        state.set_item_width(id, 8000.0).unwrap();
        state.item_mut(id).unwrap().center_x = 20960.0;
        state.select_item(None).unwrap();
        let mut cache = ImageCache::new();
        cache.insert(src.id.clone(), solid(160, 90, [255, 0, 0]));

        let mut surface = Surface::output().unwrap();
        Compositor::default().paint(&mut surface, &state, &cache);
        for (x, y) in [(0, 0), (960, 540), (1919, 540), (1919, 1079)] {
            assert_eq!(surface.pixel(x, y), Some([255, 255, 255, 255]), "({}, {})", x, y);
        }
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        assert!(matches!(decode_image(b"not an image"), Err(ShowcaseError::Decode(_))));
        let px = decode_image(&png(4, 2, [1, 2, 3])).unwrap();
        assert_eq!((px.width(), px.height()), (4, 2));
    }

    #[tokio::test]
    async fn test_prepare_decodes_once_and_remembers_failures() {
        let good = with_data(image("good", DeviceClass::Desktop, CaptureKind::Viewport), png(8, 8, [0, 255, 0]));
        let bad = with_data(image("bad", DeviceClass::Desktop, CaptureKind::Viewport), vec![1, 2, 3]);
        let mut cache = ImageCache::new();
        cache.prepare(&[&good, &bad, &good]).await;

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&good.id).is_some());
        assert!(cache.contains(&bad.id));
        assert!(cache.get(&bad.id).is_none());

        cache.retain(&[&good]);
        assert_eq!(cache.len(), 1);
    }
}
