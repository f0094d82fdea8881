//! # Showcase Session
//!
//! One open showcase: the composition state, the images it may draw from,
//! the decode cache, the interaction machine and the output surface.
//!
//! Every mutation goes through the session and triggers one render. Closing
//! the session flips a shared liveness flag; a render whose decodes finish
//! after that point is discarded without touching the surface.
//!
//! ## Example
//!
//! ```no_run
//! use showcase::{Compositor, MemoryStore, ShowcaseSession};
//!
//! # async fn demo(images: Vec<showcase::SourceImage>) -> Result<(), showcase::ShowcaseError> {
//! let mut session = ShowcaseSession::open(images, Compositor::default())?;
//! session.switch_template("comparison").await?;
//! let store = MemoryStore::new();
//! let id = session.save(&store).await?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::compositor::{Compositor, ImageCache};
use crate::error::ShowcaseError;
use crate::interact::{Cursor, Interaction, KeyEvent, PointerEvent, Viewport};
use crate::raster::{OUTPUT_HEIGHT, OUTPUT_WIDTH, Surface};
use crate::source::{CaptureKind, DeviceClass, ImageId, SourceImage};
use crate::state::{Background, CompositionState};
use crate::template::{CUSTOM_TEMPLATE_ID, DEFAULT_TEMPLATE_ID};

/// Filename prefix of downloaded showcases.
pub const DEFAULT_FILENAME_PREFIX: &str = "showcase";

/// Suggested filename for a download made at `now`.
pub fn download_filename(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}-{}.png", prefix, now.format("%Y-%m-%d-%H-%M-%S"))
}

/// Images that can be composed: everything except video recordings.
pub fn eligible_images(images: Vec<SourceImage>) -> Vec<SourceImage> {
    images
        .into_iter()
        .filter(|img| img.capture_kind != CaptureKind::Video)
        .collect()
}

/// Outcome of the last save or download, shown inline to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saved(ImageId),
    Downloaded(PathBuf),
    Failed(String),
}

impl SaveStatus {
    pub fn message(&self) -> String {
        match self {
            SaveStatus::Idle => String::new(),
            SaveStatus::Saved(_) => "Saved to library".to_string(),
            SaveStatus::Downloaded(path) => format!("Downloaded {}", path.display()),
            SaveStatus::Failed(e) => format!("Save failed: {}", e),
        }
    }
}

/// Persistence collaborator receiving finished showcases.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, image: SourceImage) -> Result<ImageId, ShowcaseError>;
}

/// Store that keeps saved images in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    images: Mutex<Vec<SourceImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn images(&self) -> Vec<SourceImage> {
        self.images.lock().await.clone()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn save(&self, image: SourceImage) -> Result<ImageId, ShowcaseError> {
        let id = image.id.clone();
        self.images.lock().await.push(image);
        Ok(id)
    }
}

#[derive(Serialize)]
struct StoredMetadata<'a> {
    id: &'a ImageId,
    pixel_width: u32,
    pixel_height: u32,
    device_class: DeviceClass,
    capture_kind: CaptureKind,
    domain: &'a str,
    timestamp: String,
}

/// Store writing `<id>.png` plus a `<id>.json` metadata sidecar.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for DirectoryStore {
    async fn save(&self, image: SourceImage) -> Result<ImageId, ShowcaseError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let meta = StoredMetadata {
            id: &image.id,
            pixel_width: image.pixel_width,
            pixel_height: image.pixel_height,
            device_class: image.device_class,
            capture_kind: image.capture_kind,
            domain: &image.domain,
            timestamp: image.timestamp.to_rfc3339(),
        };
        let json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| ShowcaseError::Store(format!("Failed to encode metadata: {}", e)))?;

        let png_path = self.root.join(format!("{}.png", image.id));
        tokio::fs::write(&png_path, image.data.as_slice()).await?;
        tokio::fs::write(self.root.join(format!("{}.json", image.id)), json).await?;
        info!(path = %png_path.display(), "showcase stored");
        Ok(image.id)
    }
}

/// An open showcase.
pub struct ShowcaseSession {
    state: CompositionState,
    available: Vec<SourceImage>,
    cache: ImageCache,
    compositor: Compositor,
    interaction: Interaction,
    surface: Surface,
    alive: Arc<AtomicBool>,
    renders: u64,
    status: SaveStatus,
}

impl ShowcaseSession {
    /// Open on the default template with images auto-assigned.
    pub fn open(images: Vec<SourceImage>, compositor: Compositor) -> Result<Self, ShowcaseError> {
        Self::open_on(images, DEFAULT_TEMPLATE_ID, compositor)
    }

    /// Open on `template_id` with images auto-assigned (or seeded onto the
    /// canvas for the custom template).
    pub fn open_on(images: Vec<SourceImage>, template_id: &str, compositor: Compositor) -> Result<Self, ShowcaseError> {
        let available = eligible_images(images);
        if available.is_empty() {
            return Err(ShowcaseError::EmptySelection);
        }
        let mut state = CompositionState::new(DEFAULT_TEMPLATE_ID)?;
        state.switch_template(template_id, &available)?;
        info!(template = template_id, images = available.len(), "showcase opened");

        Ok(Self {
            state,
            available,
            cache: ImageCache::new(),
            compositor,
            interaction: Interaction::default(),
            surface: Surface::output()?,
            alive: Arc::new(AtomicBool::new(true)),
            renders: 0,
            status: SaveStatus::Idle,
        })
    }

    /// Single-mockup mode: one image on the single-device template.
    pub fn open_single(image: SourceImage, compositor: Compositor) -> Result<Self, ShowcaseError> {
        Self::open_on(vec![image], DEFAULT_TEMPLATE_ID, compositor)
    }

    /// Custom canvas with one item per image.
    pub fn open_custom(images: Vec<SourceImage>, compositor: Compositor) -> Result<Self, ShowcaseError> {
        Self::open_on(images, CUSTOM_TEMPLATE_ID, compositor)
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    pub fn available(&self) -> &[SourceImage] {
        &self.available
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Shared liveness flag; clearing it has the same effect as [`close`](Self::close).
    pub fn liveness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }

    /// Stop reacting to input and discard in-flight renders.
    pub fn close(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            info!("showcase closed");
        }
    }

    fn ensure_open(&self) -> Result<(), ShowcaseError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(ShowcaseError::Closed)
        }
    }

    fn image(&self, id: &ImageId) -> Result<SourceImage, ShowcaseError> {
        self.available
            .iter()
            .find(|img| &img.id == id)
            .cloned()
            .ok_or_else(|| ShowcaseError::UnknownImage(id.to_string()))
    }

    /// Decode whatever the state references, then paint. Cached images the
/// state no longer references are dropped afterwards.
    pub async fn render(&mut self) -> Result<&Surface, ShowcaseError> {
        self.ensure_open()?;
        let images: Vec<SourceImage> = self.state.referenced_images().into_iter().cloned().collect();
        let refs: Vec<&SourceImage> = images.iter().collect();
        self.cache.prepare(&refs).await;

        if !self.is_alive() {
            debug!("closed during decode, render discarded");
            return Err(ShowcaseError::Closed);
        }
        self.compositor.paint(&mut self.surface, &self.state, &self.cache);
        self.cache.retain(&refs);
        self.renders += 1;
        Ok(&self.surface)
    }

    /// Apply a state mutation and re-render.
    pub async fn update<R>(
        &mut self,
        f: impl FnOnce(&mut CompositionState) -> Result<R, ShowcaseError>,
    ) -> Result<R, ShowcaseError> {
        self.ensure_open()?;
        let result = f(&mut self.state)?;
        self.render().await?;
        Ok(result)
    }

    pub async fn switch_template(&mut self, template_id: &str) -> Result<(), ShowcaseError> {
        let available = self.available.clone();
        self.update(|s| s.switch_template(template_id, &available)).await
    }

    /// Assign an available image to a slot through the picker.
    pub async fn assign(&mut self, slot_id: &str, image_id: &ImageId) -> Result<(), ShowcaseError> {
        let image = self.image(image_id)?;
        self.update(|s| s.assign_from_picker(slot_id, &image)).await
    }

    pub async fn set_text(&mut self, text_id: &str, value: &str) -> Result<(), ShowcaseError> {
        self.update(|s| s.set_text(text_id, value)).await
    }

    pub async fn set_background(&mut self, background: Background) -> Result<(), ShowcaseError> {
        self.update(|s| {
            s.set_background(background);
            Ok(())
        })
        .await
    }

    /// Add an available image to the custom canvas.
    pub async fn add_item(&mut self, image_id: &ImageId) -> Result<u64, ShowcaseError> {
        let image = self.image(image_id)?;
        self.update(|s| s.add_custom_item(image)).await
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.interaction.set_viewport(viewport);
    }

    /// Feed a pointer event. Ignored once closed.
    pub async fn pointer(&mut self, event: PointerEvent) -> Result<bool, ShowcaseError> {
        if !self.is_alive() {
            return Ok(false);
        }
        let changed = self.interaction.handle_pointer(&mut self.state, event);
        if changed {
            self.render().await?;
        }
        Ok(changed)
    }

    /// Feed a key event. Ignored once closed.
    pub async fn key(&mut self, event: KeyEvent) -> Result<bool, ShowcaseError> {
        if !self.is_alive() {
            return Ok(false);
        }
        let changed = self.interaction.key(&mut self.state, event);
        if changed {
            self.render().await?;
        }
        Ok(changed)
    }

    pub fn cursor_at(&self, x: f32, y: f32) -> Cursor {
        self.interaction.cursor_at(&self.state, x, y)
    }

    /// Render and encode the output as PNG off the async thread.
    pub async fn export_png(&mut self) -> Result<Vec<u8>, ShowcaseError> {
        self.render().await?;
        let pixmap = self.surface.pixmap().clone();
        tokio::task::spawn_blocking(move || {
            pixmap
                .encode_png()
                .map_err(|e| ShowcaseError::Encode(format!("Failed to encode PNG: {}", e)))
        })
        .await
        .map_err(|e| ShowcaseError::Encode(format!("encode task failed: {}", e)))?
    }

    /// Persist the rendered showcase as a new image through `store`.
    pub async fn save(&mut self, store: &dyn ImageStore) -> Result<ImageId, ShowcaseError> {
        let result = self.try_save(store).await;
        self.record(result.as_ref().map(|id| SaveStatus::Saved(id.clone())));
        result
    }

    async fn try_save(&mut self, store: &dyn ImageStore) -> Result<ImageId, ShowcaseError> {
        let data = self.export_png().await?;
        let image = SourceImage {
            id: ImageId::new(uuid::Uuid::new_v4().to_string()),
            data: Arc::new(data),
            pixel_width: OUTPUT_WIDTH,
            pixel_height: OUTPUT_HEIGHT,
            device_class: DeviceClass::Showcase,
            capture_kind: CaptureKind::Showcase,
            domain: self.state.representative_domain(),
            timestamp: Utc::now(),
        };
        info!(id = %image.id, domain = %image.domain, "saving showcase");
        store.save(image).await
    }

    /// Write the rendered showcase into `dir` under a timestamped name.
    pub async fn download(&mut self, dir: &Path) -> Result<PathBuf, ShowcaseError> {
        let result = self.try_download(dir).await;
        self.record(result.as_ref().map(|p| SaveStatus::Downloaded(p.clone())));
        result
    }

    async fn try_download(&mut self, dir: &Path) -> Result<PathBuf, ShowcaseError> {
        let data = self.export_png().await?;
        let path = dir.join(download_filename(DEFAULT_FILENAME_PREFIX, Local::now()));
        tokio::fs::write(&path, data).await?;
        info!(path = %path.display(), "showcase downloaded");
        Ok(path)
    }

    fn record(&mut self, outcome: Result<SaveStatus, &ShowcaseError>) {
        self.status = match outcome {
            Ok(status) => status,
            Err(e) => {
                warn!("{}", e);
                SaveStatus::Failed(e.to_string())
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixtures::image;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    struct FailingStore;

    #[async_trait]
    impl ImageStore for FailingStore {
        async fn save(&self, _image: SourceImage) -> Result<ImageId, ShowcaseError> {
            Err(ShowcaseError::Store("disk full".into()))
        }
    }

    fn desktop() -> SourceImage {
        image("d", DeviceClass::Desktop, CaptureKind::Viewport)
    }

    #[test]
    fn test_download_filename() {
        let t = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(download_filename("showcase", t), "showcase-2024-03-09-07-05-01.png");
    }

    #[test]
    fn test_open_rejects_empty_selection() {
        assert!(matches!(
            ShowcaseSession::open(vec![], Compositor::default()),
            Err(ShowcaseError::EmptySelection)
        ));
        let video = image("v", DeviceClass::Desktop, CaptureKind::Video);
        assert!(matches!(
            ShowcaseSession::open_custom(vec![video], Compositor::default()),
            Err(ShowcaseError::EmptySelection)
        ));
    }

    #[test]
    fn test_open_single_assigns_main() {
        let session = ShowcaseSession::open_single(desktop(), Compositor::default()).unwrap();
        assert_eq!(session.state().template_id(), "single-device");
        assert_eq!(session.state().slot_image("main").map(|i| i.id.as_str()), Some("d"));
    }

    #[test]
    fn test_open_custom_seeds_items() {
        let images = vec![desktop(), image("m", DeviceClass::Mobile, CaptureKind::Viewport)];
        let session = ShowcaseSession::open_custom(images, Compositor::default()).unwrap();
        assert!(session.state().is_custom());
        assert_eq!(session.state().custom_items().len(), 2);
    }

    #[tokio::test]
    async fn test_each_mutation_renders_once() {
        let mut session = ShowcaseSession::open(vec![desktop()], Compositor::default()).unwrap();
        session.set_background(Background::Transparent).await.unwrap();
        session.switch_template("grid").await.unwrap();
        assert_eq!(session.render_count(), 2);
    }

    #[tokio::test]
    async fn test_render_drops_unreferenced_images_from_cache() {
        let images = vec![desktop(), image("m", DeviceClass::Mobile, CaptureKind::Viewport)];
        let mut session = ShowcaseSession::open_custom(images, Compositor::default()).unwrap();
        session.render().await.unwrap();
        assert_eq!(session.cache().len(), 2);

        let first = session.state().custom_items()[0].id;
        session.update(|s| s.remove_custom_item(first)).await.unwrap();
        assert_eq!(session.cache().len(), 1);
        assert!(session.cache().contains(&ImageId::new("m")));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_work() {
        let mut session = ShowcaseSession::open(vec![desktop()], Compositor::default()).unwrap();
        session.close();
        assert!(matches!(session.render().await, Err(ShowcaseError::Closed)));
        assert!(!session.pointer(PointerEvent::Down { x: 1.0, y: 1.0 }).await.unwrap());
        assert_eq!(session.render_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_image_rejected() {
        let mut session = ShowcaseSession::open(vec![desktop()], Compositor::default()).unwrap();
        let err = session.assign("main", &ImageId::new("missing")).await.unwrap_err();
        assert!(matches!(err, ShowcaseError::UnknownImage(_)));
    }

    #[tokio::test]
    async fn test_save_builds_showcase_image() {
        let mut session = ShowcaseSession::open(vec![desktop()], Compositor::default()).unwrap();
        let store = MemoryStore::new();
        let id = session.save(&store).await.unwrap();

        let saved = store.images().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
        assert_eq!(saved[0].device_class, DeviceClass::Showcase);
        assert_eq!(saved[0].capture_kind, CaptureKind::Showcase);
        assert_eq!(saved[0].domain, "d.example.com");
        assert_eq!((saved[0].pixel_width, saved[0].pixel_height), (1920, 1080));
        assert!(saved[0].data.starts_with(b"\x89PNG"));
        assert_eq!(session.status(), &SaveStatus::Saved(id));
    }

    #[tokio::test]
    async fn test_failed_save_sets_status_and_is_retryable() {
        let mut session = ShowcaseSession::open(vec![desktop()], Compositor::default()).unwrap();
        assert!(session.save(&FailingStore).await.is_err());
        assert!(matches!(session.status(), SaveStatus::Failed(msg) if msg.contains("disk full")));

        let store = MemoryStore::new();
        session.save(&store).await.unwrap();
        assert!(matches!(session.status(), SaveStatus::Saved(_)));
    }
}
