//! # Composition Spec
//!
//! JSON description of a showcase, used by the `showcase spec` command and
//! handy for scripted renders.
//!
//! ```
//! use showcase::spec::CompositionSpec;
//!
//! let json = r##"{
//!     "template": "comparison",
//!     "background": "#ffffff",
//!     "texts": {"before-label": "v1", "after-label": "v2"},
//!     "frames": {"before": "browser-dark"},
//!     "images": [
//!         {"path": "old.png", "domain": "example.com"},
//!         {"path": "new.png", "device": "desktop", "capture": "viewport"}
//!     ],
//!     "slots": {"before": 0, "after": 1}
//! }"##;
//!
//! let spec = CompositionSpec::from_json(json).unwrap();
//! assert_eq!(spec.template, "comparison");
//! assert_eq!(spec.images.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::compositor::Compositor;
use crate::error::ShowcaseError;
use crate::frame::DeviceFrameKind;
use crate::source::{CaptureKind, DeviceClass, ImageId, SourceImage};
use crate::state::{Background, CompositionState, MIN_ITEM_WIDTH};
use crate::template::{CUSTOM_TEMPLATE_ID, DEFAULT_TEMPLATE_ID, require_template};
use crate::text::TextFont;

fn default_template() -> String {
    DEFAULT_TEMPLATE_ID.to_string()
}

/// Top-level composition spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionSpec {
    #[serde(default = "default_template")]
    pub template: String,
    /// `transparent`, `#rrggbb` or `#rrggbb,#rrggbb`. Default gradient if absent.
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
    /// Frame overrides per slot of `template`.
    #[serde(default)]
    pub frames: BTreeMap<String, DeviceFrameKind>,
    pub images: Vec<ImageSpec>,
    /// Explicit slot assignments (slot id to index into `images`). Slots not
    /// listed are auto-assigned.
    #[serde(default)]
    pub slots: BTreeMap<String, usize>,
    /// Custom canvas items, back to front. Without items every image is
    /// seeded onto the canvas.
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

/// One input image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub device: DeviceClass,
    #[serde(default)]
    pub capture: CaptureKind,
    /// Defaults to the file stem.
    #[serde(default)]
    pub domain: Option<String>,
}

/// One custom canvas item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Index into `images`.
    pub image: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Defaults to the frame for the image's device class.
    #[serde(default)]
    pub frame: Option<DeviceFrameKind>,
}

impl CompositionSpec {
    pub fn from_json(json: &str) -> Result<Self, ShowcaseError> {
        serde_json::from_str(json).map_err(|e| ShowcaseError::Spec(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ShowcaseError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read every image file; relative paths resolve against `base_dir`.
    pub fn load_images(&self, base_dir: &Path) -> Result<Vec<SourceImage>, ShowcaseError> {
        self.images
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let path = base_dir.join(&spec.path);
                let mut image = load_image_file(&path, spec.device, spec.capture)?;
                image.id = ImageId::new(format!("image-{}", i));
                if let Some(domain) = &spec.domain {
                    image.domain = domain.clone();
                }
                Ok(image)
            })
            .collect()
    }

    /// Build the composition state for `images` (as loaded by
    /// [`load_images`](Self::load_images)).
    pub fn build_state(&self, images: &[SourceImage]) -> Result<CompositionState, ShowcaseError> {
        let template = require_template(&self.template)?;
        let pick = |index: usize| {
            images
                .get(index)
                .cloned()
                .ok_or_else(|| ShowcaseError::Spec(format!("image index {} out of range", index)))
        };

        let mut state = CompositionState::new(DEFAULT_TEMPLATE_ID)?;
        if template.is_custom() {
            let seed: &[SourceImage] = if self.items.is_empty() { images } else { &[] };
            state.set_active_template(CUSTOM_TEMPLATE_ID, seed)?;
            for item in &self.items {
                let image = pick(item.image)?;
                let id = state.add_custom_item(image)?;
                if let Some(placed) = state.item_mut(id) {
                    placed.center_x = item.x;
                    placed.center_y = item.y;
                    placed.width = item.width.max(MIN_ITEM_WIDTH);
                    if let Some(frame) = item.frame {
                        placed.frame = frame;
                    }
                }
            }
            state.select_item(None)?;
        } else {
            state.switch_template(template.id, images)?;
            for (slot, index) in &self.slots {
                let image = pick(*index)?;
                // Free the image if auto-assignment put it elsewhere
                let holders: Vec<String> = state
                    .assigned_images()
                    .into_iter()
                    .filter(|(s, img)| img.id == image.id && *s != slot.as_str())
                    .map(|(s, _)| s.to_string())
                    .collect();
                for holder in holders {
                    state.set_slot_image(&holder, None)?;
                }
                state.set_slot_image(slot, Some(image))?;
            }
            for (slot, frame) in &self.frames {
                state.set_slot_frame(template.id, slot, *frame)?;
            }
        }

        for (text, value) in &self.texts {
            state.set_text(text, value.clone())?;
        }
        if let Some(background) = &self.background {
            state.set_background(Background::parse(background)?);
        }
        debug!(template = template.id, images = images.len(), "spec applied");
        Ok(state)
    }
}

/// Read an image file into a [`SourceImage`] with its pixel size probed from
/// the header. The id is derived from the path and the domain from the file
/// stem.
pub fn load_image_file(path: &Path, device: DeviceClass, capture: CaptureKind) -> Result<SourceImage, ShowcaseError> {
    let bytes = std::fs::read(path)?;
    let (pixel_width, pixel_height) = image::ImageReader::new(std::io::Cursor::new(&bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| ShowcaseError::Decode(format!("{}: {}", path.display(), e)))?;

    let timestamp = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    let domain = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(SourceImage {
        id: ImageId::new(path.display().to_string()),
        data: Arc::new(bytes),
        pixel_width,
        pixel_height,
        device_class: device,
        capture_kind: capture,
        domain,
        timestamp,
    })
}

/// Runtime settings shared by the CLI commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// TTF/OTF font for template text. Text is skipped without one.
    #[serde(default)]
    pub font: Option<PathBuf>,
    /// Prefix of generated download filenames.
    #[serde(default = "default_prefix")]
    pub filename_prefix: String,
}

fn default_prefix() -> String {
    crate::session::DEFAULT_FILENAME_PREFIX.to_string()
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            font: None,
            filename_prefix: default_prefix(),
        }
    }
}

impl ShowcaseConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ShowcaseError> {
        serde_json::from_str(json).map_err(|e| ShowcaseError::Spec(format!("config: {}", e)))
    }

    /// Read a JSON config file. A relative font path resolves against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ShowcaseError> {
        let mut config = Self::from_json(&std::fs::read_to_string(path)?)?;
        if let (Some(font), Some(dir)) = (&config.font, path.parent()) {
            if font.is_relative() {
                config.font = Some(dir.join(font));
            }
        }
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load the configured font, if any.
    pub fn load_font(&self) -> Result<Option<TextFont>, ShowcaseError> {
        match &self.font {
            Some(path) => TextFont::load(path).map(Some),
            None => {
                warn!("no font configured; template text will not be drawn");
                Ok(None)
            }
        }
    }

    pub fn compositor(&self) -> Result<Compositor, ShowcaseError> {
        Ok(Compositor::new(self.load_font()?))
    }
}
