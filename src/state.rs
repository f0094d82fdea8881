//! # Composition State
//!
//! The single mutable model of a showcase session: active template, slot
//! assignments, per-template frame overrides, text values, background and
//! (on the custom canvas) the ordered list of freely placed items.
//!
//! Rendering reads this state; it never writes to it. The output surface is
//! a separate artifact.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::assign::auto_assign;
use crate::error::ShowcaseError;
use crate::frame::{DeviceFrameKind, FrameSize, frame_size};
use crate::raster::Rgba8;
use crate::source::{ImageId, SourceImage};
use crate::template::{Template, require_template};

/// Smallest width a canvas item can be resized to.
pub const MIN_ITEM_WIDTH: f32 = 100.0;

/// Position and width of an item added with [`CompositionState::add_custom_item`].
pub const NEW_ITEM_CENTER: (f32, f32) = (960.0, 540.0);
pub const NEW_ITEM_WIDTH: f32 = 800.0;

/// Width of items seeded when entering the custom canvas.
pub const SEEDED_ITEM_WIDTH: f32 = 600.0;

/// Canvas background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Background {
    Transparent,
    Solid(Rgba8),
    /// Corner-to-corner linear gradient (top-left to bottom-right).
    Gradient([Rgba8; 2]),
}

impl Default for Background {
    fn default() -> Self {
        Background::Gradient([Rgba8::rgb(0x66, 0x7e, 0xea), Rgba8::rgb(0x76, 0x4b, 0xa2)])
    }
}

impl Background {
    /// Parse `transparent`, `#rrggbb` or `#rrggbb,#rrggbb`.
    pub fn parse(s: &str) -> Result<Self, ShowcaseError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("transparent") {
            return Ok(Background::Transparent);
        }
        match s.split_once(',') {
            Some((a, b)) => Ok(Background::Gradient([Rgba8::parse_hex(a)?, Rgba8::parse_hex(b)?])),
            None => Ok(Background::Solid(Rgba8::parse_hex(s)?)),
        }
    }
}

/// Swatches offered by the background picker.
pub const BACKGROUND_PRESETS: &[(&str, Background)] = &[
    ("Ocean", Background::Gradient([Rgba8::rgb(0x66, 0x7e, 0xea), Rgba8::rgb(0x76, 0x4b, 0xa2)])),
    ("Sunset", Background::Gradient([Rgba8::rgb(0xf0, 0x93, 0xfb), Rgba8::rgb(0xf5, 0x57, 0x6c)])),
    ("Mint", Background::Gradient([Rgba8::rgb(0x43, 0xe9, 0x7b), Rgba8::rgb(0x38, 0xf9, 0xd7)])),
    ("Night", Background::Gradient([Rgba8::rgb(0x0f, 0x20, 0x27), Rgba8::rgb(0x2c, 0x53, 0x64)])),
    ("White", Background::Solid(Rgba8::WHITE)),
    ("Light Gray", Background::Solid(Rgba8::rgb(0xf3, 0xf4, 0xf6))),
    ("Charcoal", Background::Solid(Rgba8::rgb(0x1f, 0x29, 0x37))),
    ("Transparent", Background::Transparent),
];

/// Axis-aligned box in output units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// A freely positioned image on the custom canvas.
#[derive(Debug, Clone)]
pub struct CustomItem {
    pub id: u64,
    pub image: SourceImage,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub frame: DeviceFrameKind,
}

impl CustomItem {
    /// Frame box size, by the same rule the renderer uses.
    pub fn size(&self) -> FrameSize {
        frame_size(self.frame, self.width, self.image.aspect_ratio())
    }

    pub fn bounds(&self) -> Bounds {
        let size = self.size();
        Bounds {
            x: self.center_x - size.width / 2.0,
            y: self.center_y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }
}

/// Who currently holds an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Usage {
    Slot(String),
    Item(u64),
}

/// One row of the image picker.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerEntry {
    pub image_id: ImageId,
    pub domain: String,
    pub in_use: Option<Usage>,
}

/// The mutable session model.
#[derive(Debug, Clone)]
pub struct CompositionState {
    template: &'static Template,
    slot_assignments: HashMap<String, SourceImage>,
    slot_frames: HashMap<(String, String), DeviceFrameKind>,
    text_values: HashMap<String, String>,
    background: Background,
    custom_items: Vec<CustomItem>,
    selected_item: Option<u64>,
    next_item_id: u64,
}

impl CompositionState {
    /// Fresh state on `template_id` with nothing assigned.
    pub fn new(template_id: &str) -> Result<Self, ShowcaseError> {
        let template = require_template(template_id)?;
        let mut state = Self {
            template,
            slot_assignments: HashMap::new(),
            slot_frames: HashMap::new(),
            text_values: HashMap::new(),
            background: Background::default(),
            custom_items: Vec::new(),
            selected_item: None,
            next_item_id: 1,
        };
        state.seed_text_values();
        Ok(state)
    }

    pub fn template(&self) -> &'static Template {
        self.template
    }

    pub fn template_id(&self) -> &'static str {
        self.template.id
    }

    pub fn is_custom(&self) -> bool {
        self.template.is_custom()
    }

    fn seed_text_values(&mut self) {
        for text in self.template.text_slots {
            self.text_values
                .entry(text.id.to_string())
                .or_insert_with(|| text.default_value.to_string());
        }
    }

    /// Make `template_id` active without auto-assigning.
    ///
    /// Slot assignments are always cleared. Entering the custom canvas seeds
    /// one item per available image; leaving it discards the items.
    pub fn set_active_template(&mut self, template_id: &str, available: &[SourceImage]) -> Result<(), ShowcaseError> {
        let next = require_template(template_id)?;
        let was_custom = self.is_custom();

        self.slot_assignments.clear();
        self.template = next;

        if next.is_custom() && !was_custom {
            self.seed_custom_items(available);
        } else if !next.is_custom() {
            self.custom_items.clear();
            self.selected_item = None;
        }
        self.seed_text_values();
        debug!(template = next.id, "template switched");
        Ok(())
    }

    /// Switch template and auto-assign available images to its slots.
    pub fn switch_template(&mut self, template_id: &str, available: &[SourceImage]) -> Result<(), ShowcaseError> {
        self.set_active_template(template_id, available)?;
        if !self.is_custom() {
            self.slot_assignments = auto_assign(self.template, available);
        }
        Ok(())
    }

    fn seed_custom_items(&mut self, available: &[SourceImage]) {
        self.custom_items.clear();
        self.selected_item = None;
        for (i, image) in available.iter().enumerate() {
            let id = self.allocate_item_id();
            self.custom_items.push(CustomItem {
                id,
                image: image.clone(),
                center_x: 400.0 + 100.0 * i as f32,
                center_y: 400.0 + 50.0 * i as f32,
                width: SEEDED_ITEM_WIDTH,
                frame: DeviceFrameKind::for_device_class(image.device_class),
            });
        }
    }

    fn allocate_item_id(&mut self) -> u64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }

    // ── Slots ───────────────────────────────────────────────────────────

    pub fn slot_image(&self, slot_id: &str) -> Option<&SourceImage> {
        self.slot_assignments.get(slot_id)
    }

    /// Assigned images in template slot order.
    pub fn assigned_images(&self) -> Vec<(&'static str, &SourceImage)> {
        self.template
            .slots
            .iter()
            .filter_map(|s| self.slot_assignments.get(s.id).map(|img| (s.id, img)))
            .collect()
    }

    /// Set or clear the image of a slot of the active template.
    pub fn set_slot_image(&mut self, slot_id: &str, image: Option<SourceImage>) -> Result<(), ShowcaseError> {
        let slot = self.template.require_slot(slot_id).inspect_err(|e| warn!("{}", e))?;
        match image {
            Some(image) => {
                self.slot_assignments.insert(slot.id.to_string(), image);
            }
            None => {
                self.slot_assignments.remove(slot.id);
            }
        }
        Ok(())
    }

    /// Assign through the image picker, refusing an image another slot holds.
    pub fn assign_from_picker(&mut self, slot_id: &str, image: &SourceImage) -> Result<(), ShowcaseError> {
        self.template.require_slot(slot_id)?;
        if let Some((holder, _)) = self
            .slot_assignments
            .iter()
            .find(|(slot, img)| img.id == image.id && slot.as_str() != slot_id)
        {
            return Err(ShowcaseError::ImageInUse {
                image: image.id.to_string(),
                slot: holder.clone(),
            });
        }
        self.set_slot_image(slot_id, Some(image.clone()))
    }

    /// Frame for a slot: the user's override, else the slot default.
    pub fn slot_frame(&self, template: &Template, slot_id: &str) -> Option<DeviceFrameKind> {
        let slot = template.slot(slot_id)?;
        Some(
            self.slot_frames
                .get(&(template.id.to_string(), slot.id.to_string()))
                .copied()
                .unwrap_or(slot.default_frame),
        )
    }

    /// Override the frame of a slot. Remembered across template switches.
    pub fn set_slot_frame(&mut self, template_id: &str, slot_id: &str, frame: DeviceFrameKind) -> Result<(), ShowcaseError> {
        let template = require_template(template_id)?;
        let slot = template.require_slot(slot_id).inspect_err(|e| warn!("{}", e))?;
        self.slot_frames
            .insert((template.id.to_string(), slot.id.to_string()), frame);
        Ok(())
    }

    // ── Text and background ─────────────────────────────────────────────

    /// Current value of a text slot (its default until edited).
    pub fn text_value(&self, text_id: &str) -> Option<&str> {
        self.text_values.get(text_id).map(String::as_str)
    }

    pub fn set_text(&mut self, text_id: &str, value: impl Into<String>) -> Result<(), ShowcaseError> {
        let slot = self.template.require_text_slot(text_id).inspect_err(|e| warn!("{}", e))?;
        self.text_values.insert(slot.id.to_string(), value.into());
        Ok(())
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    // ── Custom canvas ───────────────────────────────────────────────────

    /// Items in z-order, back to front.
    pub fn custom_items(&self) -> &[CustomItem] {
        &self.custom_items
    }

    pub fn item(&self, id: u64) -> Option<&CustomItem> {
        self.custom_items.iter().find(|i| i.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: u64) -> Option<&mut CustomItem> {
        self.custom_items.iter_mut().find(|i| i.id == id)
    }

    fn item_index(&self, id: u64) -> Result<usize, ShowcaseError> {
        self.custom_items
            .iter()
            .position(|i| i.id == id)
            .ok_or(ShowcaseError::UnknownItem(id))
    }

    pub fn selected_item_id(&self) -> Option<u64> {
        self.selected_item
    }

    pub fn selected_item(&self) -> Option<&CustomItem> {
        self.selected_item.and_then(|id| self.item(id))
    }

    /// Add an item on top of the canvas and select it.
    pub fn add_custom_item(&mut self, image: SourceImage) -> Result<u64, ShowcaseError> {
        if !self.is_custom() {
            return Err(ShowcaseError::NotCustomMode);
        }
        let id = self.allocate_item_id();
        self.custom_items.push(CustomItem {
            id,
            frame: DeviceFrameKind::for_device_class(image.device_class),
            image,
            center_x: NEW_ITEM_CENTER.0,
            center_y: NEW_ITEM_CENTER.1,
            width: NEW_ITEM_WIDTH,
        });
        self.selected_item = Some(id);
        Ok(id)
    }

    pub fn remove_custom_item(&mut self, id: u64) -> Result<CustomItem, ShowcaseError> {
        let index = self.item_index(id)?;
        if self.selected_item == Some(id) {
            self.selected_item = None;
        }
        Ok(self.custom_items.remove(index))
    }

    /// Move an item to the top of the stack.
    pub fn reorder_to_front(&mut self, id: u64) -> Result<(), ShowcaseError> {
        let index = self.item_index(id)?;
        let item = self.custom_items.remove(index);
        self.custom_items.push(item);
        Ok(())
    }

    /// Move an item to the bottom of the stack.
    pub fn reorder_to_back(&mut self, id: u64) -> Result<(), ShowcaseError> {
        let index = self.item_index(id)?;
        let item = self.custom_items.remove(index);
        self.custom_items.insert(0, item);
        Ok(())
    }

    pub fn select_item(&mut self, id: Option<u64>) -> Result<(), ShowcaseError> {
        if let Some(id) = id {
            self.item_index(id)?;
        }
        self.selected_item = id;
        Ok(())
    }

    pub fn set_item_frame(&mut self, id: u64, frame: DeviceFrameKind) -> Result<(), ShowcaseError> {
        let item = self.item_mut(id).ok_or(ShowcaseError::UnknownItem(id))?;
        item.frame = frame;
        Ok(())
    }

    /// Set an item's width, clamped to [`MIN_ITEM_WIDTH`].
    pub fn set_item_width(&mut self, id: u64, width: f32) -> Result<(), ShowcaseError> {
        let item = self.item_mut(id).ok_or(ShowcaseError::UnknownItem(id))?;
        item.width = width.max(MIN_ITEM_WIDTH);
        Ok(())
    }

    // ── Usage ───────────────────────────────────────────────────────────

    /// Who holds `image_id`, if anyone. Slots are reported before items.
    pub fn usage(&self, image_id: &ImageId) -> Option<Usage> {
        if let Some((slot, _)) = self.assigned_images().into_iter().find(|(_, img)| &img.id == image_id) {
            return Some(Usage::Slot(slot.to_string()));
        }
        self.custom_items
            .iter()
            .find(|i| &i.image.id == image_id)
            .map(|i| Usage::Item(i.id))
    }

    /// Picker rows for `available`, flagging images in use.
    pub fn picker_entries(&self, available: &[SourceImage]) -> Vec<PickerEntry> {
        available
            .iter()
            .map(|img| PickerEntry {
                image_id: img.id.clone(),
                domain: img.domain.clone(),
                in_use: self.usage(&img.id),
            })
            .collect()
    }

    /// Every image the next render needs, in draw order.
    pub fn referenced_images(&self) -> Vec<&SourceImage> {
        if self.is_custom() {
            self.custom_items.iter().map(|i| &i.image).collect()
        } else {
            self.assigned_images().into_iter().map(|(_, img)| img).collect()
        }
    }

    /// Domain representing the composition: first assigned image's domain,
    /// else `"Showcase"`.
    pub fn representative_domain(&self) -> String {
        self.referenced_images()
            .first()
            .map(|img| img.domain.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| CUSTOM_FALLBACK_DOMAIN.to_string())
    }
}

/// Domain reported when no image is assigned.
pub const CUSTOM_FALLBACK_DOMAIN: &str = "Showcase";
