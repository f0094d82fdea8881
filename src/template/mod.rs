//! # Template Catalog
//!
//! Static registry of showcase layouts. Each template names its image slots
//! (with a default device frame) and optional text slots. The numeric
//! placement of every slot lives in the [`layout`] table.
//!
//! ## Adding a Template
//!
//! 1. Add a [`Template`] entry to [`TEMPLATES`]
//! 2. Add its placements to `layout::LAYOUTS`
//! 3. Slot ids must be unique within the template; they key per-template
//!    frame overrides, so never rename them once shipped

pub mod layout;

pub use layout::{Decorator, Overlay, SlotPlacement, TemplateLayout, TextPlacement, layout_for};

use crate::error::ShowcaseError;
use crate::frame::DeviceFrameKind;

/// Template id selecting the free-form canvas.
pub const CUSTOM_TEMPLATE_ID: &str = "custom";

/// Template opened when none is requested.
pub const DEFAULT_TEMPLATE_ID: &str = "single-device";

/// A named image placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub id: &'static str,
    pub label: &'static str,
    pub default_frame: DeviceFrameKind,
}

/// A named text placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSlot {
    pub id: &'static str,
    pub label: &'static str,
    pub default_value: &'static str,
}

/// A layout definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub slots: &'static [Slot],
    pub text_slots: &'static [TextSlot],
}

impl Template {
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_TEMPLATE_ID
    }

    pub fn slot(&self, id: &str) -> Option<&'static Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn text_slot(&self, id: &str) -> Option<&'static TextSlot> {
        self.text_slots.iter().find(|t| t.id == id)
    }

    /// Look up a slot, failing with a descriptive error.
    pub fn require_slot(&self, id: &str) -> Result<&'static Slot, ShowcaseError> {
        self.slot(id).ok_or_else(|| ShowcaseError::UnknownSlot {
            template: self.id.to_string(),
            slot: id.to_string(),
        })
    }

    pub fn require_text_slot(&self, id: &str) -> Result<&'static TextSlot, ShowcaseError> {
        self.text_slot(id).ok_or_else(|| ShowcaseError::UnknownTextSlot {
            template: self.id.to_string(),
            text: id.to_string(),
        })
    }

    /// Placement table for this template (`None` for the custom canvas).
    pub fn layout(&self) -> Option<&'static TemplateLayout> {
        layout_for(self.id)
    }
}

const fn slot(id: &'static str, label: &'static str, default_frame: DeviceFrameKind) -> Slot {
    Slot {
        id,
        label,
        default_frame,
    }
}

const fn text(id: &'static str, label: &'static str, default_value: &'static str) -> TextSlot {
    TextSlot {
        id,
        label,
        default_value,
    }
}

/// All templates, in display order.
pub static TEMPLATES: &[Template] = &[
    Template {
        id: "single-device",
        name: "Single Device",
        icon: "💻",
        slots: &[slot("main", "Screenshot", DeviceFrameKind::Laptop)],
        text_slots: &[],
    },
    Template {
        id: "desktop-mobile",
        name: "Desktop + Mobile",
        icon: "🖥️",
        slots: &[
            slot("desktop", "Desktop", DeviceFrameKind::Laptop),
            slot("mobile", "Mobile", DeviceFrameKind::Phone),
        ],
        text_slots: &[],
    },
    Template {
        id: "multi-device",
        name: "Multi Device",
        icon: "📱",
        slots: &[
            slot("desktop", "Desktop", DeviceFrameKind::DesktopMonitor),
            slot("tablet", "Tablet", DeviceFrameKind::Tablet),
            slot("mobile", "Mobile", DeviceFrameKind::Phone),
        ],
        text_slots: &[],
    },
    Template {
        id: "comparison",
        name: "Before / After",
        icon: "⚖️",
        slots: &[
            slot("before", "Before", DeviceFrameKind::BrowserLight),
            slot("after", "After", DeviceFrameKind::BrowserLight),
        ],
        text_slots: &[
            text("before-label", "Left label", "Before"),
            text("after-label", "Right label", "After"),
        ],
    },
    Template {
        id: "angled",
        name: "Angled Perspective",
        icon: "📐",
        slots: &[
            slot("main", "Main", DeviceFrameKind::Laptop),
            slot("accent", "Accent", DeviceFrameKind::Phone),
        ],
        text_slots: &[],
    },
    Template {
        id: "grid",
        name: "Grid",
        icon: "▦",
        slots: &[
            slot("top-left", "Top left", DeviceFrameKind::None),
            slot("top-right", "Top right", DeviceFrameKind::None),
            slot("bottom-left", "Bottom left", DeviceFrameKind::None),
            slot("bottom-right", "Bottom right", DeviceFrameKind::None),
        ],
        text_slots: &[],
    },
    Template {
        id: "hero",
        name: "Hero Banner",
        icon: "✨",
        slots: &[slot("main", "Screenshot", DeviceFrameKind::Laptop)],
        text_slots: &[
            text("headline", "Headline", "Your product, beautifully framed"),
            text("subheadline", "Subheadline", "Capture. Compose. Share."),
        ],
    },
    Template {
        id: "app-screens",
        name: "App Screens",
        icon: "📲",
        slots: &[
            slot("left", "Left", DeviceFrameKind::Phone),
            slot("center", "Center", DeviceFrameKind::Phone),
            slot("right", "Right", DeviceFrameKind::Phone),
        ],
        text_slots: &[],
    },
    Template {
        id: CUSTOM_TEMPLATE_ID,
        name: "Custom Canvas",
        icon: "🎨",
        slots: &[],
        text_slots: &[],
    },
];

/// All templates, in display order.
pub fn list_templates() -> &'static [Template] {
    TEMPLATES
}

/// Look up a template by id.
pub fn get_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Look up a template by id, failing with a descriptive error.
pub fn require_template(id: &str) -> Result<&'static Template, ShowcaseError> {
    get_template(id).ok_or_else(|| ShowcaseError::UnknownTemplate(id.to_string()))
}
