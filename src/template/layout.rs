//! Per-template placement table.
//!
//! Every template draws through the same loop: for each placed slot, apply
//! its decorators in order, then render the device frame at
//! `(center_x, center_y, width)`. Overlays and text are drawn afterwards.

use crate::raster::{Rgba8, Shadow};
use crate::text::TextAlign;

/// Extra effect applied around one slot's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decorator {
    /// Planar rotation about the slot center, in degrees (clockwise).
    Rotate { degrees: f32 },
    /// Additional shadow under the frame's bounding box.
    Shadow(Shadow),
    /// Colored rounded card behind the frame.
    GridBorder {
        color: Rgba8,
        padding: f32,
        radius: f32,
    },
}

/// Template-wide element drawn on top of the slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// Vertical divider line.
    Divider {
        x: f32,
        top: f32,
        bottom: f32,
        width: f32,
        color: Rgba8,
    },
    /// Round badge with a short label.
    Badge {
        x: f32,
        y: f32,
        radius: f32,
        fill: Rgba8,
        label: &'static str,
        label_color: Rgba8,
    },
}

/// Where one slot is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPlacement {
    pub slot: &'static str,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub decorators: &'static [Decorator],
}

/// Where one text slot is drawn. `y` is the first line's baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub text: &'static str,
    pub x: f32,
    pub y: f32,
    pub max_width: f32,
    pub size: f32,
    pub color: Rgba8,
    pub align: TextAlign,
}

/// Full placement table for one template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateLayout {
    pub template: &'static str,
    pub slots: &'static [SlotPlacement],
    pub texts: &'static [TextPlacement],
    pub overlays: &'static [Overlay],
}

impl TemplateLayout {
    pub fn placement(&self, slot: &str) -> Option<&'static SlotPlacement> {
        self.slots.iter().find(|p| p.slot == slot)
    }

    pub fn text_placement(&self, text: &str) -> Option<&'static TextPlacement> {
        self.texts.iter().find(|p| p.text == text)
    }
}

const fn place(slot: &'static str, center_x: f32, center_y: f32, width: f32) -> SlotPlacement {
    SlotPlacement {
        slot,
        center_x,
        center_y,
        width,
        decorators: &[],
    }
}

const fn decorated(
    slot: &'static str,
    center_x: f32,
    center_y: f32,
    width: f32,
    decorators: &'static [Decorator],
) -> SlotPlacement {
    SlotPlacement {
        slot,
        center_x,
        center_y,
        width,
        decorators,
    }
}

const INK: Rgba8 = Rgba8::rgb(0x11, 0x18, 0x27);
const MUTED: Rgba8 = Rgba8::rgb(0x4b, 0x55, 0x63);
const DIVIDER: Rgba8 = Rgba8::rgb(0xd1, 0xd5, 0xdb);

const fn grid_border(color: Rgba8) -> Decorator {
    Decorator::GridBorder {
        color,
        padding: 14.0,
        radius: 18.0,
    }
}

static LAYOUTS: &[TemplateLayout] = &[
    TemplateLayout {
        template: "single-device",
        slots: &[place("main", 960.0, 540.0, 900.0)],
        texts: &[],
        overlays: &[],
    },
    TemplateLayout {
        template: "desktop-mobile",
        slots: &[
            place("desktop", 780.0, 520.0, 1100.0),
            place("mobile", 1520.0, 560.0, 320.0),
        ],
        texts: &[],
        overlays: &[],
    },
    TemplateLayout {
        template: "multi-device",
        slots: &[
            place("desktop", 960.0, 460.0, 1000.0),
            place("tablet", 330.0, 620.0, 380.0),
            place("mobile", 1600.0, 640.0, 250.0),
        ],
        texts: &[],
        overlays: &[],
    },
    TemplateLayout {
        template: "comparison",
        slots: &[
            place("before", 500.0, 540.0, 800.0),
            place("after", 1420.0, 540.0, 800.0),
        ],
        texts: &[
            TextPlacement {
                text: "before-label",
                x: 500.0,
                y: 130.0,
                max_width: 700.0,
                size: 44.0,
                color: INK,
                align: TextAlign::Center,
            },
            TextPlacement {
                text: "after-label",
                x: 1420.0,
                y: 130.0,
                max_width: 700.0,
                size: 44.0,
                color: INK,
                align: TextAlign::Center,
            },
        ],
        overlays: &[
            Overlay::Divider {
                x: 960.0,
                top: 80.0,
                bottom: 1000.0,
                width: 4.0,
                color: DIVIDER,
            },
            Overlay::Badge {
                x: 960.0,
                y: 540.0,
                radius: 36.0,
                fill: INK,
                label: "VS",
                label_color: Rgba8::WHITE,
            },
        ],
    },
    TemplateLayout {
        template: "angled",
        slots: &[
            decorated(
                "main",
                880.0,
                500.0,
                1000.0,
                &[
                    Decorator::Rotate { degrees: -8.0 },
                    Decorator::Shadow(Shadow::new(80.0, 40.0, 0.25)),
                ],
            ),
            decorated(
                "accent",
                1520.0,
                600.0,
                300.0,
                &[
                    Decorator::Rotate { degrees: 10.0 },
                    Decorator::Shadow(Shadow::new(60.0, 30.0, 0.3)),
                ],
            ),
        ],
        texts: &[],
        overlays: &[],
    },
    TemplateLayout {
        template: "grid",
        slots: &[
            decorated("top-left", 500.0, 290.0, 760.0, &[grid_border(Rgba8::rgb(0x63, 0x66, 0xf1))]),
            decorated("top-right", 1420.0, 290.0, 760.0, &[grid_border(Rgba8::rgb(0xec, 0x48, 0x99))]),
            decorated("bottom-left", 500.0, 790.0, 760.0, &[grid_border(Rgba8::rgb(0x14, 0xb8, 0xa6))]),
            decorated("bottom-right", 1420.0, 790.0, 760.0, &[grid_border(Rgba8::rgb(0xf5, 0x9e, 0x0b))]),
        ],
        texts: &[],
        overlays: &[],
    },
    TemplateLayout {
        template: "hero",
        slots: &[place("main", 1300.0, 560.0, 1000.0)],
        texts: &[
            TextPlacement {
                text: "headline",
                x: 120.0,
                y: 420.0,
                max_width: 560.0,
                size: 72.0,
                color: INK,
                align: TextAlign::Left,
            },
            TextPlacement {
                text: "subheadline",
                x: 120.0,
                y: 700.0,
                max_width: 560.0,
                size: 32.0,
                color: MUTED,
                align: TextAlign::Left,
            },
        ],
        overlays: &[],
    },
    TemplateLayout {
        template: "app-screens",
        slots: &[
            place("left", 560.0, 560.0, 300.0),
            place("center", 960.0, 520.0, 340.0),
            place("right", 1360.0, 560.0, 300.0),
        ],
        texts: &[],
        overlays: &[],
    },
];

/// Placement table for a template id.
pub fn layout_for(template_id: &str) -> Option<&'static TemplateLayout> {
    LAYOUTS.iter().find(|l| l.template == template_id)
}
