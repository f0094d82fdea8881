//! # Device Frames
//!
//! Each [`DeviceFrameKind`] is a fixed visual chrome style. The kind alone
//! determines its aspect rule, bezel insets, corner radii and shadow: nothing
//! is configurable per instance beyond choosing the kind.
//!
//! | Kind | Height from width `w` |
//! |------|------------------------|
//! | `none` | `w × aspect`, capped at 900 (width rescaled) |
//! | `phone` | `min(2w, 850)`, width `= h / 2` when capped |
//! | `tablet` | `1.33 w` |
//! | `laptop` | `0.65 w` (+ keyboard base below) |
//! | `desktop-monitor` | `0.6 w` (+ stand below) |
//! | `imac` | `0.62 w` (+ stand below) |
//! | `browser-*` | `w × aspect + 40` |

pub mod render;

pub use render::render_frame;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShowcaseError;
use crate::raster::Shadow;
use crate::source::DeviceClass;

/// Maximum height of an unframed image.
pub const NONE_MAX_HEIGHT: f32 = 900.0;
/// Maximum height of a phone frame.
pub const PHONE_MAX_HEIGHT: f32 = 850.0;
/// Phone height over width.
pub const PHONE_ASPECT: f32 = 2.0;
/// Height of the browser window title bar.
pub const BROWSER_TITLE_BAR: f32 = 40.0;

/// Visual chrome drawn around an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceFrameKind {
    #[default]
    None,
    Phone,
    Tablet,
    Laptop,
    DesktopMonitor,
    Imac,
    BrowserLight,
    BrowserDark,
}

impl DeviceFrameKind {
    /// All frame kinds, in picker order.
    pub const ALL: [DeviceFrameKind; 8] = [
        DeviceFrameKind::None,
        DeviceFrameKind::Phone,
        DeviceFrameKind::Tablet,
        DeviceFrameKind::Laptop,
        DeviceFrameKind::DesktopMonitor,
        DeviceFrameKind::Imac,
        DeviceFrameKind::BrowserLight,
        DeviceFrameKind::BrowserDark,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DeviceFrameKind::None => "none",
            DeviceFrameKind::Phone => "phone",
            DeviceFrameKind::Tablet => "tablet",
            DeviceFrameKind::Laptop => "laptop",
            DeviceFrameKind::DesktopMonitor => "desktop-monitor",
            DeviceFrameKind::Imac => "imac",
            DeviceFrameKind::BrowserLight => "browser-light",
            DeviceFrameKind::BrowserDark => "browser-dark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceFrameKind::None => "No Frame",
            DeviceFrameKind::Phone => "Phone",
            DeviceFrameKind::Tablet => "Tablet",
            DeviceFrameKind::Laptop => "Laptop",
            DeviceFrameKind::DesktopMonitor => "Desktop Monitor",
            DeviceFrameKind::Imac => "iMac",
            DeviceFrameKind::BrowserLight => "Browser (Light)",
            DeviceFrameKind::BrowserDark => "Browser (Dark)",
        }
    }

    /// Default frame for a freely placed image of the given device class.
    pub fn for_device_class(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Mobile => DeviceFrameKind::Phone,
            _ => DeviceFrameKind::Laptop,
        }
    }

    pub fn is_browser(self) -> bool {
        matches!(self, DeviceFrameKind::BrowserLight | DeviceFrameKind::BrowserDark)
    }

    /// Drop shadow drawn under the chrome. `None` for the unframed kind.
    pub fn shadow(self) -> Option<Shadow> {
        match self {
            DeviceFrameKind::None => None,
            DeviceFrameKind::Phone | DeviceFrameKind::Tablet => Some(Shadow::new(40.0, 20.0, 0.35)),
            DeviceFrameKind::Laptop | DeviceFrameKind::DesktopMonitor | DeviceFrameKind::Imac => {
                Some(Shadow::new(50.0, 25.0, 0.3))
            }
            DeviceFrameKind::BrowserLight | DeviceFrameKind::BrowserDark => {
                Some(Shadow::new(30.0, 15.0, 0.25))
            }
        }
    }
}

impl fmt::Display for DeviceFrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DeviceFrameKind {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceFrameKind::ALL
            .iter()
            .copied()
            .find(|k| k.id() == s.to_lowercase())
            .ok_or_else(|| ShowcaseError::InvalidValue(format!("unknown device frame '{}'", s)))
    }
}

/// Size of a frame's bounding box (the chrome body, excluding stands and
/// keyboard bases drawn below it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSize {
    pub width: f32,
    pub height: f32,
}

/// Derive the frame's box from the requested width.
///
/// `image_aspect` is the source image's height over width; only `none` and
/// the browser frames use it.
pub fn frame_size(kind: DeviceFrameKind, target_width: f32, image_aspect: f32) -> FrameSize {
    let w = target_width;
    match kind {
        DeviceFrameKind::None => {
            let h = w * image_aspect;
            if h > NONE_MAX_HEIGHT {
                FrameSize {
                    width: w * NONE_MAX_HEIGHT / h,
                    height: NONE_MAX_HEIGHT,
                }
            } else {
                FrameSize { width: w, height: h }
            }
        }
        DeviceFrameKind::Phone => {
            let h = (w * PHONE_ASPECT).min(PHONE_MAX_HEIGHT);
            let width = if w * PHONE_ASPECT > PHONE_MAX_HEIGHT {
                h / PHONE_ASPECT
            } else {
                w
            };
            FrameSize { width, height: h }
        }
        DeviceFrameKind::Tablet => FrameSize { width: w, height: w * 1.33 },
        DeviceFrameKind::Laptop => FrameSize { width: w, height: w * 0.65 },
        DeviceFrameKind::DesktopMonitor => FrameSize { width: w, height: w * 0.6 },
        DeviceFrameKind::Imac => FrameSize { width: w, height: w * 0.62 },
        DeviceFrameKind::BrowserLight | DeviceFrameKind::BrowserDark => FrameSize {
            width: w,
            height: w * image_aspect + BROWSER_TITLE_BAR,
        },
    }
}
