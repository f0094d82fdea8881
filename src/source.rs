//! Captured images available for composition.
//!
//! A [`SourceImage`] is produced by the capture side of the extension and is
//! read-only here: the compositor only decodes its payload, never mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ShowcaseError;

/// Stable identifier of a captured image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Device the capture was taken on (or emulated).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
    Tablet,
    Showcase,
}

impl DeviceClass {
    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Showcase => "showcase",
        }
    }
}

impl FromStr for DeviceClass {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desktop" => Ok(DeviceClass::Desktop),
            "mobile" | "phone" => Ok(DeviceClass::Mobile),
            "tablet" => Ok(DeviceClass::Tablet),
            "showcase" => Ok(DeviceClass::Showcase),
            other => Err(ShowcaseError::InvalidValue(format!(
                "unknown device class '{}'",
                other
            ))),
        }
    }
}

/// How the capture was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    #[default]
    Viewport,
    Fullpage,
    Video,
    Showcase,
}

impl CaptureKind {
    pub fn name(self) -> &'static str {
        match self {
            CaptureKind::Viewport => "viewport",
            CaptureKind::Fullpage => "fullpage",
            CaptureKind::Video => "video",
            CaptureKind::Showcase => "showcase",
        }
    }
}

impl FromStr for CaptureKind {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewport" => Ok(CaptureKind::Viewport),
            "fullpage" | "full-page" | "full_page" => Ok(CaptureKind::Fullpage),
            "video" => Ok(CaptureKind::Video),
            "showcase" => Ok(CaptureKind::Showcase),
            other => Err(ShowcaseError::InvalidValue(format!(
                "unknown capture kind '{}'",
                other
            ))),
        }
    }
}

/// An immutable captured asset.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: ImageId,
    /// Encoded image bytes (PNG, JPEG, ...). Shared, never copied per render.
    pub data: Arc<Vec<u8>>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub device_class: DeviceClass,
    pub capture_kind: CaptureKind,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
}

impl SourceImage {
    /// Height over width of the captured pixels. Falls back to 16:9 for
    /// degenerate dimensions.
    pub fn aspect_ratio(&self) -> f32 {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return 9.0 / 16.0;
        }
        self.pixel_height as f32 / self.pixel_width as f32
    }

    pub fn is_mobile(&self) -> bool {
        self.device_class == DeviceClass::Mobile
    }
}
