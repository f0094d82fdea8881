//! Slot assignment engine.
//!
//! Best-effort mapping of available images to a template's slots so a
//! multi-slot template looks populated as soon as it is selected. The user
//! can always override a guess through the image picker.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::frame::DeviceFrameKind;
use crate::source::{CaptureKind, DeviceClass, ImageId, SourceImage};
use crate::template::{Slot, Template};

/// Which images a slot prefers, derived from its default frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotHint {
    /// Prefer images of this device class captured as a viewport.
    Device(DeviceClass),
    /// Prefer full-page captures of any device class.
    FullPage,
}

impl SlotHint {
    pub fn for_frame(frame: DeviceFrameKind) -> Self {
        match frame {
            DeviceFrameKind::Phone => SlotHint::Device(DeviceClass::Mobile),
            DeviceFrameKind::Tablet => SlotHint::Device(DeviceClass::Tablet),
            DeviceFrameKind::None => SlotHint::FullPage,
            _ => SlotHint::Device(DeviceClass::Desktop),
        }
    }

    /// Exact match: device class and capture kind.
    fn exact(self, image: &SourceImage) -> bool {
        match self {
            SlotHint::Device(class) => {
                image.device_class == class && image.capture_kind == CaptureKind::Viewport
            }
            SlotHint::FullPage => image.capture_kind == CaptureKind::Fullpage,
        }
    }

    /// Relaxed match on device class only. A full-page slot has no class to
    /// relax to and goes straight to "any unused image".
    fn relaxed(self, image: &SourceImage) -> bool {
        match self {
            SlotHint::Device(class) => image.device_class == class,
            SlotHint::FullPage => false,
        }
    }
}

/// Pick the first unused image for `slot`, trying exact, then class-only,
/// then any unused image.
fn pick<'a>(slot: &Slot, images: &'a [SourceImage], used: &HashSet<ImageId>) -> Option<&'a SourceImage> {
    let hint = SlotHint::for_frame(slot.default_frame);
    let unused = || images.iter().filter(|img| !used.contains(&img.id));

    unused()
        .find(|img| hint.exact(img))
        .or_else(|| unused().find(|img| hint.relaxed(img)))
        .or_else(|| unused().next())
}

/// Assign images to every slot of `template`, in slot order.
///
/// No image id is used twice; slots left over once images run out are
/// absent from the result. Ties go to the earliest image in `images`.
pub fn auto_assign(template: &Template, images: &[SourceImage]) -> HashMap<String, SourceImage> {
    let mut used = HashSet::new();
    let mut assignments = HashMap::new();

    for slot in template.slots {
        match pick(slot, images, &used) {
            Some(image) => {
                debug!(template = template.id, slot = slot.id, image = %image.id, "auto-assigned");
                used.insert(image.id.clone());
                assignments.insert(slot.id.to_string(), image.clone());
            }
            None => {
                debug!(template = template.id, slot = slot.id, "no image left for slot");
            }
        }
    }

    assignments
}
