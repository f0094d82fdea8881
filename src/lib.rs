//! # Showcase - Device Mockup Compositor
//!
//! Showcase places captured screenshots into device-frame templates and
//! renders them to a fixed 1920×1080 raster. It provides:
//!
//! - **Templates**: a static catalog of slot layouts with default frames
//! - **Device frames**: phone, tablet, laptop, monitor, iMac and browser chrome
//! - **Auto-assignment**: best-effort mapping of captures to template slots
//! - **Custom canvas**: free placement with drag, 8-handle resize and z-order
//! - **Export**: PNG encoding handed to a pluggable image store
//!
//! ## Quick Start
//!
//! ```no_run
//! use showcase::{Compositor, ShowcaseSession, spec::load_image_file};
//! use showcase::source::{CaptureKind, DeviceClass};
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), showcase::ShowcaseError> {
//! let desktop = load_image_file(Path::new("site.png"), DeviceClass::Desktop, CaptureKind::Viewport)?;
//! let phone = load_image_file(Path::new("phone.png"), DeviceClass::Mobile, CaptureKind::Viewport)?;
//!
//! let mut session = ShowcaseSession::open(vec![desktop, phone], Compositor::default())?;
//! session.switch_template("desktop-mobile").await?;
//! let png = session.export_png().await?;
//! std::fs::write("mockup.png", png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`source`] | Captured images and their metadata |
//! | [`template`] | Template catalog and placement table |
//! | [`frame`] | Device frame geometry and drawing |
//! | [`raster`] | Output surface and drawing primitives |
//! | [`text`] | Font loading, wrapping and glyph drawing |
//! | [`assign`] | Slot auto-assignment |
//! | [`state`] | Composition state and its transitions |
//! | [`compositor`] | Decode cache and paint pipeline |
//! | [`interact`] | Pointer/keyboard state machine |
//! | [`session`] | Open showcase, render loop, save and download |
//! | [`spec`] | JSON composition spec and CLI config |
//! | [`error`] | Error types |

pub mod assign;
pub mod compositor;
pub mod error;
pub mod frame;
pub mod interact;
pub mod raster;
pub mod session;
pub mod source;
pub mod spec;
pub mod state;
pub mod template;
pub mod text;

// Re-exports for convenience
pub use compositor::{Compositor, ImageCache};
pub use error::ShowcaseError;
pub use frame::DeviceFrameKind;
pub use session::{DirectoryStore, ImageStore, MemoryStore, SaveStatus, ShowcaseSession};
pub use source::{ImageId, SourceImage};
pub use state::{Background, CompositionState};
