//! # Error Types
//!
//! This module defines error types used throughout the showcase library.

use thiserror::Error;

/// Main error type for showcase operations
#[derive(Debug, Error)]
pub enum ShowcaseError {
    /// Template id not present in the catalog
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Slot id not defined by the template
    #[error("Unknown slot '{slot}' in template '{template}'")]
    UnknownSlot { template: String, slot: String },

    /// Text slot id not defined by the template
    #[error("Unknown text slot '{text}' in template '{template}'")]
    UnknownTextSlot { template: String, text: String },

    /// Custom canvas item does not exist
    #[error("Unknown canvas item: {0}")]
    UnknownItem(u64),

    /// Image id not among the images available to the session
    #[error("Unknown image: {0}")]
    UnknownImage(String),

    /// Image is already assigned to another slot
    #[error("Image '{image}' is already used by slot '{slot}'")]
    ImageInUse { image: String, slot: String },

    /// The tool was opened without any eligible images
    #[error("Select at least one image to create a showcase")]
    EmptySelection,

    /// Operation only valid on the custom canvas
    #[error("Not in custom canvas mode")]
    NotCustomMode,

    /// The showcase session was closed
    #[error("Showcase session is closed")]
    Closed,

    /// Invalid value in a user-supplied argument
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Image decoding error
    #[error("Decode error: {0}")]
    Decode(String),

    /// Raster encoding error
    #[error("Encode error: {0}")]
    Encode(String),

    /// Persistence collaborator error
    #[error("Store error: {0}")]
    Store(String),

    /// Composition spec parse error
    #[error("Spec error: {0}")]
    Spec(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
