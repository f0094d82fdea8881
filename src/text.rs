//! TTF text measurement, word wrapping and rasterization.
//!
//! Fonts are loaded with ab_glyph from caller-supplied bytes. Wrapping is
//! written against the [`TextMeasure`] trait so it can be exercised with a
//! fixed-advance measurer.

use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ShowcaseError;
use crate::raster::{Rgba8, Surface};

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.2;

/// Horizontal anchor of a text line relative to its x position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Width of a run of text at a font size.
pub trait TextMeasure {
    fn measure(&self, text: &str, size: f32) -> f32;
}

/// Break `text` into lines no wider than `max_width` at word boundaries.
///
/// Words are appended to the current line while it still fits; otherwise
/// the line is flushed and the word starts a new one. A single word wider
/// than `max_width` gets a line of its own. Explicit newlines start a new
/// paragraph.
pub fn wrap_text(text: &str, max_width: f32, size: f32, measure: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if !line.is_empty() && measure.measure(&candidate, size) > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// A loaded TTF/OTF font.
#[derive(Clone)]
pub struct TextFont {
    font: FontArc,
}

impl std::fmt::Debug for TextFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFont").finish_non_exhaustive()
    }
}

impl TextFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ShowcaseError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| ShowcaseError::InvalidValue(format!("Failed to load font: {}", e)))?;
        Ok(Self { font })
    }

    pub fn load(path: &Path) -> Result<Self, ShowcaseError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Lay out a single line, returning positioned glyphs and total advance.
    fn layout(&self, text: &str, size: f32, x: f32, baseline: f32) -> (Vec<Glyph>, f32) {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut glyphs = Vec::new();
        let mut caret = 0.0f32;
        let mut previous = None;

        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(size, point(x + caret, baseline)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        (glyphs, caret)
    }

    /// Draw one line with its baseline at `baseline`.
    pub fn draw_line(
        &self,
        surface: &mut Surface,
        text: &str,
        x: f32,
        baseline: f32,
        size: f32,
        color: Rgba8,
        align: TextAlign,
    ) {
        let width = self.measure(text, size);
        let start = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        let (glyphs, _) = self.layout(text, size, start, baseline);

        for glyph in glyphs {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    surface.blend_pixel(
                        bounds.min.x as i32 + px as i32,
                        bounds.min.y as i32 + py as i32,
                        color,
                        coverage,
                    );
                });
            }
        }
    }

    /// Word-wrap `text` to `max_width` and draw it; the first baseline sits at
    /// `y`, each following line `LINE_HEIGHT × size` lower. Returns the number
    /// of lines drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_wrapped(
        &self,
        surface: &mut Surface,
        text: &str,
        x: f32,
        y: f32,
        max_width: f32,
        size: f32,
        color: Rgba8,
        align: TextAlign,
    ) -> usize {
        let lines = wrap_text(text, max_width, size, self);
        for (i, line) in lines.iter().enumerate() {
            let baseline = y + i as f32 * size * LINE_HEIGHT;
            self.draw_line(surface, line, x, baseline, size, color, align);
        }
        lines.len()
    }
}

impl TextMeasure for TextFont {
    fn measure(&self, text: &str, size: f32) -> f32 {
        self.layout(text, size, 0.0, 0.0).1
    }
}
