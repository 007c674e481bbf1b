//! Text shaping
//!
//! With a font, runs are shaped by rustybuzz and come back as positioned
//! glyphs in visual order. Without one, every character advances half an em
//! so that layout keeps the same geometry from run to run.

use crate::fonts::FontHandle;
use rustybuzz::{Direction as HbDirection, Face as HbFace, UnicodeBuffer};

/// Advance of one character when no font is loaded (em)
pub const FALLBACK_ADVANCE_EM: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub id: u16,
    /// Offset from the start of the run (px)
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ShapedRun {
    pub glyphs: Vec<PositionedGlyph>,
    /// Total advance (px)
    pub advance: f32,
}

/// Whether `text` contains right-to-left script
pub fn is_rtl_text(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c as u32,
            0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF)
    })
}

pub struct TextShaper<'a> {
    face: Option<HbFace<'a>>,
}

impl<'a> TextShaper<'a> {
    pub fn new(font: &'a FontHandle) -> Self {
        Self {
            face: font.data().and_then(|data| HbFace::from_slice(data, 0)),
        }
    }

    /// Face used for glyph outlines
    pub fn face(&self) -> Option<&HbFace<'a>> {
        self.face.as_ref()
    }

    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match &self.face {
            Some(_) => self.shape(text, size).advance,
            None => fallback_advance(text, size),
        }
    }

    pub fn shape(&self, text: &str, size: f32) -> ShapedRun {
        let Some(face) = &self.face else {
            return ShapedRun {
                glyphs: Vec::new(),
                advance: fallback_advance(text, size),
            };
        };

        let units = face.units_per_em().max(1) as f32;
        let scale = size / units;
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(if is_rtl_text(text) {
            HbDirection::RightToLeft
        } else {
            HbDirection::LeftToRight
        });
        let output = rustybuzz::shape(face, &[], buffer);

        let mut glyphs = Vec::with_capacity(output.len());
        let mut pen_x = 0.0f32;
        for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
            let id = info.glyph_id as u16;
            if id != 0 {
                glyphs.push(PositionedGlyph {
                    id,
                    x: pen_x + pos.x_offset as f32 * scale,
                    y: pos.y_offset as f32 * scale,
                });
            }
            pen_x += pos.x_advance as f32 * scale;
        }

        ShapedRun {
            glyphs,
            advance: pen_x,
        }
    }
}

fn fallback_advance(text: &str, size: f32) -> f32 {
    text.chars().filter(|c| !c.is_control()).count() as f32 * size * FALLBACK_ADVANCE_EM
}
