use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::DrawingError;
use crate::path::BrushStyle;

pub const DEFAULT_BRUSH_COLOR: Color32 = Color32::BLACK;
pub const DEFAULT_BRUSH_WIDTH: f32 = 20.0;

/// Preset sizes offered by the brush-size dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushSize {
    Small,
    Medium,
    Large,
}

impl BrushSize {
    pub const ALL: [BrushSize; 3] = [BrushSize::Small, BrushSize::Medium, BrushSize::Large];

    pub fn label(self) -> &'static str {
        match self {
            BrushSize::Small => "Small",
            BrushSize::Medium => "Medium",
            BrushSize::Large => "Large",
        }
    }
}

/// Widths for each [`BrushSize`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushPresets {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

impl Default for BrushPresets {
    fn default() -> Self {
        Self {
            small: 5.0,
            medium: 15.0,
            large: 30.0,
        }
    }
}

impl BrushPresets {
    pub fn width(&self, size: BrushSize) -> f32 {
        match size {
            BrushSize::Small => self.small,
            BrushSize::Medium => self.medium,
            BrushSize::Large => self.large,
        }
    }
}

/// The live brush. New paths copy it; nothing holds a reference to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentBrush {
    color: Color32,
    width: f32,
}

impl Default for CurrentBrush {
    fn default() -> Self {
        Self {
            color: DEFAULT_BRUSH_COLOR,
            width: DEFAULT_BRUSH_WIDTH,
        }
    }
}

impl CurrentBrush {
    pub fn new(color: Color32, width: f32) -> Result<Self, DrawingError> {
        validate_width(width)?;
        Ok(Self { color, width })
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    /// Rejects non-positive widths and leaves the brush untouched
    pub fn set_width(&mut self, width: f32) -> Result<(), DrawingError> {
        validate_width(width)?;
        self.width = width;
        Ok(())
    }

    /// Snapshot for a path that is about to start
    pub fn style(&self) -> BrushStyle {
        BrushStyle::new(self.color, self.width)
    }
}

fn validate_width(width: f32) -> Result<(), DrawingError> {
    if width.is_finite() && width > 0.0 {
        Ok(())
    } else {
        Err(DrawingError::InvalidBrushWidth(width))
    }
}

/// Parse a palette color tag: `#RRGGBB`, or `#AARRGGBB` with alpha first.
pub fn parse_color_tag(tag: &str) -> Result<Color32, DrawingError> {
    let invalid = || DrawingError::InvalidColorTag(tag.to_owned());

    let hex = tag.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
    let [a, r, g, b] = match hex.len() {
        6 => (0xFF00_0000 | value).to_be_bytes(),
        8 => value.to_be_bytes(),
        _ => return Err(invalid()),
    };

    Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
}
