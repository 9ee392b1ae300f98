use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

/// End-of-stroke shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeCap {
    #[default]
    Round,
    Butt,
    Square,
}

/// Color and width captured by a path when it starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushStyle {
    pub color: Color32,
    pub width: f32,
    pub cap: StrokeCap,
}

impl BrushStyle {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            color,
            width,
            cap: StrokeCap::Round,
        }
    }
}

// Committed stroke, never mutated again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Pos2>,
    style: BrushStyle,
}

// Stroke currently under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct InProgressPath {
    points: Vec<Pos2>,
    style: BrushStyle,
}

impl Path {
    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn style(&self) -> BrushStyle {
        self.style
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl InProgressPath {
    /// Start a stroke at `start` with a snapshot of the brush
    pub fn begin(style: BrushStyle, start: Pos2) -> Self {
        Self {
            points: vec![start],
            style,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn style(&self) -> BrushStyle {
        self.style
    }

    /// Freeze into a committed path
    pub fn finish(self) -> Path {
        Path {
            points: self.points,
            style: self.style,
        }
    }
}
