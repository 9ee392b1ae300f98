use std::fs;
use std::path::{Path, PathBuf};

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::brush::{BrushPresets, CurrentBrush, parse_color_tag};
use crate::error::ConfigError;
use crate::persistence::DEFAULT_FILE_PREFIX;

/// Startup settings for the canvas and the save action.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "brush_width": 15.0, "palette": ["#FF000000", "#FFFF0000"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Initial brush color tag (`#RRGGBB` or `#AARRGGBB`)
    pub brush_color: String,
    /// Initial brush width in pixels
    pub brush_width: f32,
    pub brush_presets: BrushPresets,
    /// Color tags offered by the palette, in display order
    pub palette: Vec<String>,
    pub background_color: String,
    /// Where saved drawings go; a `doodle_pad` folder in the temp dir if unset
    pub export_dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            brush_color: "#FF000000".to_owned(),
            brush_width: 20.0,
            brush_presets: BrushPresets::default(),
            palette: [
                "#FF000000", "#FFFF0000", "#FF008000", "#FF0000FF", "#FFFFFF00", "#FFFFA500",
                "#FF800080", "#FFFFFFFF",
            ]
            .map(str::to_owned)
            .to_vec(),
            background_color: "#FFFFFFFF".to_owned(),
            export_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
        }
    }
}

impl DrawingConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every color tag and width
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.brush()?;
        self.background_color()?;
        self.palette_colors()?;
        for size in crate::brush::BrushSize::ALL {
            CurrentBrush::new(Color32::BLACK, self.brush_presets.width(size))?;
        }
        Ok(())
    }

    pub fn brush(&self) -> Result<CurrentBrush, ConfigError> {
        Ok(CurrentBrush::new(
            parse_color_tag(&self.brush_color)?,
            self.brush_width,
        )?)
    }

    pub fn background_color(&self) -> Result<Color32, ConfigError> {
        Ok(parse_color_tag(&self.background_color)?)
    }

    pub fn palette_colors(&self) -> Result<Vec<Color32>, ConfigError> {
        self.palette
            .iter()
            .map(|tag| parse_color_tag(tag).map_err(ConfigError::from))
            .collect()
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("doodle_pad"))
    }
}
