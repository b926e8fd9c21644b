//! Beauty configuration and its JSON wire format.
//!
//! The JSON layout mirrors the editor payload:
//!
//! ```json
//! {
//!   "skinMode": "natural",
//!   "skinValues": { "smooth": 40, "whiten": 10, "even": 20, "korean": 0, "texture": 10 },
//!   "acneMode": { "auto": true, "manualPoints": [{ "x": 48.5, "y": 52.0 }] },
//!   "faceValues": { "slim": 20, "vline": 0, "chinShrink": 0, "forehead": 0,
//!                   "jaw": 0, "noseSlim": 0, "noseBridge": 0 }
//! }
//! ```
//!
//! Every field is optional and defaults to "no effect".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinMode {
    #[default]
    #[serde(alias = "natural")]
    Standard,
    Strong,
}

impl SkinMode {
    pub const ALL: &[SkinMode] = &[SkinMode::Standard, SkinMode::Strong];

    pub fn name(self) -> &'static str {
        match self {
            SkinMode::Standard => "Standard",
            SkinMode::Strong => "Strong",
        }
    }

    /// Blur radius of the smoothing layer.
    pub fn smooth_radius(self) -> f32 {
        match self {
            SkinMode::Standard => 6.0,
            SkinMode::Strong => 12.0,
        }
    }

    /// Summed RGB difference above which smoothing leaves a pixel alone.
    pub fn detail_threshold(self) -> f32 {
        match self {
            SkinMode::Standard => 30.0,
            SkinMode::Strong => 60.0,
        }
    }
}

/// Skin retouch strengths, each 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkinValues {
    pub smooth: f32,
    pub whiten: f32,
    pub even: f32,
    #[serde(rename = "korean", alias = "dewyGlow")]
    pub dewy_glow: f32,
    #[serde(alias = "texturePreserve")]
    pub texture: f32,
}

/// Face reshape strengths, signed percentages in -100..=100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeValues {
    pub slim: f32,
    #[serde(rename = "vline", alias = "vLine")]
    pub v_line: f32,
    pub chin_shrink: f32,
    pub forehead: f32,
    pub jaw: f32,
    pub nose_slim: f32,
    pub nose_bridge: f32,
}

impl ShapeValues {
    pub fn is_zero(&self) -> bool {
        self.as_array().iter().all(|v| *v == 0.0)
    }

    fn as_array(&self) -> [f32; 7] {
        [
            self.slim,
            self.v_line,
            self.chin_shrink,
            self.forehead,
            self.jaw,
            self.nose_slim,
            self.nose_bridge,
        ]
    }
}

/// A manual heal location as percentages (0..=100) of image width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlemishPoint {
    pub x: f32,
    pub y: f32,
}

impl BlemishPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlemishMode {
    pub auto: bool,
    pub manual_points: Vec<BlemishPoint>,
}

/// Complete input of one beauty call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BeautyConfig {
    pub skin_mode: SkinMode,
    pub skin_values: SkinValues,
    #[serde(rename = "acneMode", alias = "blemishMode")]
    pub blemish: BlemishMode,
    #[serde(rename = "faceValues", alias = "shapeValues")]
    pub shape: ShapeValues,
}

impl BeautyConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a JSON config file. Out-of-range values are clamped and logged.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_json(&text)?;
        for warning in config.sanitize() {
            log::warn!("{}: {warning}", path.display());
        }
        Ok(config)
    }

    /// True when processing with this config cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        let s = &self.skin_values;
        s.smooth <= 0.0
            && s.whiten <= 0.0
            && s.even <= 0.0
            && s.dewy_glow <= 0.0
            && s.texture <= 0.0
            && self.shape.is_zero()
            && !self.blemish.auto
            && self.blemish.manual_points.is_empty()
    }

    /// Clamp every value into its documented range. Returns a description of
    /// each correction made.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let s = &mut self.skin_values;
        for (name, v) in [
            ("smooth", &mut s.smooth),
            ("whiten", &mut s.whiten),
            ("even", &mut s.even),
            ("dewy_glow", &mut s.dewy_glow),
            ("texture", &mut s.texture),
        ] {
            clamp_field(name, v, 0.0, 100.0, &mut warnings);
        }

        let f = &mut self.shape;
        for (name, v) in [
            ("slim", &mut f.slim),
            ("v_line", &mut f.v_line),
            ("chin_shrink", &mut f.chin_shrink),
            ("forehead", &mut f.forehead),
            ("jaw", &mut f.jaw),
            ("nose_slim", &mut f.nose_slim),
            ("nose_bridge", &mut f.nose_bridge),
        ] {
            clamp_field(name, v, -100.0, 100.0, &mut warnings);
        }

        let before = self.blemish.manual_points.len();
        self.blemish
            .manual_points
            .retain(|p| p.x.is_finite() && p.y.is_finite());
        if self.blemish.manual_points.len() != before {
            warnings.push(format!(
                "dropped {} manual point(s) with non-finite coordinates",
                before - self.blemish.manual_points.len()
            ));
        }
        for (i, p) in self.blemish.manual_points.iter_mut().enumerate() {
            clamp_field(&format!("manual_points[{i}].x"), &mut p.x, 0.0, 100.0, &mut warnings);
            clamp_field(&format!("manual_points[{i}].y"), &mut p.y, 0.0, 100.0, &mut warnings);
        }

        warnings
    }
}

fn clamp_field(name: &str, value: &mut f32, min: f32, max: f32, warnings: &mut Vec<String>) {
    if !value.is_finite() {
        warnings.push(format!("{name} was not a number, reset to 0"));
        *value = 0.0;
    } else if *value < min || *value > max {
        let clamped = value.clamp(min, max);
        warnings.push(format!("{name}={value} out of range, clamped to {clamped}"));
        *value = clamped;
    }
}
