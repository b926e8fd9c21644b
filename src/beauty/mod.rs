//! Skin retouching: configuration, per-pixel blending and blemish healing.

pub mod blemish;
pub mod blend;
pub mod config;

pub use blemish::{BlemishLayers, heal_spot};
pub use blend::{RetouchLayers, retouch_skin};
pub use config::{BeautyConfig, BlemishMode, BlemishPoint, ShapeValues, SkinMode, SkinValues};
