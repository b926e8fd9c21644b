//! Face Beauty - library crate.
//!
//! Heuristic portrait retouching: skin classification, landmark estimation,
//! liquify reshaping and edge-aware skin blending. Used by the desktop editor
//! and the diagnostic harness.

pub mod beauty;
pub mod color;
pub mod error;
pub mod face;
pub mod filter;
pub mod image_io;
pub mod liquify;
pub mod pipeline;

pub use beauty::BeautyConfig;
pub use error::{BeautyError, Result};
pub use pipeline::{BeautyOutput, CancelToken, ProcessOptions, apply_beauty, apply_beauty_raw, process};
