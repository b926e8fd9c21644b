use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use web_time::Instant;

use crate::beauty::blemish::{BlemishLayers, heal_spot};
use crate::beauty::blend::{RetouchLayers, retouch_skin};
use crate::beauty::config::BeautyConfig;
use crate::color::SkinMask;
use crate::error::{BeautyError, Result, validate_dimensions};
use crate::face::{LandmarkParams, Landmarks, detect_landmarks};
use crate::filter::{EdgeMap, gaussian_blur};
use crate::image_io::rgba_from_raw;
use crate::liquify::{WarpPoint, apply_liquify, build_warp_field};

/// Skin probability above which a pixel contributes to the mean skin tone.
const TONE_SAMPLE_THRESHOLD: f32 = 0.5;

// Distinct streams derived from the base seed.
const BLEMISH_SALT: u64 = 0x5DEE_CE66_D1CE_4E5B;
const MANUAL_SALT: u64 = 0xA076_1D64_78BD_642F;

/// Cooperative cancellation flag shared between a caller and a running call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Knobs of a single call that are not part of the user-facing config.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub landmark_params: LandmarkParams,
    /// Fixed seed for all noise. `None` draws a fresh one per call.
    pub seed: Option<u64>,
    pub cancel: Option<CancelToken>,
}

impl ProcessOptions {
    fn check(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(BeautyError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Result of [`process`]: the edited image plus what was detected and warped.
#[derive(Debug, Clone)]
pub struct BeautyOutput {
    pub image: RgbaImage,
    pub landmarks: Option<Landmarks>,
    /// Warp field applied to the image, empty when no reshaping happened.
    pub warps: Vec<WarpPoint>,
}

/// Apply `config` to `src` with default options. The input is never modified.
pub fn apply_beauty(src: &RgbaImage, config: &BeautyConfig) -> Result<RgbaImage> {
    Ok(process(src, config, &ProcessOptions::default())?.image)
}

/// Byte-buffer form of [`apply_beauty`] for interleaved RGBA data.
pub fn apply_beauty_raw(width: u32, height: u32, data: &[u8], config: &BeautyConfig) -> Result<Vec<u8>> {
    let src = rgba_from_raw(width, height, data)?;
    Ok(apply_beauty(&src, config)?.into_raw())
}

/// Run the full beauty pipeline.
///
/// Stages, in order: validate, detect landmarks on the input, warp the face
/// shape, classify skin on the warped image, build blurred layers, blend skin
/// pixels, heal manual points. Cancellation is checked before each stage
/// starts; once the last stage has run the finished image is returned even if
/// the token was cancelled meanwhile.
pub fn process(src: &RgbaImage, config: &BeautyConfig, options: &ProcessOptions) -> Result<BeautyOutput> {
    let (w, h) = src.dimensions();
    validate_dimensions(w, h, src.as_raw().len())?;
    options.check()?;

    let total = Instant::now();
    let mut t = Instant::now();

    let landmarks = detect_landmarks(src, &options.landmark_params);
    match &landmarks {
        Some(lm) => log::debug!(
            "landmarks: face {:.0}x{:.0} at ({:.0}, {:.0}) in {:?}",
            lm.face.w,
            lm.face.h,
            lm.face.x,
            lm.face.y,
            t.elapsed()
        ),
        None => log::debug!("landmarks: no face region found, shape edits skipped"),
    }

    if config.is_identity() {
        return Ok(BeautyOutput {
            image: src.clone(),
            landmarks,
            warps: Vec::new(),
        });
    }
    options.check()?;

    t = Instant::now();
    let mut warps = Vec::new();
    let mut image = match &landmarks {
        Some(lm) if !config.shape.is_zero() => {
            warps = build_warp_field(lm, &config.shape);
            let warped = apply_liquify(src, &lm.face, &warps);
            log::debug!("liquify: {} points in {:?}", warps.len(), t.elapsed());
            warped
        }
        _ => src.clone(),
    };

    let base_seed = options.seed.unwrap_or_else(|| rand::rng().random());
    let values = &config.skin_values;
    let needs_retouch = values.smooth > 0.0
        || values.whiten > 0.0
        || values.even > 0.0
        || values.dewy_glow > 0.0
        || values.texture > 0.0
        || config.blemish.auto;

    if needs_retouch {
        options.check()?;
        t = Instant::now();
        let mask = SkinMask::from_image(&image);
        let edges = config.blemish.auto.then(|| EdgeMap::from_image(&image));
        let tone_target = mask.mean_chroma(&image, TONE_SAMPLE_THRESHOLD);
        log::debug!("classify: skin mask and edges in {:?}", t.elapsed());
        options.check()?;

        t = Instant::now();
        let (smooth, blemish) = rayon::join(
            || (values.smooth > 0.0).then(|| gaussian_blur(&image, config.skin_mode.smooth_radius())),
            || {
                config.blemish.auto.then(|| {
                    let mut rng = StdRng::seed_from_u64(base_seed ^ BLEMISH_SALT);
                    BlemishLayers::build(&image, &mut rng)
                })
            },
        );
        log::debug!("blur: layers built in {:?}", t.elapsed());
        options.check()?;

        t = Instant::now();
        let layers = RetouchLayers {
            mask: &mask,
            smooth: smooth.as_ref(),
            blemish: blemish.as_ref().zip(edges.as_ref()),
            tone_target,
        };
        retouch_skin(&mut image, &layers, config, base_seed);
        log::debug!("blend: skin retouch in {:?}", t.elapsed());
    }

    if !config.blemish.manual_points.is_empty() {
        options.check()?;
        t = Instant::now();
        let mut rng = StdRng::seed_from_u64(base_seed ^ MANUAL_SALT);
        for p in &config.blemish.manual_points {
            let cx = p.x / 100.0 * w as f32;
            let cy = p.y / 100.0 * h as f32;
            heal_spot(&mut image, cx, cy, &mut rng);
        }
        log::debug!(
            "heal: {} manual points in {:?}",
            config.blemish.manual_points.len(),
            t.elapsed()
        );
    }

    log::debug!("beauty pipeline {w}x{h} finished in {:?}", total.elapsed());
    Ok(BeautyOutput {
        image,
        landmarks,
        warps,
    })
}
