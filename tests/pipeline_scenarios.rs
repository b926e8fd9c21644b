use face_beauty::beauty::blemish::manual_heal_radius;
use face_beauty::beauty::{BeautyConfig, BlemishPoint, SkinMode};
use face_beauty::pipeline::{CancelToken, ProcessOptions, apply_beauty, apply_beauty_raw, process};
use face_beauty::BeautyError;
use image::{Rgba, RgbaImage};

const SKIN: [u8; 3] = [224, 172, 138];
const BACKGROUND: Rgba<u8> = Rgba([60, 90, 140, 255]);

fn jitter(x: u32, y: u32, amp: i32) -> i32 {
    let h = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(2_246_822_519);
    let h = (h ^ (h >> 15)).wrapping_mul(3_266_489_917);
    ((h >> 8) % (2 * amp as u32 + 1)) as i32 - amp
}

/// Normalized elliptical distance from the image center; the face is `<= 1`.
fn ellipse_dist(x: u32, y: u32, w: u32, h: u32) -> f32 {
    let nx = (x as f32 - w as f32 / 2.0) / (w as f32 * 0.3);
    let ny = (y as f32 - h as f32 / 2.0) / (h as f32 * 0.38);
    nx * nx + ny * ny
}

fn noisy_face(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        if ellipse_dist(x, y, w, h) > 1.0 {
            return BACKGROUND;
        }
        let n = jitter(x, y, 5);
        let c = |i: usize| (SKIN[i] as i32 + n) as u8;
        Rgba([c(0), c(1), c(2), 255])
    })
}

fn interior_red_variance(img: &RgbaImage) -> f32 {
    let (w, h) = img.dimensions();
    let values: Vec<f32> = img
        .enumerate_pixels()
        .filter(|(x, y, _)| ellipse_dist(*x, *y, w, h) < 0.7)
        .map(|(_, _, p)| p[0] as f32)
        .collect();
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n
}

fn seeded() -> ProcessOptions {
    ProcessOptions {
        seed: Some(2024),
        ..ProcessOptions::default()
    }
}

#[test]
fn identity_config_returns_input() {
    let src = noisy_face(120, 140);
    let out = process(&src, &BeautyConfig::default(), &seeded()).unwrap();
    assert_eq!(out.image, src);
    assert!(out.warps.is_empty());
}

#[test]
fn image_without_skin_is_returned_intact() {
    let src = RgbaImage::from_fn(96, 64, |x, y| {
        let n = jitter(x, y, 8);
        Rgba([(60 + n) as u8, (90 + n) as u8, (140 + n) as u8, 255])
    });
    let mut config = BeautyConfig::default();
    config.skin_values.smooth = 60.0;
    config.skin_values.whiten = 40.0;
    config.shape.slim = 50.0;
    let out = process(&src, &config, &seeded()).unwrap();
    assert!(out.landmarks.is_none());
    assert!(out.warps.is_empty());
    assert_eq!(out.image.dimensions(), src.dimensions());
    assert_eq!(out.image, src);
}

#[test]
fn smoothing_a_skin_ellipse() {
    let src = noisy_face(256, 256);
    let mut config = BeautyConfig::default();
    config.skin_mode = SkinMode::Standard;
    config.skin_values.smooth = 50.0;

    let out = process(&src, &config, &seeded()).unwrap();
    assert!(out.landmarks.is_some());
    assert_eq!(out.image.dimensions(), (256, 256));
    assert!(interior_red_variance(&out.image) < interior_red_variance(&src));

    for (x, y, px) in out.image.enumerate_pixels() {
        if ellipse_dist(x, y, 256, 256) > 1.0 {
            assert_eq!(*px, BACKGROUND, "background changed at ({x}, {y})");
        }
    }
}

#[test]
fn manual_point_heals_only_its_neighborhood() {
    let base = Rgba([200, 150, 120, 255]);
    let src = RgbaImage::from_pixel(300, 300, base);
    let mut config = BeautyConfig::default();
    config.blemish.manual_points.push(BlemishPoint::new(50.0, 50.0));

    let out = apply_beauty(&src, &config).unwrap();
    let radius = manual_heal_radius(300, 300);
    for (x, y, px) in out.enumerate_pixels() {
        let d = ((x as f32 - 150.0).powi(2) + (y as f32 - 150.0).powi(2)).sqrt();
        if d >= radius {
            assert_eq!(*px, base, "pixel outside heal radius changed at ({x}, {y})");
        } else {
            for c in 0..3 {
                assert!((px[c] as i32 - base[c] as i32).abs() <= 2, "{px:?} at ({x}, {y})");
            }
            assert_eq!(px[3], 255);
        }
    }
}

#[test]
fn raw_buffers_are_validated_and_copied() {
    let config = BeautyConfig::default();
    let err = apply_beauty_raw(10, 10, &[0u8; 399], &config).unwrap_err();
    assert!(matches!(err, BeautyError::InvalidBuffer { expected: 400, len: 399, .. }));
    assert!(matches!(
        apply_beauty_raw(0, 0, &[], &config),
        Err(BeautyError::InvalidBuffer { .. })
    ));

    let src = noisy_face(40, 40);
    let bytes = src.as_raw().clone();
    let mut smooth = BeautyConfig::default();
    smooth.skin_values.smooth = 100.0;
    let out = apply_beauty_raw(40, 40, &bytes, &smooth).unwrap();
    assert_eq!(out.len(), bytes.len());
    assert_eq!(bytes, *src.as_raw());
}

#[test]
fn cancelled_call_reports_cancellation() {
    let token = CancelToken::new();
    token.cancel();
    let options = ProcessOptions {
        cancel: Some(token),
        ..ProcessOptions::default()
    };
    let mut config = BeautyConfig::default();
    config.skin_values.even = 30.0;
    let result = process(&noisy_face(64, 64), &config, &options);
    assert!(matches!(result, Err(BeautyError::Cancelled)));
}

#[test]
fn reshape_stays_near_the_face() {
    let src = noisy_face(256, 256);
    let mut config = BeautyConfig::default();
    config.shape.slim = 80.0;
    config.shape.chin_shrink = 40.0;

    let out = process(&src, &config, &seeded()).unwrap();
    let lm = out.landmarks.expect("face found");
    assert!(!out.warps.is_empty());
    assert_ne!(out.image, src);

    // nothing moves outside the union of warp radii
    for (x, y, px) in out.image.enumerate_pixels() {
        let (fx, fy) = (x as f32, y as f32);
        let touched = out.warps.iter().any(|w| {
            (fx - w.center.x).powi(2) + (fy - w.center.y).powi(2) < w.radius * w.radius
        });
        if !touched {
            assert_eq!(px, src.get_pixel(x, y), "pixel at ({x}, {y}) moved");
        }
    }
    assert!(lm.face.w > 100.0);
}

#[test]
fn editor_payload_runs_end_to_end() {
    let json = r#"{
        "skinMode": "strong",
        "skinValues": { "smooth": 70, "whiten": 30, "even": 40, "korean": 25, "texture": 10 },
        "acneMode": { "auto": true, "manualPoints": [{ "x": 45, "y": 55 }] },
        "faceValues": { "slim": 15, "vline": 15, "chinShrink": 0, "forehead": 10,
                        "jaw": 5, "noseSlim": 20, "noseBridge": 10 }
    }"#;
    let config = BeautyConfig::from_json(json).unwrap();
    let src = noisy_face(200, 240);
    let a = process(&src, &config, &seeded()).unwrap();
    let b = process(&src, &config, &seeded()).unwrap();
    assert_eq!(a.image.dimensions(), src.dimensions());
    assert_eq!(a.image, b.image);

    for (px, orig) in a.image.pixels().zip(src.pixels()) {
        assert_eq!(px[3], orig[3]);
    }
}

#[test]
fn non_finite_manual_point_leaves_image_untouched() {
    let src = RgbaImage::from_pixel(64, 64, Rgba([100, 150, 200, 255]));
    let mut config = BeautyConfig::default();
    config.blemish.manual_points.push(BlemishPoint::new(f32::NAN, 10.0));
    config.blemish.manual_points.push(BlemishPoint::new(30.0, f32::INFINITY));
    let out = process(&src, &config, &seeded()).unwrap();
    assert_eq!(out.image, src);
}

#[test]
fn auto_blemish_fades_a_spot_on_plain_skin() {
    let skin = Rgba([190, 160, 145, 255]);
    let spot = Rgba([160, 128, 118, 255]);
    let src = RgbaImage::from_fn(96, 96, |x, y| {
        let d2 = (x as i32 - 48).pow(2) + (y as i32 - 48).pow(2);
        if d2 <= 64 { spot } else { skin }
    });
    let mut config = BeautyConfig::default();
    config.blemish.auto = true;

    let out = process(&src, &config, &seeded()).unwrap();
    assert!(out.warps.is_empty());
    let centre = out.image.get_pixel(48, 48);
    assert!(centre[0] >= spot[0] + 4, "spot not healed: {centre:?}");
    assert!(centre[1] >= spot[1] + 4, "spot not healed: {centre:?}");
    assert_eq!(out.image.get_pixel(4, 4), src.get_pixel(4, 4));
}
