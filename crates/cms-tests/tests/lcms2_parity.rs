//! Parity against lcms2
//!
//! lcms2's built-in sRGB profile is serialized, parsed by oxicc and
//! evaluated through Lu objects. The same bytes go through lcms2's float
//! pipeline for comparison.
//!
//! Absolute colorimetric is not compared: lcms2 takes the stored `wtpt`
//! of a V4 display profile as its media white, while oxicc undoes the
//! `chad` adaptation to recover the real one.

use cms_tests::accuracy::{compare_lab, max_abs_diff};
use cms_tests::fixtures::{SRGB_D50_COLORANTS, lcms2_srgb_bytes, matrix_display_profile};
use cms_tests::reference::{lcms2_lab_to_rgb, lcms2_rgb_to_lab, lcms2_rgb_to_xyz};
use cms_tests::samples::{cube_corners, gray_ramp, random_rgb};
use lcms2::Intent;
use oxicc_core::icc::IccProfile;
use oxicc_core::lu::{LuFunction, LuIntent, LuObject, LuOrder};
use oxicc_core::ColorSpace;

const XYZ_TOLERANCE: f64 = 2e-3;
const DELTA_E_TOLERANCE: f64 = 0.5;

fn inputs() -> Vec<[f64; 3]> {
    let mut v = random_rgb(42, 256);
    v.extend(gray_ramp(17));
    v.extend(cube_corners());
    v
}

fn eval(lu: &LuObject, values: &[[f64; 3]]) -> Vec<[f64; 3]> {
    values
        .iter()
        .map(|v| {
            let mut out = [0.0; 3];
            lu.lookup(v, &mut out).expect("lookup");
            out
        })
        .collect()
}

fn lu(icc: &[u8], function: LuFunction, pcs: Option<ColorSpace>) -> LuObject {
    IccProfile::from_bytes(icc)
        .expect("oxicc parse")
        .get_luobj(function, LuIntent::RelativeColorimetric, pcs, LuOrder::Normal)
        .expect("Lu object")
}

#[test]
fn test_srgb_forward_xyz() {
    let icc = lcms2_srgb_bytes();
    let rgb = inputs();
    let reference = lcms2_rgb_to_xyz(&icc, &rgb, Intent::RelativeColorimetric).expect("lcms2");
    let ours = eval(&lu(&icc, LuFunction::Forward, None), &rgb);

    let diff = max_abs_diff(&reference, &ours);
    assert!(diff < XYZ_TOLERANCE, "max XYZ difference {diff:.6}");
}

#[test]
fn test_srgb_forward_lab() {
    let icc = lcms2_srgb_bytes();
    let rgb = inputs();
    let reference = lcms2_rgb_to_lab(&icc, &rgb, Intent::RelativeColorimetric).expect("lcms2");
    let ours = eval(&lu(&icc, LuFunction::Forward, Some(ColorSpace::Lab)), &rgb);

    let stats = compare_lab(&reference, &ours);
    assert!(
        stats.max < DELTA_E_TOLERANCE,
        "deltaE mean={:.4}, p95={:.4}, max={:.4}",
        stats.mean,
        stats.p95,
        stats.max
    );
}

#[test]
fn test_srgb_backward_from_lab() {
    let icc = lcms2_srgb_bytes();
    // In-gamut Lab values: the forward transform of device colors.
    let lab = lcms2_rgb_to_lab(&icc, &random_rgb(7, 128), Intent::RelativeColorimetric)
        .expect("lcms2");
    let reference = lcms2_lab_to_rgb(&icc, &lab, Intent::RelativeColorimetric).expect("lcms2");
    let ours = eval(&lu(&icc, LuFunction::Backward, Some(ColorSpace::Lab)), &lab);

    let diff = max_abs_diff(&reference, &ours);
    assert!(diff < 5e-3, "max RGB difference {diff:.6}");
}

#[test]
fn test_written_profile_in_lcms2() {
    let mut profile = matrix_display_profile(2.2, SRGB_D50_COLORANTS);
    let icc = profile.to_bytes().expect("write");
    let rgb = inputs();

    let reference = lcms2_rgb_to_lab(&icc, &rgb, Intent::Perceptual).expect("lcms2 accepts oxicc output");
    let ours = eval(
        &IccProfile::from_bytes(&icc)
            .expect("parse")
            .get_luobj(
                LuFunction::Forward,
                LuIntent::Perceptual,
                Some(ColorSpace::Lab),
                LuOrder::Normal,
            )
            .expect("Lu object"),
        &rgb,
    );

    let stats = compare_lab(&reference, &ours);
    assert!(stats.is_excellent(), "deltaE max={:.4}", stats.max);
}

#[test]
fn test_batch_matches_lcms2() {
    let icc = lcms2_srgb_bytes();
    let rgb = random_rgb(99, 1000);
    let reference = lcms2_rgb_to_xyz(&icc, &rgb, Intent::RelativeColorimetric).expect("lcms2");

    let lu = lu(&icc, LuFunction::Forward, None);
    let flat: Vec<f64> = rgb.iter().flatten().copied().collect();
    let mut out = vec![0.0; flat.len()];
    lu.lookup_batch(&flat, &mut out).expect("batch");
    let ours: Vec<[f64; 3]> = out.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

    let diff = max_abs_diff(&reference, &ours);
    assert!(diff < XYZ_TOLERANCE, "max XYZ difference {diff:.6}");
}
