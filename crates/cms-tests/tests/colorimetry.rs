//! Colorimetry: PCS conversions, absolute intent and gamut tags

use cms_tests::accuracy::delta_e_2000 as palette_de2000;
use cms_tests::fixtures::{SRGB_D50_COLORANTS, matrix_display_profile, perceptual_only_output_profile};
use cms_tests::samples::{random_lab, random_rgb};
use oxicc_core::color::{D50, D65, Lab, Xyz, delta_e_2000};
use oxicc_core::icc::IccProfile;
use oxicc_core::icc::tags::{Lut, LutPrecision, XyzArray};
use oxicc_core::icc::XyzNumber;
use oxicc_core::lu::{LuFunction, LuIntent, LuOrder};
use oxicc_core::{ColorSpace, TagSignature};
use palette::white_point::D50 as PaletteD50;
use palette::{IntoColor, Lab as PaletteLab, Xyz as PaletteXyz};

#[test]
fn test_lab_matches_palette() {
    let mut compared = 0;
    for rgb in random_rgb(3, 300) {
        // Any XYZ inside the D50 cube.
        let xyz = Xyz::new(rgb[0] * 0.9642, rgb[1], rgb[2] * 0.8249);
        let ours = Lab::from_xyz(xyz);
        // palette clamps a and b to +-127; ours keeps the unbounded value.
        if ours.a.abs() >= 127.0 || ours.b.abs() >= 127.0 {
            continue;
        }
        compared += 1;
        let theirs: PaletteLab<PaletteD50, f64> =
            PaletteXyz::<PaletteD50, f64>::new(xyz.x, xyz.y, xyz.z).into_color();
        let de = palette_de2000(ours.to_array(), [theirs.l, theirs.a, theirs.b]);
        assert!(de < 0.1, "{xyz:?}: deltaE {de}");
    }
    assert!(compared >= 50, "only {compared} in-gamut samples");
}

#[test]
fn test_de2000_matches_palette() {
    let a = random_lab(10, 200);
    let b = random_lab(11, 200);
    for (x, y) in a.iter().zip(&b) {
        let ours = delta_e_2000(Lab::from_array(*x), Lab::from_array(*y));
        let theirs = palette_de2000(*x, *y);
        assert!((ours - theirs).abs() < 1e-3, "{x:?} {y:?}: {ours} vs {theirs}");
    }
}

#[test]
fn test_absolute_white_after_reload() {
    let bytes = matrix_display_profile(2.2, SRGB_D50_COLORANTS)
        .to_bytes()
        .expect("write");
    let mut profile = IccProfile::from_bytes(&bytes).expect("read");
    let media = profile.media_white().expect("media white");
    assert!(media.approx_eq(&D65.xyz, 2e-3), "{media:?}");

    let abs = profile
        .get_luobj(
            LuFunction::Forward,
            LuIntent::AbsoluteColorimetric,
            None,
            LuOrder::Normal,
        )
        .expect("absolute");
    let rel = profile
        .get_luobj(
            LuFunction::Forward,
            LuIntent::RelativeColorimetric,
            None,
            LuOrder::Normal,
        )
        .expect("relative");

    let mut white = [0.0; 3];
    abs.lookup(&[1.0, 1.0, 1.0], &mut white).expect("lookup");
    assert!(Xyz::from_array(white).approx_eq(&D65.xyz, 3e-3), "{white:?}");
    rel.lookup(&[1.0, 1.0, 1.0], &mut white).expect("lookup");
    assert!(Xyz::from_array(white).approx_eq(&D50.xyz, 1e-3), "{white:?}");

    // Absolute backward undoes absolute forward.
    let back = profile
        .get_luobj(
            LuFunction::Backward,
            LuIntent::AbsoluteColorimetric,
            None,
            LuOrder::Normal,
        )
        .expect("absolute backward");
    let mut xyz = [0.0; 3];
    let mut rgb = [0.0; 3];
    abs.lookup(&[0.3, 0.6, 0.2], &mut xyz).expect("lookup");
    back.lookup(&xyz, &mut rgb).expect("lookup");
    for (v, want) in rgb.iter().zip([0.3, 0.6, 0.2]) {
        assert!((v - want).abs() < 1e-3, "{rgb:?}");
    }
}

#[test]
fn test_black_point_reported_relative() {
    let mut profile = matrix_display_profile(2.2, SRGB_D50_COLORANTS);
    profile
        .add_tag_value(
            TagSignature::MEDIA_BLACK,
            XyzArray::single(XyzNumber::new(0.01, 0.01, 0.01)),
        )
        .expect("add bkpt");
    let bytes = profile.to_bytes().expect("write");
    let mut profile = IccProfile::from_bytes(&bytes).expect("read");

    let abs = profile
        .get_luobj(LuFunction::Forward, LuIntent::AbsoluteColorimetric, None, LuOrder::Normal)
        .expect("absolute");
    let (white, black) = abs.white_black();
    assert!(white.approx_eq(&D65.xyz, 2e-3));
    assert!((black.y - 0.01).abs() < 1e-4);

    let rel = profile
        .get_luobj(LuFunction::Forward, LuIntent::Perceptual, None, LuOrder::Normal)
        .expect("perceptual");
    let (white, black) = rel.white_black();
    assert_eq!(white, D50.xyz);
    assert!(black.y > 0.0 && black.y < 0.02, "{black:?}");
}

/// Gamut Lut flagging everything with L* above 50.
fn gamut_lut() -> Lut {
    let points = 3;
    let mut lut = Lut::with_dims(LutPrecision::Sixteen, 3, 1, points, 2, 2).expect("dims");
    for ch in 0..3 {
        lut.input_curve_mut(ch).copy_from_slice(&[0.0, 1.0]);
    }
    lut.output_curve_mut(0).copy_from_slice(&[0.0, 1.0]);
    for idx in 0..lut.clut_vertices() {
        // L is the slowest-varying axis.
        let l = idx / (points * points);
        lut.clut_table[idx] = if l == points - 1 { 1.0 } else { 0.0 };
    }
    lut
}

#[test]
fn test_gamut_tag_single_output() {
    let mut profile = perceptual_only_output_profile();
    profile
        .add_tag_value(TagSignature::GAMUT, gamut_lut())
        .expect("add gamt");
    let bytes = profile.to_bytes().expect("write");
    let mut profile = IccProfile::from_bytes(&bytes).expect("read");

    let lu = profile
        .get_luobj(LuFunction::Gamut, LuIntent::Default, None, LuOrder::Normal)
        .expect("gamut");
    assert_eq!(lu.input_channels(), 3);
    assert_eq!(lu.output_channels(), 1);
    assert_eq!(lu.spaces().input, ColorSpace::Lab);

    let mut out = [0.0];
    lu.lookup(&[20.0, 0.0, 0.0], &mut out).expect("dark");
    assert!(out[0].abs() < 1e-6, "{out:?}");
    lu.lookup(&[100.0, 0.0, 0.0], &mut out).expect("white");
    assert!(out[0] > 0.99, "{out:?}");
}
