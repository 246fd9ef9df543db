//! Parity against moxcms's profile parser

use cms_tests::fixtures::{
    SRGB_D50_COLORANTS, lcms2_srgb_bytes, matrix_display_profile, perceptual_only_output_profile,
};
use cms_tests::reference::{moxcms_accepts, moxcms_colorants};
use oxicc_core::icc::IccProfile;
use oxicc_core::TagSignature;

fn oxicc_colorants(icc: &[u8]) -> [[f64; 3]; 3] {
    let mut profile = IccProfile::from_bytes(icc).expect("oxicc parse");
    let mut out = [[0.0; 3]; 3];
    let sigs = [
        TagSignature::RED_COLORANT,
        TagSignature::GREEN_COLORANT,
        TagSignature::BLUE_COLORANT,
    ];
    for (col, sig) in out.iter_mut().zip(sigs) {
        let handle = profile.read_tag(sig).expect("colorant");
        *col = handle.borrow().xyz_value().expect("XYZ value").to_array();
    }
    out
}

fn assert_close(a: [[f64; 3]; 3], b: [[f64; 3]; 3], eps: f64) {
    for (ra, rb) in a.iter().zip(&b) {
        for (x, y) in ra.iter().zip(rb) {
            assert!((x - y).abs() < eps, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn test_lcms2_srgb_colorants() {
    let icc = lcms2_srgb_bytes();
    let theirs = moxcms_colorants(&icc).expect("moxcms parse");
    assert_close(oxicc_colorants(&icc), theirs, 1e-6);
}

#[test]
fn test_written_profile_colorants() {
    let icc = matrix_display_profile(2.2, SRGB_D50_COLORANTS)
        .to_bytes()
        .expect("write");
    let theirs = moxcms_colorants(&icc).expect("moxcms accepts oxicc output");
    let ours = oxicc_colorants(&icc);
    assert_close(ours, theirs, 1e-6);
    // Stored values are the inputs quantized to s15Fixed16.
    assert_close(ours, SRGB_D50_COLORANTS, 1e-4);
}

#[test]
fn test_written_lut_profile_accepted() {
    let icc = perceptual_only_output_profile()
        .to_bytes()
        .expect("write");
    assert!(moxcms_accepts(&icc));
}
