//! Lut16 construction, serialization and evaluation
//!
//! A 3-in/3-out identity Lut16 with a 2-point grid must survive a write and
//! read with its dimensions intact and its mapping within 16-bit
//! quantization.

use cms_tests::fixtures::identity_lut;
use cms_tests::samples::random_rgb;
use oxicc_core::icc::tags::{Lut, LutPrecision};
use oxicc_core::icc::{IccProfile, ProfileClass};
use oxicc_core::lut::LutInterp;
use oxicc_core::{ColorSpace, TagSignature};

const Q16: f64 = 1.0 / 65535.0;

fn abstract_profile(lut: Lut) -> IccProfile {
    use oxicc_core::icc::tags::{Text, TextDescription};

    let mut p = IccProfile::new(ProfileClass::Abstract, ColorSpace::Lab, ColorSpace::Lab);
    p.add_tag_value(TagSignature::A2B0, lut).expect("add A2B0");
    p.add_tag_value(TagSignature::DESC, TextDescription::new("identity"))
        .expect("add desc");
    p.add_tag_value(TagSignature::COPYRIGHT, Text::new("no copyright"))
        .expect("add cprt");
    p.set_media_white(oxicc_core::color::D50.xyz);
    p
}

#[test]
fn test_identity_lut16_survives_write() {
    let mut profile = abstract_profile(identity_lut(LutPrecision::Sixteen, 2, 1.0));
    let bytes = profile.to_bytes().expect("write");

    let mut reloaded = IccProfile::from_bytes(&bytes).expect("read");
    let handle = reloaded.read_tag(TagSignature::A2B0).expect("read A2B0");
    let tag = handle.borrow();
    let lut = tag.as_lut().expect("A2B0 is a Lut");

    assert_eq!(lut.precision, LutPrecision::Sixteen);
    assert_eq!(lut.input_chan, 3);
    assert_eq!(lut.output_chan, 3);
    assert_eq!(lut.clut_points, 2);
    assert_eq!(lut.clut_vertices(), 8);

    for rgb in random_rgb(16, 200) {
        for interp in [LutInterp::Linear, LutInterp::Simplex] {
            let mut out = [0.0; 3];
            let clipped = lut.lookup(&rgb, &mut out, interp, None).expect("lookup");
            assert!(!clipped);
            for (o, i) in out.iter().zip(rgb) {
                assert!((o - i).abs() <= 2.0 * Q16, "{interp:?} {rgb:?} -> {out:?}");
            }
        }
    }
}

#[test]
fn test_lut8_quantizes_to_bytes() {
    let mut profile = abstract_profile(identity_lut(LutPrecision::Eight, 3, 1.0));
    let bytes = profile.to_bytes().expect("write");
    let mut reloaded = IccProfile::from_bytes(&bytes).expect("read");
    let handle = reloaded.read_tag(TagSignature::A2B0).expect("read A2B0");
    let tag = handle.borrow();
    let lut = tag.as_lut().expect("A2B0 is a Lut");

    assert_eq!(lut.precision, LutPrecision::Eight);
    assert_eq!(lut.clut_points, 3);
    let mut out = [0.0; 3];
    lut.lookup(&[0.25, 0.5, 0.75], &mut out, LutInterp::Linear, None)
        .expect("lookup");
    for (o, i) in out.iter().zip([0.25, 0.5, 0.75]) {
        assert!((o - i).abs() <= 2.0 / 255.0, "{out:?}");
    }
}

#[test]
fn test_inverse_tables_undo_forward_tables() {
    let mut lut = identity_lut(LutPrecision::Sixteen, 2, 1.0);
    lut.input_curve_mut(0).copy_from_slice(&[0.0, 0.8]);
    let mut fwd = [0.0; 3];
    lut.lookup_input(&[0.5, 0.5, 0.5], &mut fwd).expect("input tables");
    assert!((fwd[0] - 0.4).abs() < 1e-12);

    let mut back = [0.0; 3];
    lut.inv_lookup_input(&fwd, &mut back).expect("inverse tables");
    for v in back {
        assert!((v - 0.5).abs() < 1e-9, "{back:?}");
    }
}

#[test]
fn test_truncated_lut_rejected() {
    let mut profile = abstract_profile(identity_lut(LutPrecision::Sixteen, 2, 1.0));
    let mut bytes = profile.to_bytes().expect("write");

    // Claim a 3-point grid: the tag no longer matches its byte length.
    let count = u32::from_be_bytes(bytes[128..132].try_into().unwrap()) as usize;
    let offset = (0..count)
        .map(|i| 132 + i * 12)
        .find(|&e| bytes[e..e + 4] == *b"A2B0")
        .map(|e| u32::from_be_bytes(bytes[e + 4..e + 8].try_into().unwrap()) as usize)
        .expect("A2B0 entry");
    bytes[offset + 10] = 3;

    let mut reloaded = IccProfile::from_bytes(&bytes).expect("directory still valid");
    assert!(reloaded.read_tag(TagSignature::A2B0).is_err());
}
