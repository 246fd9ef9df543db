//! Profiles built in memory for the integration tests

use oxicc_core::color::{D50, D65};
use oxicc_core::icc::tags::{Curve, Lut, LutPrecision, Text, TextDescription, XyzArray};
use oxicc_core::icc::{IccProfile, ProfileClass, XyzNumber};
use oxicc_core::{ColorSpace, TagSignature};

/// sRGB primaries adapted to D50, as stored in common display profiles.
pub const SRGB_D50_COLORANTS: [[f64; 3]; 3] = [
    [0.4361, 0.2225, 0.0139],
    [0.3851, 0.7169, 0.0971],
    [0.1431, 0.0606, 0.7141],
];

/// RGB display profile with gamma curves, the given colorants and a D65
/// media white.
pub fn matrix_display_profile(gamma: f64, colorants: [[f64; 3]; 3]) -> IccProfile {
    let mut p = IccProfile::new(ProfileClass::Display, ColorSpace::Rgb, ColorSpace::Xyz);
    let sigs = [
        TagSignature::RED_COLORANT,
        TagSignature::GREEN_COLORANT,
        TagSignature::BLUE_COLORANT,
    ];
    for (sig, xyz) in sigs.into_iter().zip(colorants) {
        p.add_tag_value(sig, XyzArray::single(XyzNumber::from_array(xyz)))
            .expect("add colorant");
    }
    p.add_tag_value(TagSignature::RED_TRC, Curve::gamma(gamma))
        .expect("add rTRC");
    // Green and blue share the red curve.
    p.link_tag(TagSignature::GREEN_TRC, TagSignature::RED_TRC)
        .expect("link gTRC");
    p.link_tag(TagSignature::BLUE_TRC, TagSignature::RED_TRC)
        .expect("link bTRC");
    p.add_tag_value(TagSignature::DESC, TextDescription::new("matrix display"))
        .expect("add desc");
    p.add_tag_value(TagSignature::COPYRIGHT, Text::new("no copyright"))
        .expect("add cprt");
    p.set_media_white(D65.xyz);
    p
}

/// Lut whose CLUT maps each input channel straight through (3 in, 3 out),
/// scaled by `gain` on the first output.
pub fn identity_lut(precision: LutPrecision, points: usize, gain: f64) -> Lut {
    let (in_ent, out_ent) = match precision {
        LutPrecision::Eight => (256, 256),
        LutPrecision::Sixteen => (2, 2),
    };
    let mut lut = Lut::with_dims(precision, 3, 3, points, in_ent, out_ent).expect("lut dims");
    for ch in 0..3 {
        let n = lut.input_curve_mut(ch).len();
        for (i, v) in lut.input_curve_mut(ch).iter_mut().enumerate() {
            *v = i as f64 / (n - 1) as f64;
        }
        let n = lut.output_curve_mut(ch).len();
        for (i, v) in lut.output_curve_mut(ch).iter_mut().enumerate() {
            *v = i as f64 / (n - 1) as f64;
        }
    }
    let step = 1.0 / (points - 1) as f64;
    for idx in 0..lut.clut_vertices() {
        for ch in 0..3 {
            let coord = (idx / points.pow(2 - ch as u32)) % points;
            let gain = if ch == 0 { gain } else { 1.0 };
            lut.clut_table[idx * 3 + ch] = coord as f64 * step * gain;
        }
    }
    lut
}

/// CMY output profile with Lab PCS carrying only the perceptual
/// `A2B0`/`B2A0` pair.
pub fn perceptual_only_output_profile() -> IccProfile {
    let mut p = IccProfile::new(ProfileClass::Output, ColorSpace::Cmy, ColorSpace::Lab);
    p.add_tag_value(
        TagSignature::A2B0,
        identity_lut(LutPrecision::Sixteen, 5, 1.0),
    )
    .expect("add A2B0");
    p.add_tag_value(
        TagSignature::B2A0,
        identity_lut(LutPrecision::Sixteen, 5, 1.0),
    )
    .expect("add B2A0");
    p.add_tag_value(TagSignature::DESC, TextDescription::new("cmy output"))
        .expect("add desc");
    p.add_tag_value(TagSignature::COPYRIGHT, Text::new("no copyright"))
        .expect("add cprt");
    p.set_media_white(D50.xyz);
    p
}

/// lcms2's built-in sRGB profile as ICC bytes.
pub fn lcms2_srgb_bytes() -> Vec<u8> {
    lcms2::Profile::new_srgb()
        .icc()
        .expect("lcms2 sRGB serialization")
}
