//! Intent to tag resolution for Lu objects
//!
//! Intents without a dedicated Lut tag fall back to the default
//! (perceptual) tag rather than failing.

use cms_tests::fixtures::{identity_lut, perceptual_only_output_profile};
use oxicc_core::icc::tags::LutPrecision;
use oxicc_core::icc::{IccProfile, RenderingIntent};
use oxicc_core::lu::{LuAlgorithm, LuFunction, LuIntent, LuOrder};
use oxicc_core::{IccError, TagSignature};

fn reloaded(mut profile: IccProfile) -> IccProfile {
    let bytes = profile.to_bytes().expect("write");
    IccProfile::from_bytes(&bytes).expect("read")
}

#[test]
fn test_relative_colorimetric_uses_perceptual_tables() {
    let mut profile = reloaded(perceptual_only_output_profile());
    assert!(!profile.has_tag(TagSignature::B2A1));

    let lu = profile
        .get_luobj(
            LuFunction::Backward,
            RenderingIntent::RelativeColorimetric.into(),
            None,
            LuOrder::Normal,
        )
        .expect("fallback to B2A0");
    assert_eq!(lu.algorithm(), LuAlgorithm::Lut);
    assert_eq!(lu.tags(), &[TagSignature::B2A0]);
    assert_eq!(lu.intent(), LuIntent::RelativeColorimetric);
}

#[test]
fn test_every_intent_resolves_both_directions() {
    let mut profile = reloaded(perceptual_only_output_profile());
    let intents = [
        LuIntent::Default,
        LuIntent::Perceptual,
        LuIntent::RelativeColorimetric,
        LuIntent::Saturation,
        LuIntent::AbsoluteColorimetric,
    ];
    for intent in intents {
        let fwd = profile
            .get_luobj(LuFunction::Forward, intent, None, LuOrder::Normal)
            .unwrap_or_else(|e| panic!("forward {intent:?}: {e}"));
        assert_eq!(fwd.tags(), &[TagSignature::A2B0]);
        let bwd = profile
            .get_luobj(LuFunction::Backward, intent, None, LuOrder::Normal)
            .unwrap_or_else(|e| panic!("backward {intent:?}: {e}"));
        assert_eq!(bwd.tags(), &[TagSignature::B2A0]);
    }
}

#[test]
fn test_dedicated_tag_preferred_over_fallback() {
    let mut profile = perceptual_only_output_profile();
    profile
        .add_tag_value(
            TagSignature::A2B1,
            identity_lut(LutPrecision::Sixteen, 5, 0.5),
        )
        .expect("add A2B1");
    let mut profile = reloaded(profile);

    let rel = profile
        .get_luobj(
            LuFunction::Forward,
            LuIntent::RelativeColorimetric,
            None,
            LuOrder::Normal,
        )
        .expect("A2B1");
    assert_eq!(rel.tags(), &[TagSignature::A2B1]);

    let sat = profile
        .get_luobj(LuFunction::Forward, LuIntent::Saturation, None, LuOrder::Normal)
        .expect("saturation falls back");
    assert_eq!(sat.tags(), &[TagSignature::A2B0]);

    // The colorimetric table halves the first CLUT output.
    let mut a = [0.0; 3];
    let mut b = [0.0; 3];
    rel.lookup(&[1.0, 0.5, 0.5], &mut a).expect("lookup");
    sat.lookup(&[1.0, 0.5, 0.5], &mut b).expect("lookup");
    assert!(a[0] < b[0] - 10.0, "{a:?} vs {b:?}");
}

#[test]
fn test_unresolvable_requests() {
    let mut profile = reloaded(perceptual_only_output_profile());
    let err = profile
        .get_luobj(LuFunction::Preview, LuIntent::Perceptual, None, LuOrder::Normal)
        .expect_err("no preview tags");
    assert_eq!(err, IccError::MissingTag(TagSignature::PREVIEW0.0));

    let err = profile
        .get_luobj(
            LuFunction::Forward,
            LuIntent::Perceptual,
            Some(oxicc_core::ColorSpace::Rgb),
            LuOrder::Normal,
        )
        .expect_err("RGB is not a PCS");
    assert!(matches!(err, IccError::InvalidColorSpace(_)));
}
