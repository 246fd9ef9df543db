//! Which types each tag signature may carry, and which tags each device
//! class requires.
//!
//! See ICC.1:2001-04 Section 6.3 and ICC.1:2022 Section 8

use super::error::IccError;
use super::header::{ColorSpace, IccHeader, ProfileClass};
use super::types::{TagSignature as S, TypeSignature as T};

const LUTS: &[T] = &[T::LUT8, T::LUT16, T::LUT_A_TO_B, T::LUT_B_TO_A];
const TRC: &[T] = &[T::CURVE, T::PARA];
const XYZ: &[T] = &[T::XYZ];
const DESC: &[T] = &[T::TEXT_DESCRIPTION, T::MLUC];

/// Permitted types for `sig`, or None when any type is accepted (private
/// and unrecognized signatures).
pub fn allowed_types(sig: S) -> Option<&'static [T]> {
    let types: &'static [T] = match sig {
        S::A2B0 | S::A2B1 | S::A2B2 | S::B2A0 | S::B2A1 | S::B2A2 | S::GAMUT | S::PREVIEW0
        | S::PREVIEW1 | S::PREVIEW2 => LUTS,
        S::RED_COLORANT | S::GREEN_COLORANT | S::BLUE_COLORANT | S::MEDIA_WHITE
        | S::MEDIA_BLACK | S::LUMINANCE => XYZ,
        S::RED_TRC | S::GREEN_TRC | S::BLUE_TRC | S::GRAY_TRC => TRC,
        S::CALIBRATION_DATE_TIME => &[T::DATE_TIME],
        S::CHAR_TARGET => &[T::TEXT],
        S::CHAD | S::ABS_TO_REL => &[T::S15_FIXED16_ARRAY],
        S::COLORANT_TABLE | S::COLORANT_TABLE_OUT => &[T::COLORANT_TABLE],
        S::COPYRIGHT => &[T::TEXT, T::MLUC],
        S::CRD_INFO => &[T::CRD_INFO],
        S::DESC | S::DEVICE_MFG_DESC | S::DEVICE_MODEL_DESC | S::SCREENING_DESC
        | S::VIEW_COND_DESC => DESC,
        S::MEASUREMENT => &[T::MEASUREMENT],
        S::NAMED_COLOR => &[T::NAMED_COLOR],
        S::NAMED_COLOR2 => &[T::NAMED_COLOR2],
        S::PROFILE_SEQUENCE_DESC => &[T::PROFILE_SEQUENCE_DESC],
        S::PS2_CRD0 | S::PS2_CRD1 | S::PS2_CRD2 | S::PS2_CRD3 | S::PS2_CSA
        | S::PS2_RENDERING_INTENT => &[T::DATA],
        S::SCREENING => &[T::SCREENING],
        S::TECHNOLOGY => &[T::SIGNATURE],
        S::UCR_BG => &[T::UCR_BG],
        S::VIDEO_CARD_GAMMA => &[T::VIDEO_CARD_GAMMA],
        S::VIEW_COND => &[T::VIEWING_CONDITIONS],
        _ => return None,
    };
    Some(types)
}

pub fn is_legal(sig: S, ttype: T) -> bool {
    allowed_types(sig).is_none_or(|types| types.contains(&ttype))
}

/// `Err(IllegalTagType)` unless `ttype` is permitted for `sig`.
pub fn check_legal(sig: S, ttype: T) -> Result<(), IccError> {
    if is_legal(sig, ttype) {
        Ok(())
    } else {
        Err(IccError::IllegalTagType {
            tag: sig.0,
            type_sig: ttype.0,
        })
    }
}

/// Tags a device class requires: every tag of `always`, plus every tag
/// of at least one `any_of` set when that list is non-empty.
#[derive(Debug, Clone, Copy)]
pub struct RequiredTags {
    pub always: &'static [S],
    pub any_of: &'static [&'static [S]],
}

const COMMON: &[S] = &[S::DESC, S::COPYRIGHT, S::MEDIA_WHITE];
const RGB_MATRIX: &[S] = &[
    S::RED_COLORANT,
    S::GREEN_COLORANT,
    S::BLUE_COLORANT,
    S::RED_TRC,
    S::GREEN_TRC,
    S::BLUE_TRC,
];

const GRAY_OR_LUT: &[&[S]] = &[&[S::GRAY_TRC], &[S::A2B0]];
const MATRIX_OR_LUT: &[&[S]] = &[RGB_MATRIX, &[S::A2B0]];
const LUT_ONLY: &[&[S]] = &[&[S::A2B0]];
const GRAY_OR_BIDI: &[&[S]] = &[&[S::GRAY_TRC], &[S::A2B0, S::B2A0]];
const BIDI: &[&[S]] = &[&[S::A2B0, S::B2A0]];
const NAMED: &[&[S]] = &[&[S::NAMED_COLOR2], &[S::NAMED_COLOR]];
const LINK: &[S] = &[S::DESC, S::COPYRIGHT, S::A2B0, S::PROFILE_SEQUENCE_DESC];
const SPACE: &[S] = &[S::DESC, S::COPYRIGHT, S::MEDIA_WHITE, S::A2B0, S::B2A0];
const ABSTRACT: &[S] = &[S::DESC, S::COPYRIGHT, S::MEDIA_WHITE, S::A2B0];

pub fn required_tags(class: ProfileClass, color_space: ColorSpace) -> RequiredTags {
    let (always, any_of) = match (class, color_space) {
        (ProfileClass::Input | ProfileClass::Display, ColorSpace::Gray) => (COMMON, GRAY_OR_LUT),
        (ProfileClass::Input | ProfileClass::Display, ColorSpace::Rgb) => (COMMON, MATRIX_OR_LUT),
        (ProfileClass::Input | ProfileClass::Display, _) => (COMMON, LUT_ONLY),
        (ProfileClass::Output, ColorSpace::Gray) => (COMMON, GRAY_OR_BIDI),
        (ProfileClass::Output, _) => (COMMON, BIDI),
        (ProfileClass::DeviceLink, _) => (LINK, &[][..]),
        (ProfileClass::ColorSpace, _) => (SPACE, &[][..]),
        (ProfileClass::Abstract, _) => (ABSTRACT, &[][..]),
        (ProfileClass::NamedColor, _) => (COMMON, NAMED),
    };
    RequiredTags { always, any_of }
}

/// Check that the tags `has` reports satisfy the header's device class.
pub fn check_required(header: &IccHeader, has: impl Fn(S) -> bool) -> Result<(), IccError> {
    let req = required_tags(header.device_class, header.color_space);
    if let Some(missing) = req.always.iter().find(|&&s| !has(s)) {
        return Err(IccError::MissingTag(missing.0));
    }
    if req.any_of.is_empty() || req.any_of.iter().any(|set| set.iter().all(|&s| has(s))) {
        return Ok(());
    }
    let first = req.any_of[0].iter().find(|&&s| !has(s)).copied();
    Err(IccError::MissingTag(first.map_or(0, |s| s.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_legality() {
        assert!(is_legal(S::RED_TRC, T::PARA));
        assert!(is_legal(S::A2B0, T::LUT16));
        assert!(!is_legal(S::A2B0, T::CURVE));
        assert!(is_legal(S::COPYRIGHT, T::MLUC));
        assert!(!is_legal(S::MEDIA_WHITE, T::TEXT));
        // Private signatures accept anything.
        assert!(is_legal(S::from_bytes(*b"zzzz"), T::TEXT));
        assert!(matches!(
            check_legal(S::CHAD, T::XYZ),
            Err(IccError::IllegalTagType { .. })
        ));
    }

    #[test]
    fn test_display_rgb_alternatives() {
        let header = IccHeader::new(ProfileClass::Display, ColorSpace::Rgb, ColorSpace::Xyz);
        let mut present = vec![S::DESC, S::COPYRIGHT, S::MEDIA_WHITE];
        assert_eq!(
            check_required(&header, |s| present.contains(&s)),
            Err(IccError::MissingTag(S::RED_COLORANT.0))
        );
        present.push(S::A2B0);
        assert!(check_required(&header, |s| present.contains(&s)).is_ok());
    }

    #[test]
    fn test_output_needs_both_directions() {
        let header = IccHeader::new(ProfileClass::Output, ColorSpace::Cmyk, ColorSpace::Lab);
        let mut present = vec![S::DESC, S::COPYRIGHT, S::MEDIA_WHITE, S::A2B0];
        assert_eq!(
            check_required(&header, |s| present.contains(&s)),
            Err(IccError::MissingTag(S::B2A0.0))
        );
        present.push(S::B2A0);
        assert!(check_required(&header, |s| present.contains(&s)).is_ok());
    }

    #[test]
    fn test_link_needs_sequence() {
        let header = IccHeader::new(ProfileClass::DeviceLink, ColorSpace::Rgb, ColorSpace::Cmyk);
        let present = [S::DESC, S::COPYRIGHT, S::A2B0];
        assert_eq!(
            check_required(&header, |s| present.contains(&s)),
            Err(IccError::MissingTag(S::PROFILE_SEQUENCE_DESC.0))
        );
    }
}
