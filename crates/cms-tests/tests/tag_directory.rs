//! Tag directory lifecycle on file-backed profiles

use std::rc::Rc;

use cms_tests::fixtures::{SRGB_D50_COLORANTS, matrix_display_profile};
use oxicc_core::icc::tags::{Text, Unknown};
use oxicc_core::icc::{IccOptions, IccProfile, TagPresence};
use oxicc_core::{IccError, TagSignature, TypeSignature};

const PRIVATE: TagSignature = TagSignature::from_bytes(*b"zPRV");
const PRIVATE_TYPE: TypeSignature = TypeSignature::from_bytes(*b"zTYP");

fn display_bytes() -> Vec<u8> {
    let mut profile = matrix_display_profile(2.2, SRGB_D50_COLORANTS);
    profile
        .add_tag_value(
            PRIVATE,
            Unknown {
                uttype: PRIVATE_TYPE,
                data: vec![0, 0, 0, 0, 1, 2, 3, 4, 5],
            },
        )
        .expect("add private tag");
    profile.to_bytes().expect("write")
}

#[test]
fn test_find_does_not_load() {
    let profile = IccProfile::from_bytes(&display_bytes()).expect("read");
    assert_eq!(
        profile.find_tag(TagSignature::RED_TRC),
        TagPresence::Known(TypeSignature::CURVE)
    );
    assert_eq!(profile.find_tag(PRIVATE), TagPresence::Unknown(PRIVATE_TYPE));
    assert_eq!(profile.find_tag(TagSignature::A2B0), TagPresence::Absent);
    // Nothing loaded yet, so nothing is shared.
    assert_eq!(profile.tag_ref_count(TagSignature::RED_TRC), None);
}

#[test]
fn test_unknown_type_kept_opaque() {
    let bytes = display_bytes();
    let mut lenient = IccProfile::from_bytes(&bytes).expect("read");
    let handle = lenient.read_tag(PRIVATE).expect("opaque tag");
    {
        let tag = handle.borrow();
        let unknown = tag.as_unknown().expect("Unknown variant");
        assert_eq!(unknown.uttype, PRIVATE_TYPE);
        assert_eq!(unknown.data, [0, 0, 0, 0, 1, 2, 3, 4, 5]);
    }

    // Written back byte for byte.
    let rewritten = lenient.to_bytes().expect("rewrite");
    let mut again = IccProfile::from_bytes(&rewritten).expect("reread");
    let data = again.read_tag(PRIVATE).expect("opaque tag");
    assert_eq!(data.borrow().as_unknown().map(|u| u.data.len()), Some(9));

    let mut strict = IccProfile::from_bytes_with(&bytes, IccOptions::strict()).expect("read");
    let err = strict.read_tag(PRIVATE).expect_err("strict rejects unknown types");
    assert!(matches!(err, IccError::UnknownTagType { .. }), "{err}");
    // Known tags still load.
    assert!(strict.read_tag(TagSignature::RED_COLORANT).is_ok());
}

#[test]
fn test_shared_storage_loads_once() {
    let mut profile = IccProfile::from_bytes(&display_bytes()).expect("read");
    let red = profile.read_tag(TagSignature::RED_TRC).expect("rTRC");
    let green = profile.read_tag(TagSignature::GREEN_TRC).expect("gTRC");
    let blue = profile.read_tag(TagSignature::BLUE_TRC).expect("bTRC");
    assert!(Rc::ptr_eq(&red, &green) && Rc::ptr_eq(&green, &blue));
    assert_eq!(profile.tag_ref_count(TagSignature::GREEN_TRC), Some(3));

    profile.delete_tag(TagSignature::BLUE_TRC).expect("delete");
    assert!(!profile.has_tag(TagSignature::BLUE_TRC));
    assert_eq!(profile.tag_ref_count(TagSignature::RED_TRC), Some(2));
    assert_eq!(
        profile.delete_tag(TagSignature::BLUE_TRC),
        Err(IccError::TagNotFound(TagSignature::BLUE_TRC.0))
    );
}

#[test]
fn test_unload_reloads_from_file() {
    let mut profile = IccProfile::from_bytes(&display_bytes()).expect("read");
    let before = profile.read_tag(TagSignature::COPYRIGHT).expect("cprt");
    profile.unload_tag(TagSignature::COPYRIGHT).expect("unload");
    assert_eq!(profile.tag_ref_count(TagSignature::COPYRIGHT), None);
    assert!(profile.has_tag(TagSignature::COPYRIGHT));

    let after = profile.read_tag(TagSignature::COPYRIGHT).expect("reload");
    assert_eq!(
        before.borrow().as_text().map(|t| t.text.clone()),
        after.borrow().as_text().map(|t| t.text.clone())
    );

    // Tags added in memory have nothing to reload from.
    profile
        .add_tag_value(TagSignature::CHAR_TARGET, Text::new("none"))
        .expect("add targ");
    assert!(matches!(
        profile.unload_tag(TagSignature::CHAR_TARGET),
        Err(IccError::Unsupported(_))
    ));
}

#[test]
fn test_rename_and_link_survive_write() {
    let mut profile = IccProfile::from_bytes(&display_bytes()).expect("read");
    profile
        .rename_tag(PRIVATE, TagSignature::from_bytes(*b"zNEW"))
        .expect("rename");
    profile
        .link_tag(TagSignature::GRAY_TRC, TagSignature::RED_TRC)
        .expect("link kTRC");
    let bytes = profile.to_bytes().expect("write");

    let mut reloaded = IccProfile::from_bytes(&bytes).expect("read");
    assert!(!reloaded.has_tag(PRIVATE));
    assert_eq!(
        reloaded.find_tag(TagSignature::from_bytes(*b"zNEW")),
        TagPresence::Unknown(PRIVATE_TYPE)
    );
    let gray = reloaded.read_tag(TagSignature::GRAY_TRC).expect("kTRC");
    let red = reloaded.read_tag(TagSignature::RED_TRC).expect("rTRC");
    assert!(Rc::ptr_eq(&gray, &red));
}

#[test]
fn test_add_rejects_duplicates_and_illegal_types() {
    let mut profile = IccProfile::from_bytes(&display_bytes()).expect("read");
    assert_eq!(
        profile
            .add_tag_value(TagSignature::COPYRIGHT, Text::new("again"))
            .err(),
        Some(IccError::DuplicateTag(TagSignature::COPYRIGHT.0))
    );
    assert!(matches!(
        profile.add_tag_value(TagSignature::MEDIA_BLACK, Text::new("not XYZ")),
        Err(IccError::IllegalTagType { .. })
    ));
    assert!(matches!(
        profile.link_tag(TagSignature::MEDIA_BLACK, TagSignature::COPYRIGHT),
        Err(IccError::IllegalTagType { .. })
    ));
}
