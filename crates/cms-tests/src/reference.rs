//! Reference implementation wrappers
//!
//! Float evaluation of ICC bytes through lcms2, and parsed profile content
//! from moxcms.

use lcms2::{CIExyY, GlobalContext, Intent, PixelFormat, Profile, Transform};

fn d50_xyy() -> CIExyY {
    CIExyY {
        x: 0.3457,
        y: 0.3585,
        Y: 1.0,
    }
}

fn lcms2_lab() -> Result<Profile, String> {
    Profile::new_lab4_context(GlobalContext::new(), &d50_xyy())
        .map_err(|e| format!("lcms2 Lab profile: {}", e))
}

fn run(
    src: &Profile,
    src_format: PixelFormat,
    dst: &Profile,
    dst_format: PixelFormat,
    intent: Intent,
    pixels: &[[f64; 3]],
) -> Result<Vec<[f64; 3]>, String> {
    let transform =
        Transform::<[f64; 3], [f64; 3]>::new(src, src_format, dst, dst_format, intent)
            .map_err(|e| format!("lcms2 transform: {}", e))?;
    let mut out = vec![[0.0f64; 3]; pixels.len()];
    transform.transform_pixels(pixels, &mut out);
    Ok(out)
}

/// Device RGB to D50 XYZ (`Y = 1` for white).
pub fn lcms2_rgb_to_xyz(
    icc: &[u8],
    rgb: &[[f64; 3]],
    intent: Intent,
) -> Result<Vec<[f64; 3]>, String> {
    let src = Profile::new_icc(icc).map_err(|e| format!("lcms2 profile: {}", e))?;
    let xyz = Profile::new_xyz();
    run(&src, PixelFormat::RGB_DBL, &xyz, PixelFormat::XYZ_DBL, intent, rgb)
}

/// Device RGB to D50 Lab.
pub fn lcms2_rgb_to_lab(
    icc: &[u8],
    rgb: &[[f64; 3]],
    intent: Intent,
) -> Result<Vec<[f64; 3]>, String> {
    let src = Profile::new_icc(icc).map_err(|e| format!("lcms2 profile: {}", e))?;
    let lab = lcms2_lab()?;
    run(&src, PixelFormat::RGB_DBL, &lab, PixelFormat::Lab_DBL, intent, rgb)
}

/// D50 Lab to device RGB.
pub fn lcms2_lab_to_rgb(
    icc: &[u8],
    lab: &[[f64; 3]],
    intent: Intent,
) -> Result<Vec<[f64; 3]>, String> {
    let dst = Profile::new_icc(icc).map_err(|e| format!("lcms2 profile: {}", e))?;
    let src = lcms2_lab()?;
    run(&src, PixelFormat::Lab_DBL, &dst, PixelFormat::RGB_DBL, intent, lab)
}

/// Red, green and blue colorants as moxcms parses them.
pub fn moxcms_colorants(icc: &[u8]) -> Result<[[f64; 3]; 3], String> {
    let profile = moxcms::ColorProfile::new_from_slice(icc)
        .map_err(|e| format!("moxcms profile: {:?}", e))?;
    Ok([
        [
            profile.red_colorant.x,
            profile.red_colorant.y,
            profile.red_colorant.z,
        ],
        [
            profile.green_colorant.x,
            profile.green_colorant.y,
            profile.green_colorant.z,
        ],
        [
            profile.blue_colorant.x,
            profile.blue_colorant.y,
            profile.blue_colorant.z,
        ],
    ])
}

/// Whether moxcms accepts the bytes as a profile at all.
pub fn moxcms_accepts(icc: &[u8]) -> bool {
    moxcms::ColorProfile::new_from_slice(icc).is_ok()
}
