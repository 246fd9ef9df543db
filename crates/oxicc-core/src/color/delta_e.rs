//! Color difference metrics
//!
//! All three take Lab values and are pure functions.

use crate::color::Lab;

/// CIE76: Euclidean distance in Lab.
pub fn delta_e(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// CIE94 with graphic-arts weights (kL = 1, K1 = 0.045, K2 = 0.015).
///
/// `reference` is the standard; the metric is not symmetric.
pub fn delta_e_94(reference: Lab, sample: Lab) -> f64 {
    let c1 = reference.chroma();
    let c2 = sample.chroma();
    let dl = reference.l - sample.l;
    let dc = c1 - c2;
    let da = reference.a - sample.a;
    let db = reference.b - sample.b;
    let dh_sq = (da * da + db * db - dc * dc).max(0.0);

    let sc = 1.0 + 0.045 * c1;
    let sh = 1.0 + 0.015 * c1;
    let tc = dc / sc;
    (dl * dl + tc * tc + dh_sq / (sh * sh)).sqrt()
}

/// Hue angle in degrees for CIEDE2000's adjusted a'.
fn hue_prime(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 { h + 360.0 } else { h }
}

/// CIEDE2000 with unit weighting factors.
pub fn delta_e_2000(lab1: Lab, lab2: Lab) -> f64 {
    const POW25_7: f64 = 6_103_515_625.0;

    let c_bar = (lab1.chroma() + lab2.chroma()) / 2.0;
    let c_bar7 = c_bar.powi(7);
    let g = 0.5 * (1.0 - (c_bar7 / (c_bar7 + POW25_7)).sqrt());

    let a1 = lab1.a * (1.0 + g);
    let a2 = lab2.a * (1.0 + g);
    let c1 = a1.hypot(lab1.b);
    let c2 = a2.hypot(lab2.b);
    let h1 = hue_prime(a1, lab1.b);
    let h2 = hue_prime(a2, lab2.b);

    let dl = lab2.l - lab1.l;
    let dc = c2 - c1;
    let chroma_product = c1 * c2;

    let dh = if chroma_product == 0.0 {
        0.0
    } else {
        let d = h2 - h1;
        if d > 180.0 {
            d - 360.0
        } else if d < -180.0 {
            d + 360.0
        } else {
            d
        }
    };
    let big_dh = 2.0 * chroma_product.sqrt() * (dh.to_radians() / 2.0).sin();

    let l_bar = (lab1.l + lab2.l) / 2.0;
    let cp_bar = (c1 + c2) / 2.0;
    let h_bar = if chroma_product == 0.0 {
        h1 + h2
    } else if (h1 - h2).abs() <= 180.0 {
        (h1 + h2) / 2.0
    } else if h1 + h2 < 360.0 {
        (h1 + h2 + 360.0) / 2.0
    } else {
        (h1 + h2 - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar).to_radians().cos()
        + 0.32 * (3.0 * h_bar + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar - 63.0).to_radians().cos();

    let l50 = (l_bar - 50.0) * (l_bar - 50.0);
    let sl = 1.0 + 0.015 * l50 / (20.0 + l50).sqrt();
    let sc = 1.0 + 0.045 * cp_bar;
    let sh = 1.0 + 0.015 * cp_bar * t;

    let cp_bar7 = cp_bar.powi(7);
    let rc = 2.0 * (cp_bar7 / (cp_bar7 + POW25_7)).sqrt();
    let d_theta = 30.0 * (-((h_bar - 275.0) / 25.0).powi(2)).exp();
    let rt = -(2.0 * d_theta).to_radians().sin() * rc;

    let tl = dl / sl;
    let tc = dc / sc;
    let th = big_dh / sh;
    (tl * tl + tc * tc + th * th + rt * tc * th).sqrt()
}
