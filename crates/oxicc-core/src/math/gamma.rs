//! Parametric transfer functions
//!
//! The five ICC parametric curve families carried by `para` tags.

/// ICC Parametric Curve Type
///
/// As defined in ICC.1:2022 Section 10.18
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParametricCurveType {
    /// Type 0: Y = X^g
    Gamma,
    /// Type 1: Y = (aX + b)^g  if X >= -b/a, else 0
    CIE122,
    /// Type 2: Y = (aX + b)^g + c  if X >= -b/a, else c
    IEC61966_3,
    /// Type 3: Y = (aX + b)^g  if X >= d, else cX (sRGB-like)
    IEC61966_2_1,
    /// Type 4: Y = (aX + b)^g + e  if X >= d, else cX + f
    Full,
}

impl ParametricCurveType {
    /// Get the function type from ICC value
    pub fn from_icc(function_type: u16) -> Option<Self> {
        match function_type {
            0 => Some(Self::Gamma),
            1 => Some(Self::CIE122),
            2 => Some(Self::IEC61966_3),
            3 => Some(Self::IEC61966_2_1),
            4 => Some(Self::Full),
            _ => None,
        }
    }

    pub fn to_icc(self) -> u16 {
        match self {
            Self::Gamma => 0,
            Self::CIE122 => 1,
            Self::IEC61966_3 => 2,
            Self::IEC61966_2_1 => 3,
            Self::Full => 4,
        }
    }

    /// Get the number of parameters required
    pub fn param_count(&self) -> usize {
        match self {
            Self::Gamma => 1,
            Self::CIE122 => 3,
            Self::IEC61966_3 => 4,
            Self::IEC61966_2_1 => 5,
            Self::Full => 7,
        }
    }
}

/// ICC Parametric Curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricCurve {
    pub curve_type: ParametricCurveType,
    pub g: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl ParametricCurve {
    /// Create a simple gamma curve (type 0)
    pub fn gamma(g: f64) -> Self {
        Self {
            curve_type: ParametricCurveType::Gamma,
            g,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// sRGB transfer function as a type 3 curve
    pub fn srgb() -> Self {
        Self {
            curve_type: ParametricCurveType::IEC61966_2_1,
            g: 2.4,
            a: 1.0 / 1.055,
            b: 0.055 / 1.055,
            c: 1.0 / 12.92,
            d: 0.04045,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Create from ICC parameters, in on-disk order `g a b c d e f`.
    pub fn from_params(curve_type: ParametricCurveType, params: &[f64]) -> Option<Self> {
        if params.len() < curve_type.param_count() {
            return None;
        }

        let mut curve = Self::gamma(params[0]);
        curve.curve_type = curve_type;
        let mut rest = params[1..curve_type.param_count()].iter().copied();
        for slot in [
            &mut curve.a,
            &mut curve.b,
            &mut curve.c,
            &mut curve.d,
            &mut curve.e,
            &mut curve.f,
        ] {
            match rest.next() {
                Some(v) => *slot = v,
                None => break,
            }
        }
        Some(curve)
    }

    /// The parameters this curve type stores, in on-disk order.
    pub fn to_params(&self) -> Vec<f64> {
        let all = [self.g, self.a, self.b, self.c, self.d, self.e, self.f];
        all[..self.curve_type.param_count()].to_vec()
    }

    /// Forward evaluation, input clamped to `[0, 1]`.
    pub fn eval(&self, x: f64) -> f64 {
        parametric_curve_eval(self, x)
    }

    /// Inverse evaluation, input clamped to `[0, 1]`.
    pub fn eval_inverse(&self, y: f64) -> f64 {
        parametric_curve_eval_inverse(self, y)
    }
}

/// Evaluate a parametric curve (forward direction)
#[inline]
pub fn parametric_curve_eval(curve: &ParametricCurve, x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);

    let threshold = if curve.a.abs() > 1e-10 {
        -curve.b / curve.a
    } else {
        0.0
    };
    match curve.curve_type {
        ParametricCurveType::Gamma => x.powf(curve.g),
        ParametricCurveType::CIE122 => {
            if x >= threshold {
                (curve.a * x + curve.b).max(0.0).powf(curve.g)
            } else {
                0.0
            }
        }
        ParametricCurveType::IEC61966_3 => {
            if x >= threshold {
                (curve.a * x + curve.b).max(0.0).powf(curve.g) + curve.c
            } else {
                curve.c
            }
        }
        ParametricCurveType::IEC61966_2_1 => {
            if x >= curve.d {
                (curve.a * x + curve.b).max(0.0).powf(curve.g)
            } else {
                curve.c * x
            }
        }
        ParametricCurveType::Full => {
            if x >= curve.d {
                (curve.a * x + curve.b).max(0.0).powf(curve.g) + curve.e
            } else {
                curve.c * x + curve.f
            }
        }
    }
}

/// Evaluate a parametric curve in reverse.
///
/// Types 0 and 3 use their closed form. The rest bisect, which only needs
/// the curve to be monotonic.
pub fn parametric_curve_eval_inverse(curve: &ParametricCurve, y: f64) -> f64 {
    let y = y.clamp(0.0, 1.0);

    match curve.curve_type {
        ParametricCurveType::Gamma if curve.g.abs() > 1e-10 => y.powf(1.0 / curve.g),
        ParametricCurveType::IEC61966_2_1
            if curve.c.abs() > 1e-10 && curve.a.abs() > 1e-10 && curve.g.abs() > 1e-10 =>
        {
            if y < curve.c * curve.d {
                y / curve.c
            } else {
                ((y.powf(1.0 / curve.g) - curve.b) / curve.a).clamp(0.0, 1.0)
            }
        }
        _ => bisect_inverse(|x| parametric_curve_eval(curve, x), y),
    }
}

fn bisect_inverse(f: impl Fn(f64) -> f64, y: f64) -> f64 {
    let rising = f(1.0) >= f(0.0);
    let (mut lo, mut hi) = (0.0f64, 1.0f64);
    for _ in 0..60 {
        let mid = 0.5 * (lo + hi);
        let below = f(mid) < y;
        if below == rising {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
