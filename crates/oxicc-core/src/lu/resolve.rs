//! Resolution of a function and intent to the tags implementing it.

use log::debug;

use super::pcs::LutSide;
use super::{LuAlgorithm, LuFunction, LuIntent, LuIntent as I, LuKind, LuObject, LuOrder, LuSpaces};
use crate::color::{D50, Xyz};
use crate::icc::{
    ColorSpace, IccError, IccProfile, ProfileClass, TagHandle, TagPresence, TagSignature as S,
    TypeSignature,
};
use crate::math::adaptation_matrix_with_cone;

type Result<T> = std::result::Result<T, IccError>;

/// Lut tags to try, most specific first. Intents without a dedicated tag
/// fall back to the default (perceptual) one.
fn lut_candidates(class: ProfileClass, function: LuFunction, intent: LuIntent) -> &'static [S] {
    match (class, function) {
        (ProfileClass::DeviceLink | ProfileClass::Abstract, LuFunction::Forward) => &[S::A2B0],
        (ProfileClass::Abstract, LuFunction::Backward) => &[S::B2A0],
        (_, LuFunction::Forward) => match intent {
            I::Default | I::Perceptual => &[S::A2B0],
            I::RelativeColorimetric | I::AbsoluteColorimetric => &[S::A2B1, S::A2B0],
            I::Saturation => &[S::A2B2, S::A2B0],
        },
        (_, LuFunction::Backward) => match intent {
            I::Default | I::Perceptual => &[S::B2A0],
            I::RelativeColorimetric | I::AbsoluteColorimetric => &[S::B2A1, S::B2A0],
            I::Saturation => &[S::B2A2, S::B2A0],
        },
        (_, LuFunction::Gamut) => &[S::GAMUT],
        (_, LuFunction::Preview) => match intent {
            I::Default | I::Perceptual => &[S::PREVIEW0],
            I::RelativeColorimetric | I::AbsoluteColorimetric => &[S::PREVIEW1, S::PREVIEW0],
            I::Saturation => &[S::PREVIEW2, S::PREVIEW0],
        },
    }
}

/// Native input and output spaces, and which of them are the PCS.
struct Sides {
    input: ColorSpace,
    output: ColorSpace,
    in_pcs: bool,
    out_pcs: bool,
}

fn native_sides(class: ProfileClass, function: LuFunction, cs: ColorSpace, pcs: ColorSpace) -> Sides {
    let link = class == ProfileClass::DeviceLink;
    let abstract_ = class == ProfileClass::Abstract;
    let (input, output, in_pcs, out_pcs) = match function {
        LuFunction::Forward => (cs, pcs, abstract_, !link),
        LuFunction::Backward => (pcs, cs, !link, abstract_),
        LuFunction::Gamut => (pcs, ColorSpace::Gray, true, false),
        LuFunction::Preview => (pcs, pcs, true, true),
    };
    Sides {
        input,
        output,
        in_pcs,
        out_pcs,
    }
}

fn has_matrix_shaper(class: ProfileClass) -> bool {
    matches!(
        class,
        ProfileClass::Input | ProfileClass::Display | ProfileClass::Output | ProfileClass::ColorSpace
    )
}

const MATRIX_COLORANTS: [S; 3] = [S::RED_COLORANT, S::GREEN_COLORANT, S::BLUE_COLORANT];
const MATRIX_TRCS: [S; 3] = [S::RED_TRC, S::GREEN_TRC, S::BLUE_TRC];

impl IccProfile {
    /// Build a Lu object for `function` and `intent`.
    ///
    /// Representations are tried in `order`. A Lut for an intent without
    /// its own tag falls back to the default intent's tag. `pcs` selects
    /// the caller-side PCS (XYZ or Lab); `None` keeps the profile's.
    pub fn get_luobj(
        &mut self,
        function: LuFunction,
        intent: LuIntent,
        pcs: Option<ColorSpace>,
        order: LuOrder,
    ) -> Result<LuObject> {
        let class = self.header.device_class;
        if class == ProfileClass::NamedColor {
            return Err(IccError::Unsupported(
                "named color profiles have no Lu transform".into(),
            ));
        }
        if class == ProfileClass::DeviceLink && function != LuFunction::Forward {
            return Err(IccError::Unsupported(format!(
                "device links only evaluate forward, not {:?}",
                function
            )));
        }
        if let Some(space) = pcs {
            if !space.is_pcs() {
                return Err(IccError::InvalidColorSpace(space.to_u32()));
            }
        }

        let algorithms = match order {
            LuOrder::Normal => [LuAlgorithm::Lut, LuAlgorithm::Matrix, LuAlgorithm::Mono],
            LuOrder::Reverse => [LuAlgorithm::Mono, LuAlgorithm::Matrix, LuAlgorithm::Lut],
        };
        let sides = native_sides(class, function, self.header.color_space, self.header.pcs);
        for alg in algorithms {
            let found = match alg {
                LuAlgorithm::Lut => self.try_lut(function, intent, &sides)?,
                LuAlgorithm::Matrix => self.try_matrix(function)?,
                LuAlgorithm::Mono => self.try_mono(function)?,
            };
            if let Some((kind, tags)) = found {
                return self.finish(kind, tags, function, intent, pcs, sides);
            }
        }

        let missing = lut_candidates(class, function, intent)[0];
        Err(IccError::MissingTag(missing.0))
    }

    fn try_lut(
        &mut self,
        function: LuFunction,
        intent: LuIntent,
        sides: &Sides,
    ) -> Result<Option<(LuKind, Vec<S>)>> {
        for &sig in lut_candidates(self.header.device_class, function, intent) {
            match self.find_tag(sig) {
                TagPresence::Absent => continue,
                TagPresence::Known(t) if t == TypeSignature::LUT8 || t == TypeSignature::LUT16 => {}
                TagPresence::Known(t) | TagPresence::Unknown(t) => {
                    debug!("'{}' holds '{}', not a Lut this evaluator handles", sig, t);
                    continue;
                }
            }
            let handle = self.read_tag(sig)?;
            let (precision, interp) = {
                let tag = handle.borrow();
                let lut = tag.as_lut().ok_or(IccError::TypeMismatch {
                    expected: TypeSignature::LUT16.0,
                    found: tag.type_signature().0,
                })?;
                let n_out = match function {
                    LuFunction::Gamut => 1,
                    _ => sides.output.channels(),
                };
                if lut.input_chan != sides.input.channels() || lut.output_chan != n_out {
                    return Err(IccError::CorruptedData(format!(
                        "'{}' maps {} to {} channels, profile implies {} to {}",
                        sig,
                        lut.input_chan,
                        lut.output_chan,
                        sides.input.channels(),
                        n_out
                    )));
                }
                (lut.precision, lut.choose_interp(Some(sides.input)))
            };
            let kind = LuKind::Lut {
                lut: handle,
                in_side: LutSide::for_space(sides.input, sides.in_pcs, precision),
                out_side: LutSide::for_space(sides.output, sides.out_pcs, precision),
                interp,
            };
            return Ok(Some((kind, vec![sig])));
        }
        Ok(None)
    }

    fn try_matrix(&mut self, function: LuFunction) -> Result<Option<(LuKind, Vec<S>)>> {
        if !matches!(function, LuFunction::Forward | LuFunction::Backward)
            || !has_matrix_shaper(self.header.device_class)
            || self.header.color_space != ColorSpace::Rgb
            || !MATRIX_COLORANTS
                .iter()
                .chain(&MATRIX_TRCS)
                .all(|&s| self.has_tag(s))
        {
            return Ok(None);
        }

        let mut columns = [[0.0; 3]; 3];
        for (col, sig) in columns.iter_mut().zip(MATRIX_COLORANTS) {
            let handle = self.read_tag(sig)?;
            let xyz = handle.borrow().xyz_value();
            *col = xyz
                .ok_or(IccError::CorruptedData(format!("'{}' holds no XYZ value", sig)))?
                .to_array();
        }
        let matrix = crate::math::Matrix3x3::from_columns(columns[0], columns[1], columns[2]);
        let inverse = matrix.inverse().ok_or(IccError::SingularMatrix)?;
        let curves = [
            self.read_curve(MATRIX_TRCS[0])?,
            self.read_curve(MATRIX_TRCS[1])?,
            self.read_curve(MATRIX_TRCS[2])?,
        ];

        let mut tags = MATRIX_COLORANTS.to_vec();
        tags.extend(MATRIX_TRCS);
        Ok(Some((
            LuKind::Matrix {
                curves,
                matrix,
                inverse,
            },
            tags,
        )))
    }

    fn try_mono(&mut self, function: LuFunction) -> Result<Option<(LuKind, Vec<S>)>> {
        if !matches!(function, LuFunction::Forward | LuFunction::Backward)
            || !has_matrix_shaper(self.header.device_class)
            || self.header.color_space != ColorSpace::Gray
            || !self.has_tag(S::GRAY_TRC)
        {
            return Ok(None);
        }
        let curve = self.read_curve(S::GRAY_TRC)?;
        Ok(Some((LuKind::Mono { curve }, vec![S::GRAY_TRC])))
    }

    fn read_curve(&mut self, sig: S) -> Result<TagHandle> {
        let handle = self.read_tag(sig)?;
        let found = handle.borrow().type_signature();
        if found != TypeSignature::CURVE && found != TypeSignature::PARA {
            return Err(IccError::TypeMismatch {
                expected: TypeSignature::CURVE.0,
                found: found.0,
            });
        }
        Ok(handle)
    }

    fn finish(
        &mut self,
        kind: LuKind,
        tags: Vec<S>,
        function: LuFunction,
        intent: LuIntent,
        pcs: Option<ColorSpace>,
        sides: Sides,
    ) -> Result<LuObject> {
        let native_pcs = self.header.pcs;
        let core_pcs = match kind {
            LuKind::Lut { .. } => native_pcs,
            _ => ColorSpace::Xyz,
        };
        // Matrix and mono objects compute in XYZ and present the header PCS.
        let effective_pcs = pcs.unwrap_or(native_pcs);
        let spaces = LuSpaces {
            input: if sides.in_pcs { effective_pcs } else { sides.input },
            output: if sides.out_pcs { effective_pcs } else { sides.output },
            native_input: sides.input,
            native_output: sides.output,
            pcs: effective_pcs,
            native_pcs,
        };

        let absolute = intent == LuIntent::AbsoluteColorimetric && (sides.in_pcs || sides.out_pcs);
        let white = self.media_white()?;
        let black = self.media_black()?.unwrap_or(Xyz::new(0.0, 0.0, 0.0));
        let cone = self.abs_cone()?;
        let to_abs = adaptation_matrix_with_cone(D50.xyz, white, &cone);
        let from_abs = to_abs.inverse().ok_or(IccError::SingularMatrix)?;

        let lu = LuObject {
            kind,
            function,
            intent,
            tags,
            spaces,
            in_pcs: sides.in_pcs,
            out_pcs: sides.out_pcs,
            core_pcs,
            absolute,
            white,
            black,
            to_abs,
            from_abs,
        };
        debug!(
            "Lu {:?} {:?} via {:?} from {:?}, {:?} -> {:?}",
            function,
            intent,
            lu.algorithm(),
            lu.tags,
            spaces.input,
            spaces.output
        );
        Ok(lu)
    }
}
