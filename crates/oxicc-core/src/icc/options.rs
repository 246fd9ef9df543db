//! Profile-wide options consulted by the reader, the writer and the Lu
//! evaluators.

use super::header::ProfileClass;
use crate::math::ChromaticAdaptationMethod;

/// Behavior switches for reading, writing and evaluating a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IccOptions {
    /// Use Bradford rather than the identity cone matrix for output-class
    /// absolute/relative conversion.
    pub output_bradford: bool,
    /// Write display profiles with `wtpt = D50` plus a `chad` from the real
    /// media white. Otherwise store the real media white.
    pub display_chad_d50: bool,
    /// Load unrecognized tag types as opaque `Unknown` tags.
    pub allow_unknown: bool,
    /// Reject malformed date-time fields instead of repairing them.
    pub strict_datetime: bool,
    /// Validate the tag set against the device class before writing.
    pub check_required_tags: bool,
    /// Compute the MD5 profile ID for version 4.1 and later.
    pub compute_id: bool,
}

impl IccOptions {
    pub const fn new() -> Self {
        Self {
            output_bradford: false,
            display_chad_d50: true,
            allow_unknown: true,
            strict_datetime: false,
            check_required_tags: true,
            compute_id: true,
        }
    }

    /// Strict reading: unknown types and bad dates are errors.
    pub const fn strict() -> Self {
        let mut o = Self::new();
        o.allow_unknown = false;
        o.strict_datetime = true;
        o
    }

    pub const fn with_output_bradford(mut self, on: bool) -> Self {
        self.output_bradford = on;
        self
    }

    pub const fn with_display_chad_d50(mut self, on: bool) -> Self {
        self.display_chad_d50 = on;
        self
    }

    pub const fn with_allow_unknown(mut self, on: bool) -> Self {
        self.allow_unknown = on;
        self
    }

    pub const fn with_strict_datetime(mut self, on: bool) -> Self {
        self.strict_datetime = on;
        self
    }

    pub const fn with_check_required_tags(mut self, on: bool) -> Self {
        self.check_required_tags = on;
        self
    }

    pub const fn with_compute_id(mut self, on: bool) -> Self {
        self.compute_id = on;
        self
    }

    /// Cone matrix used for absolute/relative conversion in a profile of
    /// this class, when the profile does not record one.
    pub fn cone_method(&self, class: ProfileClass) -> ChromaticAdaptationMethod {
        if class == ProfileClass::Output && !self.output_bradford {
            ChromaticAdaptationMethod::WrongVonKries
        } else {
            ChromaticAdaptationMethod::Bradford
        }
    }
}

impl Default for IccOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_class_cone() {
        let o = IccOptions::default();
        assert_eq!(
            o.cone_method(ProfileClass::Output),
            ChromaticAdaptationMethod::WrongVonKries
        );
        assert_eq!(
            o.cone_method(ProfileClass::Display),
            ChromaticAdaptationMethod::Bradford
        );
        let o = o.with_output_bradford(true);
        assert_eq!(
            o.cone_method(ProfileClass::Output),
            ChromaticAdaptationMethod::Bradford
        );
    }

    #[test]
    fn test_strict() {
        let o = IccOptions::strict();
        assert!(!o.allow_unknown);
        assert!(o.strict_datetime);
        assert!(o.display_chad_d50);
    }
}
