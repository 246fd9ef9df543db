//! Saturating size arithmetic
//!
//! Every size or offset derived from untrusted profile fields is computed
//! through these helpers. On overflow the result is the domain maximum,
//! which callers treat as "too large to be legal" and turn into a
//! structural error.

/// Saturating arithmetic over an unsigned size domain.
pub trait SatArith: Copy + PartialOrd {
    /// Saturation sentinel.
    const MAX: Self;

    /// `a + b`, or `MAX` on overflow.
    fn sat_add(self, b: Self) -> Self;
    /// `a - b`, or `MAX` if `b > a`.
    fn sat_sub(self, b: Self) -> Self;
    /// `a * b`, or `MAX` on overflow.
    fn sat_mul(self, b: Self) -> Self;
    /// `a ^ b`, or `MAX` on overflow.
    fn sat_pow(self, b: u32) -> Self;
    /// Round `self` up to a multiple of `align`, or `MAX` on overflow.
    fn sat_align(self, align: Self) -> Self;

    /// True if `a + b` would overflow.
    fn ovr_add(self, b: Self) -> bool;
    /// True if `a - b` would underflow.
    fn ovr_sub(self, b: Self) -> bool;
    /// True if `a * b` would overflow.
    fn ovr_mul(self, b: Self) -> bool;

    /// True if this value is the saturation sentinel.
    fn is_saturated(self) -> bool;
}

macro_rules! impl_sat_arith {
    ($t:ty) => {
        impl SatArith for $t {
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn sat_add(self, b: Self) -> Self {
                self.checked_add(b).unwrap_or(Self::MAX)
            }

            #[inline]
            fn sat_sub(self, b: Self) -> Self {
                self.checked_sub(b).unwrap_or(Self::MAX)
            }

            #[inline]
            fn sat_mul(self, b: Self) -> Self {
                if self == 0 || b == 0 {
                    return 0;
                }
                self.checked_mul(b).unwrap_or(Self::MAX)
            }

            fn sat_pow(self, b: u32) -> Self {
                let mut acc: Self = 1;
                for _ in 0..b {
                    acc = acc.sat_mul(self);
                    if acc == Self::MAX {
                        break;
                    }
                }
                acc
            }

            #[inline]
            fn sat_align(self, align: Self) -> Self {
                if align == 0 {
                    return self;
                }
                match self.checked_add(align - 1) {
                    Some(v) => v - v % align,
                    None => Self::MAX,
                }
            }

            #[inline]
            fn ovr_add(self, b: Self) -> bool {
                self.checked_add(b).is_none()
            }

            #[inline]
            fn ovr_sub(self, b: Self) -> bool {
                b > self
            }

            #[inline]
            fn ovr_mul(self, b: Self) -> bool {
                self.checked_mul(b).is_none()
            }

            #[inline]
            fn is_saturated(self) -> bool {
                self == Self::MAX
            }
        }
    };
}

impl_sat_arith!(u32);
impl_sat_arith!(usize);

/// `a + b` saturating at `T::MAX`.
#[inline]
pub fn sat_add<T: SatArith>(a: T, b: T) -> T {
    a.sat_add(b)
}

/// `a - b`, `T::MAX` if `b > a`.
#[inline]
pub fn sat_sub<T: SatArith>(a: T, b: T) -> T {
    a.sat_sub(b)
}

/// `a * b` saturating at `T::MAX`.
#[inline]
pub fn sat_mul<T: SatArith>(a: T, b: T) -> T {
    a.sat_mul(b)
}

/// `a * b * c` saturating at `T::MAX`.
#[inline]
pub fn sat_mul3<T: SatArith>(a: T, b: T, c: T) -> T {
    a.sat_mul(b).sat_mul(c)
}

/// `a ^ b` saturating at `T::MAX`.
#[inline]
pub fn sat_pow<T: SatArith>(a: T, b: u32) -> T {
    a.sat_pow(b)
}

/// Round `a` up to a multiple of `align`, saturating at `T::MAX`.
#[inline]
pub fn sat_align<T: SatArith>(align: T, a: T) -> T {
    a.sat_align(align)
}

/// True if `a + b` overflows `T`.
#[inline]
pub fn ovr_add<T: SatArith>(a: T, b: T) -> bool {
    a.ovr_add(b)
}

/// True if `a - b` goes below zero.
#[inline]
pub fn ovr_sub<T: SatArith>(a: T, b: T) -> bool {
    a.ovr_sub(b)
}

/// True if `a * b` overflows `T`.
#[inline]
pub fn ovr_mul<T: SatArith>(a: T, b: T) -> bool {
    a.ovr_mul(b)
}
