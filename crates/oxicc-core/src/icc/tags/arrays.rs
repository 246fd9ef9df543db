//! Fixed-width number arrays: ui08, ui16, ui32, ui64, uf32, sf32 and XYZ.

use std::fmt;

use super::{alloc_vec, element_count, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::{TypeSignature, XyzNumber};
use crate::math::Matrix3x3;
use crate::sat::{sat_add, sat_mul};

/// One element of a number array tag.
pub trait ArrayElement: Copy + Default + PartialEq + fmt::Debug + fmt::Display {
    const TYPE: TypeSignature;
    /// Encoded size in bytes
    const SIZE: usize;

    fn read(r: &mut ByteReader<'_>) -> Result<Self>;
    fn write(self, w: &mut ByteWriter) -> Result<()>;
}

/// u16Fixed16Number element
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct U16Fixed16(pub f64);

/// s15Fixed16Number element
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct S15Fixed16(pub f64);

impl fmt::Display for U16Fixed16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl fmt::Display for S15Fixed16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

macro_rules! int_element {
    ($t:ty, $sig:ident, $read:ident, $write:ident) => {
        impl ArrayElement for $t {
            const TYPE: TypeSignature = TypeSignature::$sig;
            const SIZE: usize = std::mem::size_of::<$t>();

            fn read(r: &mut ByteReader<'_>) -> Result<Self> {
                r.$read()
            }

            fn write(self, w: &mut ByteWriter) -> Result<()> {
                w.$write(self);
                Ok(())
            }
        }
    };
}

int_element!(u8, UINT8_ARRAY, u8, u8);
int_element!(u16, UINT16_ARRAY, u16, u16);
int_element!(u32, UINT32_ARRAY, u32, u32);
int_element!(u64, UINT64_ARRAY, u64, u64);

impl ArrayElement for U16Fixed16 {
    const TYPE: TypeSignature = TypeSignature::U16_FIXED16_ARRAY;
    const SIZE: usize = 4;

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self(r.u16f16()?))
    }

    fn write(self, w: &mut ByteWriter) -> Result<()> {
        w.u16f16(self.0)
    }
}

impl ArrayElement for S15Fixed16 {
    const TYPE: TypeSignature = TypeSignature::S15_FIXED16_ARRAY;
    const SIZE: usize = 4;

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self(r.s15f16()?))
    }

    fn write(self, w: &mut ByteWriter) -> Result<()> {
        w.s15f16(self.0)
    }
}

impl ArrayElement for XyzNumber {
    const TYPE: TypeSignature = TypeSignature::XYZ;
    const SIZE: usize = 12;

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        r.xyz()
    }

    fn write(self, w: &mut ByteWriter) -> Result<()> {
        w.xyz(self)
    }
}

/// A counted array of fixed-width numbers. The count is implied by the
/// tag length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberArray<E> {
    /// Logical element count
    pub size: usize,
    pub data: Vec<E>,
}

pub type UInt8Array = NumberArray<u8>;
pub type UInt16Array = NumberArray<u16>;
pub type UInt32Array = NumberArray<u32>;
pub type UInt64Array = NumberArray<u64>;
pub type U16Fixed16Array = NumberArray<U16Fixed16>;
pub type S15Fixed16Array = NumberArray<S15Fixed16>;
pub type XyzArray = NumberArray<XyzNumber>;

impl<E: ArrayElement> NumberArray<E> {
    pub fn from_values(values: &[E]) -> Self {
        Self {
            size: values.len(),
            data: values.to_vec(),
        }
    }
}

impl XyzArray {
    /// Single-entry XYZ tag, as used for colorants and white points.
    pub fn single(xyz: XyzNumber) -> Self {
        Self::from_values(&[xyz])
    }
}

impl S15Fixed16Array {
    pub fn from_f64(values: &[f64]) -> Self {
        Self {
            size: values.len(),
            data: values.iter().map(|&v| S15Fixed16(v)).collect(),
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|v| v.0).collect()
    }

    /// Nine values in row-major order, as stored by `chad` and `arts`.
    pub fn from_matrix(m: &Matrix3x3) -> Self {
        Self::from_f64(&m.to_row_major())
    }

    pub fn to_matrix(&self) -> Option<Matrix3x3> {
        if self.data.len() != 9 {
            return None;
        }
        let mut v = [0.0; 9];
        for (dst, src) in v.iter_mut().zip(&self.data) {
            *dst = src.0;
        }
        Some(Matrix3x3::from_row_major(&v))
    }
}

impl<E: ArrayElement> TagType for NumberArray<E> {
    fn type_signature(&self) -> TypeSignature {
        E::TYPE
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE, sat_mul(sat_u32(self.size), E::SIZE as u32))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        self.size = element_count(body.len(), 0, E::SIZE)?;
        self.allocate()?;
        let mut r = ByteReader::new(body);
        for v in self.data.iter_mut() {
            *v = E::read(&mut r)?;
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        for &v in self.data.iter().take(self.size) {
            v.write(w)?;
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "{} array:", E::TYPE)?;
        writeln!(out, "  No. elements = {}", self.size)?;
        let shown = if verbose >= 2 { self.size } else { self.size.min(4) };
        for (i, v) in self.data.iter().take(shown).enumerate() {
            writeln!(out, "    {}: {}", i, v)?;
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.data, self.size)?;
        Ok(())
    }
}
