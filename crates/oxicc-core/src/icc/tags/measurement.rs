//! Measurement conditions: meas and view.

use std::fmt;

use super::{Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::{TypeSignature, XyzNumber};

fn observer_name(v: u32) -> &'static str {
    match v {
        1 => "CIE 1931 2 degree",
        2 => "CIE 1964 10 degree",
        _ => "Unknown",
    }
}

fn geometry_name(v: u32) -> &'static str {
    match v {
        1 => "0/45 or 45/0",
        2 => "0/d or d/0",
        _ => "Unknown",
    }
}

fn illuminant_name(v: u32) -> &'static str {
    match v {
        1 => "D50",
        2 => "D65",
        3 => "D93",
        4 => "F2",
        5 => "D55",
        6 => "A",
        7 => "Equi-Power (E)",
        8 => "F8",
        _ => "Unknown",
    }
}

/// measurementType
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Standard observer encoding
    pub observer: u32,
    /// Absolute XYZ of the measurement backing
    pub backing: XyzNumber,
    /// Measurement geometry encoding
    pub geometry: u32,
    /// Flare as a fraction, u16Fixed16
    pub flare: f64,
    /// Standard illuminant encoding
    pub illuminant: u32,
}

impl TagType for Measurement {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::MEASUREMENT
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 28
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        TAG_HEADER_SIZE + 28
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.observer = r.u32()?;
        self.backing = r.xyz()?;
        self.geometry = r.u32()?;
        self.flare = r.u16f16()?;
        self.illuminant = r.u32()?;
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.u32(self.observer);
        w.xyz(self.backing)?;
        w.u32(self.geometry);
        w.u16f16(self.flare)?;
        w.u32(self.illuminant);
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, _verbose: u32) -> fmt::Result {
        writeln!(out, "Measurement:")?;
        writeln!(out, "  Standard Observer = {}", observer_name(self.observer))?;
        writeln!(out, "  XYZ for Measurement Backing = {}", self.backing)?;
        writeln!(out, "  Measurement Geometry = {}", geometry_name(self.geometry))?;
        writeln!(out, "  Measurement Flare = {:.3} %", self.flare * 100.0)?;
        writeln!(out, "  Standard Illuminant = {}", illuminant_name(self.illuminant))
    }

    fn allocate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// viewingConditionsType
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewingConditions {
    /// Absolute XYZ of the illuminant in cd/m^2
    pub illuminant: XyzNumber,
    /// Absolute XYZ of the surround in cd/m^2
    pub surround: XyzNumber,
    /// Standard illuminant encoding
    pub std_illuminant: u32,
}

impl TagType for ViewingConditions {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::VIEWING_CONDITIONS
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 28
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        TAG_HEADER_SIZE + 28
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.illuminant = r.xyz()?;
        self.surround = r.xyz()?;
        self.std_illuminant = r.u32()?;
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.xyz(self.illuminant)?;
        w.xyz(self.surround)?;
        w.u32(self.std_illuminant);
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, _verbose: u32) -> fmt::Result {
        writeln!(out, "Viewing Conditions:")?;
        writeln!(out, "  XYZ value of Illuminant = {}", self.illuminant)?;
        writeln!(out, "  XYZ value of Surround = {}", self.surround)?;
        writeln!(out, "  Illuminant type = {}", illuminant_name(self.std_illuminant))
    }

    fn allocate(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::Tag;

    #[test]
    fn test_measurement_roundtrip() {
        let meas = Measurement {
            observer: 1,
            backing: XyzNumber::new(0.0, 0.0, 0.0),
            geometry: 2,
            flare: 0.01,
            illuminant: 1,
        };
        let ctx = TagContext::default();
        let bytes = meas.to_bytes(&ctx).unwrap();
        assert_eq!(bytes.len(), 36);
        let back = Tag::from_bytes(&bytes, &ctx, false).unwrap();
        let back = back.as_measurement().unwrap();
        assert_eq!(back.geometry, 2);
        assert!((back.flare - 0.01).abs() < 1.0 / 65536.0);
    }

    #[test]
    fn test_view_dump() {
        let view = ViewingConditions {
            illuminant: XyzNumber::new(19.6445, 20.3718, 16.8089),
            surround: XyzNumber::new(3.92889, 4.07439, 3.36179),
            std_illuminant: 1,
        };
        let mut out = String::new();
        view.dump(&mut out, 1);
        assert!(out.contains("Illuminant type = D50"));
    }
}
