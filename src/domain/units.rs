//! Volume units. Stored values are always GJ; m³ is display-only.

use std::fmt;
use std::str::FromStr;

/// Cubic metres per gigajoule.
pub const GJ_TO_M3: f64 = 26.853;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeUnit {
    #[default]
    Gj,
    CubicMetres,
}

impl VolumeUnit {
    /// Convert a GJ quantity into this unit.
    pub fn from_gj(self, gj: f64) -> f64 {
        match self {
            VolumeUnit::Gj => gj,
            VolumeUnit::CubicMetres => gj * GJ_TO_M3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VolumeUnit::Gj => "GJ",
            VolumeUnit::CubicMetres => "m³",
        }
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VolumeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gj" => Ok(VolumeUnit::Gj),
            "m3" | "m³" => Ok(VolumeUnit::CubicMetres),
            other => Err(format!("unknown unit '{other}', expected gj or m3")),
        }
    }
}
