//! Materials

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// Error returned when a material name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown material: {0}")]
pub struct UnknownMaterial(pub String);

/// Filament a print job is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(try_from = "String")]
pub enum MaterialKind {
    /// PLA (standard)
    Pla,

    /// PETG (durable)
    Petg,

    /// ABS (heat resistant)
    Abs,
}

impl MaterialKind {
    /// All materials, in the order they are offered.
    pub const ALL: [MaterialKind; 3] = [MaterialKind::Pla, MaterialKind::Petg, MaterialKind::Abs];

    /// Short trade name of the material.
    pub fn code(self) -> &'static str {
        match self {
            MaterialKind::Pla => "PLA",
            MaterialKind::Petg => "PETG",
            MaterialKind::Abs => "ABS",
        }
    }

    /// Human readable description shown next to the code.
    pub fn description(self) -> &'static str {
        match self {
            MaterialKind::Pla => "Standard",
            MaterialKind::Petg => "Durable",
            MaterialKind::Abs => "Heat Resistant",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MaterialKind {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialKind::ALL
            .into_iter()
            .find(|material| material.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMaterial(s.to_string()))
    }
}

impl TryFrom<String> for MaterialKind {
    type Error = UnknownMaterial;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
