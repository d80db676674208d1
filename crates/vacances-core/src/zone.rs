//! French school-holiday zones.
//!
//! The dataset groups academies into three metropolitan zones plus a set of
//! overseas territories and collectivities, each with its own calendar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A school-holiday zone as labelled by the upstream dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    A,
    B,
    C,
    Corse,
    Guadeloupe,
    Guyane,
    Martinique,
    Mayotte,
    NouvelleCaledonie,
    PolynesieFrancaise,
    Reunion,
    SaintPierreEtMiquelon,
    WallisEtFutuna,
}

impl Zone {
    /// Every zone, in the order they are offered to users.
    pub const ALL: [Zone; 13] = [
        Zone::A,
        Zone::B,
        Zone::C,
        Zone::Corse,
        Zone::Guadeloupe,
        Zone::Guyane,
        Zone::Martinique,
        Zone::Mayotte,
        Zone::NouvelleCaledonie,
        Zone::PolynesieFrancaise,
        Zone::Reunion,
        Zone::SaintPierreEtMiquelon,
        Zone::WallisEtFutuna,
    ];

    /// Returns the label used by the dataset's `zones` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "Zone A",
            Self::B => "Zone B",
            Self::C => "Zone C",
            Self::Corse => "Corse",
            Self::Guadeloupe => "Guadeloupe",
            Self::Guyane => "Guyane",
            Self::Martinique => "Martinique",
            Self::Mayotte => "Mayotte",
            Self::NouvelleCaledonie => "Nouvelle Calédonie",
            Self::PolynesieFrancaise => "Polynésie française",
            Self::Reunion => "Réunion",
            Self::SaintPierreEtMiquelon => "Saint Pierre et Miquelon",
            Self::WallisEtFutuna => "Wallis et Futuna",
        }
    }

    /// Returns true for the three metropolitan zones.
    pub fn is_metropolitan(&self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = ConfigError;

    /// Parses a zone label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Zone::ALL
            .into_iter()
            .find(|zone| zone.as_str().to_lowercase() == wanted)
            .ok_or_else(|| ConfigError::unknown_zone(s))
    }
}

impl Serialize for Zone {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
