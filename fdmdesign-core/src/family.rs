//! Geometry Families - Closed Set, Prioritized Cues
//!
//! Classification is total: every request resolves to exactly one family.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Container,
    Hook,
    Stand,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Container, Family::Hook, Family::Stand];

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Container => "container",
            Family::Hook => "hook",
            Family::Stand => "stand",
        }
    }
}

impl Default for Family {
    fn default() -> Self {
        Self::Container
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown geometry family: {0}")]
pub struct FamilyError(pub String);

impl FromStr for Family {
    type Err = FamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "container" => Ok(Family::Container),
            "hook" => Ok(Family::Hook),
            "stand" => Ok(Family::Stand),
            other => Err(FamilyError(other.to_string())),
        }
    }
}

/// Cue text that selects the toothbrush-holder specialization.
pub const TOOTHBRUSH_CUES: &[&str] = &["toothbrush", "tooth brush"];

/// One row of the priority table: any cue present selects the family.
#[derive(Debug, Clone, Copy)]
pub struct FamilyCue {
    pub name: &'static str,
    pub cues: &'static [&'static str],
    pub family: Family,
}

/// Evaluated top to bottom; the first row with a matching cue wins.
pub const FAMILY_CUES: &[FamilyCue] = &[
    FamilyCue { name: "toothbrush", cues: TOOTHBRUSH_CUES, family: Family::Container },
    FamilyCue { name: "storage", cues: &["container", "box", "cup", "storage"], family: Family::Container },
    FamilyCue { name: "hanging", cues: &["hook", "hang"], family: Family::Hook },
    FamilyCue { name: "support", cues: &["stand", "support", "upright", "hold "], family: Family::Stand },
];

/// Case-insensitive substring test against an already lowercased haystack.
pub(crate) fn contains_any(lowered: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| lowered.contains(cue))
}

/// Map free text to a family. Falls back to `Container` when nothing matches.
pub fn classify(text: &str) -> Family {
    let lowered = text.to_lowercase();
    FAMILY_CUES
        .iter()
        .find(|row| contains_any(&lowered, row.cues))
        .map(|row| {
            tracing::debug!(cue = row.name, family = %row.family, "family cue matched");
            row.family
        })
        .unwrap_or_default()
}
