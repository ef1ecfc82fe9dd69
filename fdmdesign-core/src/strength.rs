//! Strength Scoring - Penalty Table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::family::Family;
use crate::params::{LoadClass, ParameterRecord};

pub const BASE_SCORE: i32 = 100;
pub const THIN_WALL: f64 = 2.0;
pub const VERY_TALL_RATIO: f64 = 1.8;
pub const TALL_RATIO: f64 = 1.5;
pub const STEEP_STAND_ANGLE: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl StrengthLabel {
    pub fn for_score(score: u8) -> Self {
        match score {
            85.. => Self::Excellent,
            70..=84 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::Weak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Weak => "Weak",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrengthLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Excellent" => Ok(Self::Excellent),
            "Good" => Ok(Self::Good),
            "Fair" => Ok(Self::Fair),
            "Weak" => Ok(Self::Weak),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthScore {
    pub score: u8,
    pub label: StrengthLabel,
}

/// A penalty deducted whenever its predicate holds.
#[derive(Clone, Copy)]
pub struct Penalty {
    pub name: &'static str,
    pub points: i32,
    pub applies: fn(Family, &ParameterRecord) -> bool,
}

// The two ratio bands are disjoint so at most one of them fires.
pub const PENALTIES: &[Penalty] = &[
    Penalty { name: "thin_wall", points: 20, applies: |_, p| p.wall < THIN_WALL },
    Penalty { name: "high_load", points: 5, applies: |_, p| p.load == LoadClass::High },
    Penalty { name: "very_tall", points: 30, applies: |_, p| p.ratio() > VERY_TALL_RATIO },
    Penalty {
        name: "tall",
        points: 15,
        applies: |_, p| p.ratio() > TALL_RATIO && p.ratio() <= VERY_TALL_RATIO,
    },
    Penalty {
        name: "steep_stand",
        points: 15,
        applies: |f, p| f == Family::Stand && p.angle > STEEP_STAND_ANGLE,
    },
];

pub fn score(family: Family, params: &ParameterRecord) -> StrengthScore {
    let deducted: i32 = PENALTIES
        .iter()
        .filter(|penalty| (penalty.applies)(family, params))
        .inspect(|penalty| tracing::debug!(penalty = penalty.name, points = penalty.points, "strength penalty"))
        .map(|penalty| penalty.points)
        .sum();

    let score = (BASE_SCORE - deducted).clamp(0, 100) as u8;
    StrengthScore {
        score,
        label: StrengthLabel::for_score(score),
    }
}
