//! Auto-Correction - Single Ordered Pass
//!
//! Each rule sees the record as left by the previous one.
//! There is no second pass; a correction is never re-checked.

use serde::{Deserialize, Serialize};

use crate::family::Family;
use crate::params::ParameterRecord;

/// Stand angles above this are clamped.
pub const STAND_ANGLE_LIMIT: f64 = 65.0;
pub const STAND_ANGLE_TARGET: f64 = 60.0;
pub const MIN_WALL: f64 = 2.0;
pub const STABILITY_RATIO: f64 = 1.8;
pub const STABILITY_WIDENING: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub rule: String,
    pub description: String,
}

pub trait CorrectionRule {
    fn name(&self) -> &'static str;
    /// Mutate the record if the rule fires and describe what changed.
    fn correct(&self, family: Family, params: &mut ParameterRecord) -> Option<Correction>;
}

pub struct StandAngleClamp;

impl CorrectionRule for StandAngleClamp {
    fn name(&self) -> &'static str { "stand_angle" }

    fn correct(&self, family: Family, params: &mut ParameterRecord) -> Option<Correction> {
        if family != Family::Stand || params.angle <= STAND_ANGLE_LIMIT {
            return None;
        }
        let old = params.angle;
        params.angle = STAND_ANGLE_TARGET;
        Some(Correction {
            rule: self.name().to_string(),
            description: format!("Angle auto-reduced {}° → {}°", old, params.angle),
        })
    }
}

pub struct MinimumWall;

impl CorrectionRule for MinimumWall {
    fn name(&self) -> &'static str { "min_wall" }

    fn correct(&self, _family: Family, params: &mut ParameterRecord) -> Option<Correction> {
        if params.wall >= MIN_WALL {
            return None;
        }
        let old = params.wall;
        params.wall = MIN_WALL;
        Some(Correction {
            rule: self.name().to_string(),
            description: format!("Wall increased {} → {} mm", old, params.wall),
        })
    }
}

/// Flat widening, not a clamp to the ratio.
pub struct StabilityWidening;

impl CorrectionRule for StabilityWidening {
    fn name(&self) -> &'static str { "stability_width" }

    fn correct(&self, _family: Family, params: &mut ParameterRecord) -> Option<Correction> {
        if params.ratio() <= STABILITY_RATIO {
            return None;
        }
        let old = params.width;
        params.width += STABILITY_WIDENING;
        Some(Correction {
            rule: self.name().to_string(),
            description: format!("Width increased {} → {} mm for stability", old, params.width),
        })
    }
}

pub struct Corrector {
    rules: Vec<Box<dyn CorrectionRule>>,
}

impl Corrector {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(StandAngleClamp),
                Box::new(MinimumWall),
                Box::new(StabilityWidening),
            ],
        }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn correct(&self, family: Family, params: &mut ParameterRecord) -> Vec<Correction> {
        let mut corrections = vec![];
        for rule in &self.rules {
            if let Some(correction) = rule.correct(family, params) {
                tracing::debug!(rule = rule.name(), description = %correction.description, "correction applied");
                corrections.push(correction);
            }
        }
        corrections
    }
}

impl Default for Corrector {
    fn default() -> Self {
        Self::new()
    }
}
