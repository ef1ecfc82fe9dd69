//! Manufacturability Evaluation - Rules Produce Violations
//!
//! Every rule runs; violations accumulate. Any violation rejects.
//! Thresholds are deliberately looser than the corrector's.

use serde::{Deserialize, Serialize};

use crate::family::Family;
use crate::params::ParameterRecord;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static EVALUATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_evaluation_call_count() -> u32 {
    EVALUATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_evaluation_call_count() {
    EVALUATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

pub const MAX_OVERHANG_ANGLE: f64 = 65.0;
pub const MIN_PRINTABLE_WALL: f64 = 1.2;
pub const MAX_STABLE_RATIO: f64 = 2.0;

pub const APPROVAL_REASON: &str = "Self-supporting geometry, no supports required";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturabilityViolation {
    pub rule: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub approved: bool,
    pub violations: Vec<ManufacturabilityViolation>,
}

impl Evaluation {
    /// Rejection messages in rule order, or the single approval reason.
    pub fn reasons(&self) -> Vec<String> {
        if self.approved {
            vec![APPROVAL_REASON.to_string()]
        } else {
            self.violations.iter().map(|v| v.message.clone()).collect()
        }
    }
}

pub trait ManufacturabilityRule {
    fn name(&self) -> &'static str;
    fn evaluate(&self, family: Family, params: &ParameterRecord) -> Option<ManufacturabilityViolation>;
}

// --- Concrete Rules ---

pub struct OverhangRule;

impl ManufacturabilityRule for OverhangRule {
    fn name(&self) -> &'static str { "overhang" }

    fn evaluate(&self, family: Family, params: &ParameterRecord) -> Option<ManufacturabilityViolation> {
        if family != Family::Stand || params.angle <= MAX_OVERHANG_ANGLE {
            return None;
        }
        Some(ManufacturabilityViolation {
            rule: self.name().to_string(),
            message: "Overhang angle too steep".to_string(),
            expected: Some(format!("<= {}°", MAX_OVERHANG_ANGLE)),
            actual: Some(format!("{}°", params.angle)),
        })
    }
}

pub struct WallThicknessRule;

impl ManufacturabilityRule for WallThicknessRule {
    fn name(&self) -> &'static str { "wall_thickness" }

    fn evaluate(&self, _family: Family, params: &ParameterRecord) -> Option<ManufacturabilityViolation> {
        if params.wall >= MIN_PRINTABLE_WALL {
            return None;
        }
        Some(ManufacturabilityViolation {
            rule: self.name().to_string(),
            message: "Wall too thin for FDM printing".to_string(),
            expected: Some(format!(">= {} mm", MIN_PRINTABLE_WALL)),
            actual: Some(format!("{} mm", params.wall)),
        })
    }
}

pub struct StabilityRule;

impl ManufacturabilityRule for StabilityRule {
    fn name(&self) -> &'static str { "stability" }

    fn evaluate(&self, _family: Family, params: &ParameterRecord) -> Option<ManufacturabilityViolation> {
        let ratio = params.ratio();
        if ratio <= MAX_STABLE_RATIO {
            return None;
        }
        Some(ManufacturabilityViolation {
            rule: self.name().to_string(),
            message: "Tall & narrow geometry unstable".to_string(),
            expected: Some(format!("height/width <= {}", MAX_STABLE_RATIO)),
            actual: Some(format!("{:.3}", ratio)),
        })
    }
}

/// Evaluator runs every rule in order, without short-circuiting
pub struct Evaluator {
    rules: Vec<Box<dyn ManufacturabilityRule>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(OverhangRule),
                Box::new(WallThicknessRule),
                Box::new(StabilityRule),
            ],
        }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn evaluate(&self, family: Family, params: &ParameterRecord) -> Evaluation {
        #[cfg(feature = "test-hooks")]
        EVALUATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let violations: Vec<_> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(family, params))
            .collect();

        for v in &violations {
            tracing::debug!(rule = %v.rule, message = %v.message, "manufacturability violation");
        }

        Evaluation {
            approved: violations.is_empty(),
            violations,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
