//! Parameter Inference - Cue Table Over Defaults
//!
//! Every adjustment whose cue appears fires, in table order. Later rows
//! overwrite earlier ones. The toothbrush specialization always runs last.

use crate::family::{contains_any, Family, TOOTHBRUSH_CUES};
use crate::params::{LoadClass, ParameterRecord};

/// A substring cue and the mutation it triggers.
#[derive(Clone, Copy)]
pub struct Adjustment {
    pub name: &'static str,
    pub cues: &'static [&'static str],
    pub apply: fn(&mut ParameterRecord),
}

fn high_load(p: &mut ParameterRecord) {
    p.load = LoadClass::High;
    p.wall += 2.0;
    p.width += 10.0;
}

fn tablet_width(p: &mut ParameterRecord) {
    p.width = 120.0;
}

fn bed_angle(p: &mut ParameterRecord) {
    p.angle = 70.0;
}

fn desk_angle(p: &mut ParameterRecord) {
    p.angle = 50.0;
}

pub const ADJUSTMENTS: &[Adjustment] = &[
    Adjustment { name: "load", cues: &["strong", "heavy", "load"], apply: high_load },
    Adjustment { name: "tablet", cues: &["tablet"], apply: tablet_width },
    Adjustment { name: "bed", cues: &["bed"], apply: bed_angle },
    Adjustment { name: "desk", cues: &["desk"], apply: desk_angle },
];

/// Slot counts recognised in toothbrush requests, in scan order.
pub const SLOT_DIGITS: [(char, u32); 4] = [('2', 2), ('3', 3), ('4', 4), ('5', 5)];

const TOOTHBRUSH_SLOTS: u32 = 3;

fn toothbrush_holder(p: &mut ParameterRecord, lowered: &str) {
    p.height = 120.0;
    p.width = 60.0;
    p.depth = 60.0;
    p.wall = 3.0;
    p.slots = TOOTHBRUSH_SLOTS;
    p.drain = 1;

    // No early exit: the highest digit present wins.
    for (digit, slots) in SLOT_DIGITS {
        if lowered.contains(digit) {
            p.slots = slots;
        }
    }
}

/// Build the parameter record for a request.
///
/// The family is accepted for symmetry with the later stages; the current
/// cue table does not branch on it.
pub fn infer(family: Family, text: &str) -> ParameterRecord {
    let lowered = text.to_lowercase();
    let mut params = ParameterRecord::default();

    for adjustment in ADJUSTMENTS {
        if contains_any(&lowered, adjustment.cues) {
            tracing::debug!(adjustment = adjustment.name, %family, "inference cue matched");
            (adjustment.apply)(&mut params);
        }
    }

    if contains_any(&lowered, TOOTHBRUSH_CUES) {
        tracing::debug!(%family, "toothbrush specialization applied");
        toothbrush_holder(&mut params, &lowered);
    }

    params
}
