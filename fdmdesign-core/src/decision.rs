//! Decision Artifact - Flat KEY=VALUE Contract
//!
//! One key per line, split on the first `=`. Lists are joined with `; `.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::family::{Family, FamilyError};
use crate::params::{ParameterRecord, ParamsParseError};
use crate::strength::{StrengthLabel, StrengthScore};

pub const KEY_FAMILY: &str = "FAMILY";
pub const KEY_APPROVED: &str = "APPROVED";
pub const KEY_PARAMS: &str = "PARAMS";
pub const KEY_CORRECTIONS: &str = "CORRECTIONS";
pub const KEY_REASONS: &str = "REASONS";
pub const KEY_STRENGTH_SCORE: &str = "STRENGTH_SCORE";
pub const KEY_STRENGTH_LABEL: &str = "STRENGTH_LABEL";

const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("Missing key: {0}")]
    MissingKey(&'static str),

    #[error("Malformed line: {0}")]
    MalformedLine(String),

    #[error(transparent)]
    Family(#[from] FamilyError),

    #[error("Invalid approval flag: {0}")]
    InvalidApproval(String),

    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamsParseError),

    #[error("Invalid strength score: {0}")]
    InvalidScore(String),

    #[error("Invalid strength label: {0}")]
    InvalidLabel(String),
}

/// The immutable outcome of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub family: Family,
    pub approved: bool,
    pub params: ParameterRecord,
    pub corrections: Vec<String>,
    pub reasons: Vec<String>,
    pub strength: StrengthScore,
}

impl Decision {
    pub fn to_artifact(&self) -> String {
        let approved = if self.approved { "True" } else { "False" };
        [
            (KEY_FAMILY, self.family.to_string()),
            (KEY_APPROVED, approved.to_string()),
            (KEY_PARAMS, self.params.to_literal()),
            (KEY_CORRECTIONS, self.corrections.join(LIST_SEPARATOR)),
            (KEY_REASONS, self.reasons.join(LIST_SEPARATOR)),
            (KEY_STRENGTH_SCORE, self.strength.score.to_string()),
            (KEY_STRENGTH_LABEL, self.strength.label.to_string()),
        ]
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
    }

    pub fn parse_artifact(text: &str) -> Result<Self, ArtifactError> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for line in text.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ArtifactError::MalformedLine(line.to_string()))?;
            fields.insert(key.trim(), value);
        }

        let get = |key: &'static str| fields.get(key).copied().ok_or(ArtifactError::MissingKey(key));

        let family: Family = get(KEY_FAMILY)?.parse()?;

        let approved_raw = get(KEY_APPROVED)?.trim();
        let approved = match approved_raw.to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => return Err(ArtifactError::InvalidApproval(approved_raw.to_string())),
        };

        let params: ParameterRecord = get(KEY_PARAMS)?.parse()?;

        let score_raw = get(KEY_STRENGTH_SCORE)?.trim();
        let score = score_raw
            .parse::<u8>()
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| ArtifactError::InvalidScore(score_raw.to_string()))?;

        let label: StrengthLabel = get(KEY_STRENGTH_LABEL)?
            .parse()
            .map_err(ArtifactError::InvalidLabel)?;

        Ok(Self {
            family,
            approved,
            params,
            corrections: split_list(get(KEY_CORRECTIONS)?),
            reasons: split_list(get(KEY_REASONS)?),
            strength: StrengthScore { score, label },
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
