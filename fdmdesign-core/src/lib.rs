//! FDM Design Core - Manufacturable Design Decisions
//!
//! # The Rules
//! 1. Every request resolves to a family
//! 2. Cues adjust, defaults ground
//! 3. Corrections run once, in order
//! 4. Every manufacturability rule is evaluated
//! 5. Identical text, identical decision
//! 6. Only approved designs are rendered

pub mod family;
pub mod params;
pub mod inference;
pub mod correction;
pub mod validation;
pub mod strength;
pub mod decision;
pub mod templates;
pub mod hashing;
pub mod render;
pub mod pipeline;

pub use family::{classify, Family};
pub use params::{LoadClass, ParameterRecord};
pub use inference::infer;
pub use correction::{Correction, CorrectionRule, Corrector};
pub use validation::{Evaluation, Evaluator, ManufacturabilityRule, ManufacturabilityViolation};
pub use strength::{score, StrengthLabel, StrengthScore};
pub use decision::{ArtifactError, Decision};
pub use templates::{FamilyTemplate, TemplateRegistry};
pub use hashing::{canonical_json, compute_decision_hash, sha256_hex};
pub use render::{RenderConfig, RenderError, RenderedMesh, Renderer};
pub use pipeline::{DesignPipeline, DesignRun, PipelineError, RunManifest};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
