//! Design Pipeline - Single Entry Point
//!
//! text → classify → infer → correct → evaluate → score → artifact → render.
//! No stage revisits an earlier one. Rendering only happens on approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::correction::Corrector;
use crate::decision::Decision;
use crate::family::{classify, Family};
use crate::hashing::compute_decision_hash;
use crate::inference::infer;
use crate::render::{RenderError, RenderedMesh, Renderer};
use crate::strength::score;
use crate::templates::TemplateRegistry;
use crate::validation::Evaluator;
use crate::ENGINE_VERSION;

pub const DECISION_FILE: &str = "decision.txt";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Template not found for family: {0}")]
    TemplateNotFound(Family),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Io { path: path.to_path_buf(), source }
}

/// Audit record written next to the artifacts of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub request: String,
    pub family: Family,
    pub approved: bool,
    pub decision_hash: String,
    pub mesh_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DesignRun {
    pub decision: Decision,
    pub decision_path: PathBuf,
    pub mesh: Option<RenderedMesh>,
    pub manifest: RunManifest,
    pub manifest_path: PathBuf,
}

/// The design pipeline - single entry point for all design requests
pub struct DesignPipeline {
    registry: TemplateRegistry,
    corrector: Corrector,
    evaluator: Evaluator,
    renderer: Renderer,
}

impl DesignPipeline {
    pub fn new(registry: TemplateRegistry, renderer: Renderer) -> Self {
        Self {
            registry,
            corrector: Corrector::new(),
            evaluator: Evaluator::new(),
            renderer,
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Run the decision stages. Pure: identical text gives an identical decision.
    pub fn decide(&self, text: &str) -> Decision {
        let family = classify(text);
        let mut params = infer(family, text);
        let corrections = self.corrector.correct(family, &mut params);
        let evaluation = self.evaluator.evaluate(family, &params);
        let strength = score(family, &params);

        tracing::info!(
            %family,
            approved = evaluation.approved,
            corrections = corrections.len(),
            score = strength.score,
            "design decided"
        );

        Decision {
            family,
            approved: evaluation.approved,
            reasons: evaluation.reasons(),
            corrections: corrections.into_iter().map(|c| c.description).collect(),
            params,
            strength,
        }
    }

    /// Decide, write the decision artifact, and render the mesh when approved.
    ///
    /// Stale artifacts from a previous run are removed first, so a render
    /// failure always leaves the decision without a mesh beside it.
    pub fn run(&self, text: &str, output_dir: &Path) -> Result<DesignRun, PipelineError> {
        fs::create_dir_all(output_dir).map_err(io_error(output_dir))?;

        let decision_path = output_dir.join(DECISION_FILE);
        let manifest_path = output_dir.join(MANIFEST_FILE);
        for stale in [&decision_path, &manifest_path, &self.renderer.mesh_path(output_dir)] {
            match fs::remove_file(stale) {
                Ok(()) => tracing::debug!(path = %stale.display(), "removed stale artifact"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(stale)(e)),
            }
        }

        let decision = self.decide(text);
        fs::write(&decision_path, decision.to_artifact()).map_err(io_error(&decision_path))?;

        let mesh = if decision.approved {
            let template = self
                .registry
                .get(decision.family)
                .ok_or(PipelineError::TemplateNotFound(decision.family))?;
            Some(self.renderer.render(template, &decision.params, output_dir)?)
        } else {
            tracing::info!(family = %decision.family, "rejected design, skipping render");
            None
        };

        let manifest = RunManifest {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            request: text.to_string(),
            family: decision.family,
            approved: decision.approved,
            decision_hash: compute_decision_hash(text, &decision, ENGINE_VERSION)?,
            mesh_hash: mesh.as_ref().map(|m| m.hash.clone()),
        };
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .map_err(io_error(&manifest_path))?;

        Ok(DesignRun {
            decision,
            decision_path,
            mesh,
            manifest,
            manifest_path,
        })
    }
}

impl Default for DesignPipeline {
    fn default() -> Self {
        Self::new(TemplateRegistry::builtin(), Renderer::default())
    }
}
