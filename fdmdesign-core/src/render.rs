//! Render Bridge - External Geometry Compiler
//!
//! Writes the filled template next to the mesh and invokes the compiler
//! synchronously: `<compiler> -o <mesh> <source>`. No timeout, no retry.
//! Success means the mesh file exists afterwards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use crate::hashing::sha256_hex;
use crate::params::ParameterRecord;
use crate::templates::{substitution_map, FamilyTemplate};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write template source {}: {}", .0.display(), .1)]
    WriteSource(PathBuf, #[source] io::Error),

    #[error("Failed to launch geometry compiler '{0}': {1}")]
    Spawn(String, #[source] io::Error),

    #[error("Geometry compiler exited with {status}: {stderr}")]
    CompilerFailed { status: String, stderr: String },

    #[error("Mesh artifact not produced: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Failed to read mesh artifact {}: {}", .0.display(), .1)]
    ReadArtifact(PathBuf, #[source] io::Error),
}

/// Compiler executable and artifact file names. Built from CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub compiler: String,
    pub source_name: String,
    pub mesh_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            compiler: "openscad".to_string(),
            source_name: "model.scad".to_string(),
            mesh_name: "model.stl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMesh {
    pub source_path: PathBuf,
    pub mesh_path: PathBuf,
    pub size_bytes: u64,
    pub hash: String,
}

impl RenderedMesh {
    pub fn read_base64(&self) -> Result<String, RenderError> {
        let data = fs::read(&self.mesh_path)
            .map_err(|e| RenderError::ReadArtifact(self.mesh_path.clone(), e))?;
        Ok(base64::Engine::encode(&base64::engine::general_purpose::STANDARD, data))
    }
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn mesh_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.config.mesh_name)
    }

    pub fn render(
        &self,
        template: &FamilyTemplate,
        params: &ParameterRecord,
        work_dir: &Path,
    ) -> Result<RenderedMesh, RenderError> {
        let source_path = work_dir.join(&self.config.source_name);
        let mesh_path = self.mesh_path(work_dir);

        let source = template.substitute(&substitution_map(params));
        fs::write(&source_path, source)
            .map_err(|e| RenderError::WriteSource(source_path.clone(), e))?;

        tracing::info!(
            compiler = %self.config.compiler,
            family = %template.family,
            mesh = %mesh_path.display(),
            "invoking geometry compiler"
        );

        let output = Command::new(&self.config.compiler)
            .arg("-o")
            .arg(&mesh_path)
            .arg(&source_path)
            .output()
            .map_err(|e| RenderError::Spawn(self.config.compiler.clone(), e))?;

        if !output.status.success() {
            return Err(RenderError::CompilerFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !mesh_path.exists() {
            return Err(RenderError::MissingArtifact(mesh_path));
        }

        let data = fs::read(&mesh_path)
            .map_err(|e| RenderError::ReadArtifact(mesh_path.clone(), e))?;

        Ok(RenderedMesh {
            source_path,
            size_bytes: data.len() as u64,
            hash: sha256_hex(&data),
            mesh_path,
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::family::Family;
    use std::os::unix::fs::PermissionsExt;

    /// A stand-in compiler script; `$2` is the mesh path, `$3` the source.
    fn fake_compiler(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-openscad.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn renderer(compiler: String) -> Renderer {
        Renderer::new(RenderConfig { compiler, ..Default::default() })
    }

    #[test]
    fn test_default_config_targets_openscad() {
        let config = RenderConfig::default();
        assert_eq!(config.compiler, "openscad");
        let renderer = Renderer::new(config);
        assert_eq!(renderer.mesh_path(Path::new("output")), Path::new("output/model.stl"));
    }

    #[test]
    fn test_render_writes_source_and_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = fake_compiler(dir.path(), "cp \"$3\" \"$2\"");
        let template = FamilyTemplate::new(Family::Hook, "width = 0;\nwall = 0;\n");
        let params = ParameterRecord { width: 90.0, wall: 6.0, ..Default::default() };

        let mesh = renderer(compiler).render(&template, &params, dir.path()).unwrap();

        let source = fs::read_to_string(&mesh.source_path).unwrap();
        assert_eq!(source, "width = 90;\nwall = 6;\n");
        assert_eq!(fs::read_to_string(&mesh.mesh_path).unwrap(), source);
        assert_eq!(mesh.size_bytes, source.len() as u64);
        assert_eq!(mesh.hash, sha256_hex(source.as_bytes()));
    }

    #[test]
    fn test_compiler_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = fake_compiler(dir.path(), "echo 'parse error' >&2\nexit 1");
        let template = FamilyTemplate::new(Family::Stand, "width = 0;\n");

        let err = renderer(compiler)
            .render(&template, &ParameterRecord::default(), dir.path())
            .unwrap_err();
        match err {
            RenderError::CompilerFailed { stderr, .. } => assert_eq!(stderr, "parse error"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_mesh_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = fake_compiler(dir.path(), "exit 0");
        let template = FamilyTemplate::new(Family::Container, "width = 0;\n");

        let err = renderer(compiler)
            .render(&template, &ParameterRecord::default(), dir.path())
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingArtifact(_)));
    }

    #[test]
    fn test_missing_compiler_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let template = FamilyTemplate::new(Family::Container, "width = 0;\n");
        let err = renderer("/nonexistent/openscad".into())
            .render(&template, &ParameterRecord::default(), dir.path())
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn(_, _)));
    }
}
