//! FDM Design CLI - Bridge interface for the presentation layer
//!
//! Commands: decide, generate, show, templates
//! Outputs JSON (or the decision artifact) to stdout, logs to stderr
//! Returns 2 on rejection, 1 on failure

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fdmdesign_core::{
    Decision, DesignPipeline, PipelineError, RenderConfig, Renderer, TemplateRegistry,
};

#[derive(Parser)]
#[command(name = "fdmdesign-cli")]
#[command(about = "FDM Design CLI - Manufacturable 3D design decisions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of <family>.scad templates (built-ins are used if absent)
    #[arg(short, long, env = "FDMDESIGN_TEMPLATES_DIR", default_value = "families")]
    templates_dir: PathBuf,

    /// Directory receiving decision.txt, manifest.json and the mesh
    #[arg(short, long, env = "FDMDESIGN_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Geometry compiler executable
    #[arg(long, env = "OPENSCAD", default_value = "openscad")]
    compiler: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide a design request without rendering
    Decide {
        /// Free-text design request
        text: String,

        /// Print the decision as JSON instead of the KEY=VALUE artifact
        #[arg(long)]
        json: bool,
    },

    /// Decide, write the artifacts, and render the mesh if approved
    Generate {
        /// Free-text design request
        text: String,

        /// Include the mesh as base64 in the JSON output
        #[arg(long)]
        embed_mesh: bool,
    },

    /// Read a decision artifact and print a report
    Show {
        /// Path to decision.txt
        path: PathBuf,
    },

    /// List available family templates
    Templates,
}

fn load_registry(dir: &Path) -> Result<TemplateRegistry, std::io::Error> {
    let registry = TemplateRegistry::load_from_dir(dir)?;
    if registry.is_empty() {
        tracing::info!(dir = %dir.display(), "no templates on disk, using built-ins");
        return Ok(TemplateRegistry::builtin());
    }
    Ok(registry)
}

fn decision_exit(decision: &Decision) -> ExitCode {
    if decision.approved {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)  // Rejected design
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        // Value's Display is compact and cannot fail
        Err(e) => println!("{}", error_json(e)),
    }
}

fn error_json(error: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": error.to_string(),
    })
}

fn unreadable_artifact(path: &Path, error: impl std::fmt::Display) -> String {
    format!("Cannot read decision artifact {}: {}", path.display(), error)
}

fn print_report(decision: &Decision) {
    println!("Geometry family: {}", decision.family);
    println!();
    println!("Parameters:");
    for (name, value) in decision.params.named_values() {
        println!("  - {}: {}", name, value);
    }
    println!();
    if decision.approved {
        println!("Manufacturability: APPROVED (self-supporting)");
    } else {
        println!("Manufacturability: REJECTED");
    }
    for reason in &decision.reasons {
        println!("  - {}", reason);
    }
    println!();
    println!(
        "Structural score: {} / 100 ({})",
        decision.strength.score, decision.strength.label
    );
    if !decision.corrections.is_empty() {
        println!();
        println!("Automatic corrections:");
        for correction in &decision.corrections {
            println!("  - {}", correction);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let registry = match load_registry(&cli.templates_dir) {
        Ok(r) => r,
        Err(e) => {
            print_json(&error_json(format!("Failed to load templates: {}", e)));
            return ExitCode::FAILURE;
        }
    };

    let renderer = Renderer::new(RenderConfig {
        compiler: cli.compiler,
        ..RenderConfig::default()
    });
    let pipeline = DesignPipeline::new(registry, renderer);

    match cli.command {
        Commands::Decide { text, json } => {
            let decision = pipeline.decide(&text);
            if json {
                print_json(&serde_json::json!(decision));
            } else {
                print!("{}", decision.to_artifact());
            }
            decision_exit(&decision)
        }

        Commands::Generate { text, embed_mesh } => match pipeline.run(&text, &cli.output_dir) {
            Ok(run) => {
                let mesh_base64 = match (&run.mesh, embed_mesh) {
                    (Some(mesh), true) => match mesh.read_base64() {
                        Ok(data) => Some(data),
                        Err(e) => {
                            tracing::warn!(error = %e, "could not embed mesh");
                            None
                        }
                    },
                    _ => None,
                };
                print_json(&serde_json::json!({
                    "success": true,
                    "decision": run.decision,
                    "decisionPath": run.decision_path,
                    "mesh": run.mesh,
                    "meshBase64": mesh_base64,
                    "manifest": run.manifest,
                }));
                decision_exit(&run.decision)
            }
            Err(e) => {
                let error = match &e {
                    PipelineError::Render(_) | PipelineError::TemplateNotFound(_) => {
                        format!("Generation failed. {}", e)
                    }
                    _ => e.to_string(),
                };
                print_json(&error_json(error));
                ExitCode::FAILURE
            }
        },

        Commands::Show { path } => {
            let text = match std::fs::read_to_string(&path) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("{}", unreadable_artifact(&path, e));
                    return ExitCode::FAILURE;
                }
            };
            match Decision::parse_artifact(&text) {
                Ok(decision) => {
                    print_report(&decision);
                    decision_exit(&decision)
                }
                Err(e) => {
                    eprintln!("Invalid decision artifact: {}", e);
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Templates => {
            let templates: Vec<_> = pipeline
                .registry()
                .list()
                .iter()
                .map(|t| serde_json::json!({
                    "family": t.family,
                    "path": t.path,
                    "placeholders": t.placeholders(),
                }))
                .collect();
            print_json(&serde_json::json!(templates));
            ExitCode::SUCCESS
        }
    }
}
