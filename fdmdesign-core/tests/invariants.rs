//! Contract Invariant Tests
//!
//! These tests verify the guarantees downstream consumers rely on.

use std::fs;
use std::path::Path;

use fdmdesign_core::{
    classify, infer, score, Corrector, Decision, DesignPipeline, Evaluator, Family,
    FamilyTemplate, LoadClass, ParameterRecord, PipelineError, RenderConfig, Renderer,
    StrengthLabel, TemplateRegistry,
    pipeline::{DECISION_FILE, MANIFEST_FILE},
};

const REQUESTS: &[&str] = &[
    "Hook to hang headphones, strong",
    "toothbrush holder with 5 slots",
    "tall stand for bed, narrow",
    "heavy tablet stand for my desk",
    "storage box",
    "tooth brush cup for 2, heavy load",
    "upright support for a bed tablet",
    "",
    "ÜBER STRONG HANGER",
];

#[test]
fn invariant_hook_cues_classify_as_hook() {
    for text in ["hook", "a HOOK for keys", "hang my coat", "wall hanger, heavy"] {
        assert_eq!(classify(text), Family::Hook, "{text}");
    }
}

#[test]
fn invariant_score_in_range_and_label_consistent() {
    let families = [Family::Container, Family::Hook, Family::Stand];
    let walls = [0.0, 1.0, 1.9, 2.0, 4.0];
    let heights = [0.0, 50.0, 120.0, 150.0, 400.0];
    let angles = [0.0, 60.0, 66.0, 90.0];

    for family in families {
        for wall in walls {
            for height in heights {
                for angle in angles {
                    for load in [LoadClass::Normal, LoadClass::High] {
                        let p = ParameterRecord { wall, height, angle, load, ..Default::default() };
                        let s = score(family, &p);
                        assert!(s.score <= 100);
                        let expected = match s.score {
                            85..=100 => StrengthLabel::Excellent,
                            70..=84 => StrengthLabel::Good,
                            50..=69 => StrengthLabel::Fair,
                            _ => StrengthLabel::Weak,
                        };
                        assert_eq!(s.label, expected);
                    }
                }
            }
        }
    }
}

#[test]
fn invariant_pipeline_is_idempotent() {
    let pipeline = DesignPipeline::default();
    for text in REQUESTS {
        assert_eq!(pipeline.decide(text), pipeline.decide(text));
    }
}

#[test]
fn invariant_corrector_floors_wall_and_stand_angle() {
    let corrector = Corrector::new();
    for wall in [0.0, 0.5, 1.2, 1.99, 2.0, 3.0] {
        for angle in [10.0, 60.0, 65.0, 65.5, 70.0, 120.0] {
            let mut p = ParameterRecord { wall, angle, ..Default::default() };
            corrector.correct(Family::Stand, &mut p);
            assert!(p.wall >= 2.0);
            assert!(p.angle <= 65.0);
            if angle > 65.0 {
                assert_eq!(p.angle, 60.0);
            }
        }
    }
}

#[test]
fn scenario_strong_headphone_hook() {
    let d = DesignPipeline::default().decide("Hook to hang headphones, strong");
    assert_eq!(d.family, Family::Hook);
    assert_eq!(d.params.load, LoadClass::High);
    assert_eq!(d.params.wall, 6.0);
    assert_eq!(d.params.width, 90.0);
    assert_eq!(d.params.angle, 60.0);
    assert!(d.approved);
    assert_eq!(d.strength.score, 95);
    assert_eq!(d.strength.label, StrengthLabel::Excellent);
}

#[test]
fn scenario_toothbrush_holder_stages() {
    let text = "toothbrush holder with 5 slots";
    let family = classify(text);
    assert_eq!(family, Family::Container);

    let inferred = infer(family, text);
    assert_eq!(
        (inferred.height, inferred.width, inferred.depth, inferred.wall, inferred.slots, inferred.drain),
        (120.0, 60.0, 60.0, 3.0, 5, 1)
    );

    // Ratio 2.0 sits on the evaluator threshold but above the scorer's.
    assert!(Evaluator::new().evaluate(family, &inferred).approved);
    let s = score(family, &inferred);
    assert_eq!(s.score, 70);
    assert_eq!(s.label, StrengthLabel::Good);
}

#[test]
fn scenario_bed_stand_corrected() {
    let d = DesignPipeline::default().decide("tall stand for bed, narrow");
    assert_eq!(d.family, Family::Stand);
    assert_eq!(d.params.angle, 60.0);
    assert_eq!(d.corrections.len(), 1);
    assert!(d.approved);
    assert!(!d.reasons.iter().any(|r| r.contains("Overhang")));
}

#[test]
fn invariant_slot_scan_last_digit_wins() {
    // Preserved behaviour: "2" appears first, "4" is scanned later and wins.
    let p = infer(Family::Container, "toothbrush rack, 2 adults 4 kids");
    assert_eq!(p.slots, 4);
}

#[test]
fn invariant_artifact_parses_back() {
    let pipeline = DesignPipeline::default();
    for text in REQUESTS {
        let decision = pipeline.decide(text);
        assert_eq!(Decision::parse_artifact(&decision.to_artifact()).unwrap(), decision);
    }
}

#[test]
fn invariant_missing_template_leaves_decision_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = TemplateRegistry::new();
    registry.register(FamilyTemplate::new(Family::Container, "height = 0;\n"));
    let renderer = Renderer::new(RenderConfig {
        compiler: "/nonexistent/openscad".into(),
        ..Default::default()
    });
    let pipeline = DesignPipeline::new(registry, renderer);

    // Stale outputs from an earlier run must not survive.
    fs::write(dir.path().join("model.stl"), "stale").unwrap();

    let err = pipeline.run("hook for a coat", dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::TemplateNotFound(Family::Hook)));

    let decision = read_decision(dir.path());
    assert_eq!(decision.family, Family::Hook);
    assert!(decision.approved);
    assert!(!dir.path().join("model.stl").exists());
    assert!(!dir.path().join(MANIFEST_FILE).exists());
}

#[test]
fn invariant_render_failure_leaves_decision_only() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Renderer::new(RenderConfig {
        compiler: "/nonexistent/openscad".into(),
        ..Default::default()
    });
    let pipeline = DesignPipeline::new(TemplateRegistry::builtin(), renderer);

    let err = pipeline.run("storage box", dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Render(_)));
    assert!(err.to_string().contains("Render failed"));

    assert!(read_decision(dir.path()).approved);
    assert!(!dir.path().join("model.stl").exists());
}

#[cfg(unix)]
#[test]
fn invariant_approved_run_renders_and_records_manifest() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let compiler = dir.path().join("fake-openscad.sh");
    fs::write(&compiler, "#!/bin/sh\ncp \"$3\" \"$2\"\n").unwrap();
    fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

    let out = dir.path().join("output");
    let renderer = Renderer::new(RenderConfig {
        compiler: compiler.to_string_lossy().into_owned(),
        ..Default::default()
    });
    let pipeline = DesignPipeline::new(TemplateRegistry::builtin(), renderer);

    let run = pipeline.run("Hook to hang headphones, strong", &out).unwrap();
    let mesh = run.mesh.expect("approved run renders");

    let source = fs::read_to_string(&mesh.source_path).unwrap();
    assert!(source.contains("width = 90;"));
    assert!(source.contains("load = \"high\";"));
    assert!(mesh.mesh_path.exists());

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&run.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["family"], "hook");
    assert_eq!(manifest["mesh_hash"], mesh.hash.as_str());

    // A second run over the same directory hashes the decision identically.
    let again = pipeline.run("Hook to hang headphones, strong", &out).unwrap();
    assert_eq!(again.manifest.decision_hash, run.manifest.decision_hash);
    assert_ne!(again.manifest.id, run.manifest.id);
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_run_always_evaluates() {
    use fdmdesign_core::validation::{get_evaluation_call_count, reset_evaluation_call_count};

    reset_evaluation_call_count();
    let dir = tempfile::tempdir().unwrap();
    let renderer = Renderer::new(RenderConfig {
        compiler: "/nonexistent/openscad".into(),
        ..Default::default()
    });
    let pipeline = DesignPipeline::new(TemplateRegistry::builtin(), renderer);
    let _ = pipeline.run("storage box", dir.path());
    assert!(get_evaluation_call_count() >= 1);
}

fn read_decision(dir: &Path) -> Decision {
    Decision::parse_artifact(&fs::read_to_string(dir.join(DECISION_FILE)).unwrap()).unwrap()
}
