use std::{fs, path::PathBuf};

use tempfile::tempdir;

use sopwright_cli::{Args, run};

/// Collects all .bpmn files from a directory
fn collect_bpmn_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("bpmn")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

/// Demos are at workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        log_level: "off".to_string(),
        ..Args::default()
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_bpmn_files(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir.path().join(format!(
            "{}.docx",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args(demo_path, output_path.clone())) {
            Ok(()) => {
                let bytes = fs::read(&output_path).expect("Output file is written");
                assert!(bytes.starts_with(b"PK"), "{} is not a zip package", output_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_bpmn_files(demos_path().join("errors"));

    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.docx",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args(demo_path, output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_field_overrides_reach_the_document() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("purchase_request.bpmn");
    let output = temp_dir.path().join("purchase_request.docx");

    let args = Args {
        fields: vec!["process_owner=Head of Procurement".to_string()],
        ..args(&input, output.clone())
    };
    run(&args).expect("Rendering succeeds");

    assert!(fs::metadata(&output).expect("Output file is written").len() > 0);
}

#[test]
fn e2e_malformed_override_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("purchase_request.bpmn");

    let args = Args {
        fields: vec!["process_owner".to_string()],
        ..args(&input, temp_dir.path().join("out.docx"))
    };

    assert!(run(&args).is_err());
}
