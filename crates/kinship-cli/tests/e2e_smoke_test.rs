use std::{fs, path::PathBuf};

use tempfile::tempdir;

use kinship_cli::{Args, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        drop_disconnected: false,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_json_files(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir.path().join(format!(
            "{}.layout.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args_for(demo_path, output_path.clone())) {
            Ok(_) => {
                let written = fs::read_to_string(&output_path).unwrap();
                let value: serde_json::Value = serde_json::from_str(&written).unwrap();
                assert!(value["annotations"].is_object());
                assert!(value["edges"].is_array());
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
    let error_demos = collect_json_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args_for(demo_path, output_path.clone())).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(!output_path.exists(), "no partial layout may be written");
    }

    assert!(
        unexpectedly_succeeded.is_empty(),
        "error demos succeeded: {unexpectedly_succeeded:?}"
    );
}

#[test]
fn e2e_drop_disconnected() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("blended_family.json");

    let kept = run(&args_for(&input, temp_dir.path().join("kept.json"))).unwrap();
    assert!(kept.lookup("lone").is_some());

    let mut args = args_for(&input, temp_dir.path().join("dropped.json"));
    args.drop_disconnected = true;
    let dropped = run(&args).unwrap();
    assert!(dropped.lookup("lone").is_none());
    assert_eq!(
        dropped.pedigree().individual_count(),
        kept.pedigree().individual_count() - 1
    );
}

#[test]
fn e2e_explicit_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[layout]\nindividual_width = 60.0\n").unwrap();

    let input = demos_path().join("three_person.json");
    let default = run(&args_for(&input, temp_dir.path().join("default.json"))).unwrap();

    let mut args = args_for(&input, temp_dir.path().join("wide.json"));
    args.config = Some(config_path.to_string_lossy().to_string());
    let wide = run(&args).unwrap();

    assert!(wide.width() > default.width());
}
