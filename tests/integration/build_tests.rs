use crate::common::{remove_output, Fixture, SUCCEEDING_BUNDLER};
use lambda_pack::core::{BuildOptions, BuildOutcome, BuildRequest, BundleMode, LambdaBundleService};
use lambda_pack::infrastructure::{strategy_for, ProcessBundleExecutor};
use lambda_pack::PackError;
use std::path::PathBuf;
use std::sync::Arc;

fn service(fixture: &Fixture, mode: BundleMode, bundler_body: &str) -> LambdaBundleService {
    LambdaBundleService::new(strategy_for(mode), fixture.locator(), Arc::new(ProcessBundleExecutor))
        .with_bundler(fixture.bundler(bundler_body))
}

fn request(fixture: &Fixture, entry: &str, exclude: &[&str]) -> lambda_pack::Result<BuildRequest> {
    let options = BuildOptions {
        entry: PathBuf::from(entry),
        project_root: fixture.root(),
        runtime: Some("nodejs12.x".to_string()),
        exclude: exclude.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    };
    BuildRequest::from_options(&options, None)
}

#[tokio::test]
async fn test_pipeline_build_produces_consolidated_entry() {
    let fixture = Fixture::new();
    let service = service(&fixture, BundleMode::Webpack, SUCCEEDING_BUNDLER);

    let outcome = service.build(&request(&fixture, "index.js", &[]).unwrap()).await.unwrap();
    let BuildOutcome::Success { output_dir, handler } = outcome else {
        panic!("expected a successful build");
    };

    assert_eq!(handler.to_string(), "main.handler");
    assert!(output_dir.join("main.js").is_file());
    assert!(!output_dir.join("webpack.config.js").exists(), "config is removed after success");

    remove_output(&output_dir);
}

#[tokio::test]
async fn test_direct_build_mirrors_entry_path() {
    let fixture = Fixture::new();
    let service = service(&fixture, BundleMode::Rollup, SUCCEEDING_BUNDLER);

    let outcome = service
        .build(&request(&fixture, "events/foo.js", &[]).unwrap())
        .await
        .unwrap();
    let BuildOutcome::Success { output_dir, handler } = outcome else {
        panic!("expected a successful build");
    };

    assert_eq!(handler.to_string(), "events/foo.handler");
    remove_output(&output_dir);
}

#[tokio::test]
async fn test_every_build_gets_a_fresh_directory() {
    let fixture = Fixture::new();
    // Each run stamps its bundle with its own process id.
    let body = format!("{}echo \"// build $$\" >> main.js\n", SUCCEEDING_BUNDLER);
    let service = service(&fixture, BundleMode::Webpack, &body);
    let request = request(&fixture, "index.js", &["pg-native"]).unwrap();

    let mut dirs = Vec::new();
    for _ in 0..2 {
        match service.build(&request).await.unwrap() {
            BuildOutcome::Success { output_dir, .. } => dirs.push(output_dir),
            BuildOutcome::Failure { diagnostics, .. } => panic!("build failed: {}", diagnostics),
        }
    }

    assert_ne!(dirs[0], dirs[1]);
    assert!(!dirs[0].starts_with(fixture.root()));

    // Only the bundle itself is left: no config, no stand-in module.
    for dir in &dirs {
        assert_eq!(listing(dir), vec!["main.js".to_string()]);
    }
    let first = std::fs::read_to_string(dirs[0].join("main.js")).unwrap();
    let second = std::fs::read_to_string(dirs[1].join("main.js")).unwrap();
    assert_ne!(first, second);

    dirs.iter().for_each(|d| remove_output(d));
}

fn listing(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_failure_reports_exit_code_output_and_config() {
    let fixture = Fixture::new();
    let seen = fixture.root().join("seen.config.js");
    let service = service(
        &fixture,
        BundleMode::Webpack,
        &format!(
            "cp \"$2\" '{}'\necho 'partial progress'\necho \"Module not found: 'left-pad'\" >&2\nexit 2",
            seen.display()
        ),
    );

    let outcome = service.build(&request(&fixture, "index.js", &[]).unwrap()).await.unwrap();
    let BuildOutcome::Failure {
        exit_code,
        diagnostics,
        config_snapshot,
    } = outcome
    else {
        panic!("expected a failed build");
    };

    assert_eq!(exit_code, 2);
    assert_eq!(diagnostics, "partial progress\nModule not found: 'left-pad'");
    assert!(config_snapshot.contains("module.exports = {"));
    assert!(config_snapshot.contains(&fixture.root().join("index.js").display().to_string()));
    assert_eq!(config_snapshot, std::fs::read_to_string(&seen).unwrap());
}

#[tokio::test]
async fn test_exclusion_stand_in_exists_while_bundling() {
    let fixture = Fixture::new();
    let body = format!("[ -f noop.js ] || exit 5\ngrep -q 'pg-native|encoding' \"$2\" || exit 6\n{}", SUCCEEDING_BUNDLER);
    let service = service(&fixture, BundleMode::Webpack, &body);

    let request = request(&fixture, "index.js", &["pg-native", "encoding"]).unwrap();
    let outcome = service.build(&request).await.unwrap();
    let BuildOutcome::Success { output_dir, .. } = outcome else {
        panic!("expected a successful build");
    };

    assert!(!output_dir.join("noop.js").exists());
    remove_output(&output_dir);
}

#[tokio::test]
async fn test_typed_entry_rejected_in_direct_mode_before_spawning() {
    let fixture = Fixture::new();
    let marker = fixture.root().join("spawned");
    let service = service(
        &fixture,
        BundleMode::Rollup,
        &format!("touch '{}'", marker.display()),
    );

    let err = service
        .build(&request(&fixture, "typed.ts", &[]).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, PackError::InvalidEntryExtension { .. }));
    assert!(!marker.exists());
}

#[test]
fn test_input_errors_surface_before_any_build() {
    let fixture = Fixture::new();

    assert!(matches!(
        request(&fixture, "handler.py", &[]).unwrap_err(),
        PackError::InvalidEntryExtension { .. }
    ));
    assert!(matches!(
        request(&fixture, "missing.js", &[]).unwrap_err(),
        PackError::EntryNotFound(_)
    ));
    assert!(matches!(
        request(&fixture, "index.js", &["(unclosed"]).unwrap_err(),
        PackError::InvalidExclusionPattern { .. }
    ));
}
