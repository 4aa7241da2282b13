use crate::common::{remove_output, Fixture, SUCCEEDING_BUNDLER};
use assert_cmd::Command;
use lambda_pack::core::FunctionDescriptor;
use predicates::prelude::*;
use std::path::Path;

fn lambda_pack(fixture: &Fixture, bundler: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lambda-pack").unwrap();
    cmd.env("NO_COLOR", "1").env("RUST_LOG", "lambda_pack=info");
    cmd.arg("build")
        .arg("--root")
        .arg(fixture.root())
        .arg("--plugins-dir")
        .arg(fixture.root())
        .arg("--bundler")
        .arg(bundler)
        .arg("--runtime")
        .arg("nodejs12.x");
    cmd
}

fn descriptor_from(stdout: &[u8]) -> FunctionDescriptor {
    serde_json::from_slice(stdout).expect("stdout is a function descriptor")
}

#[test]
fn test_build_prints_descriptor() {
    let fixture = Fixture::new();
    let bundler = fixture.bundler(SUCCEEDING_BUNDLER);

    let output = lambda_pack(&fixture, &bundler)
        .arg("index.js")
        .arg("--env")
        .arg("TABLE=orders")
        .assert()
        .success()
        .stderr(predicate::str::contains("main.handler"))
        .get_output()
        .stdout
        .clone();

    let descriptor = descriptor_from(&output);
    assert_eq!(descriptor.runtime, "nodejs12.x");
    assert_eq!(descriptor.handler, "main.handler");
    assert!(descriptor.code_directory.join("main.js").is_file());
    assert_eq!(descriptor.environment["NODE_OPTIONS"], "--enable-source-maps");
    assert_eq!(descriptor.environment["AWS_NODEJS_CONNECTION_REUSE_ENABLED"], "1");
    assert_eq!(descriptor.environment["TABLE"], "orders");

    remove_output(&descriptor.code_directory);
}

#[test]
fn test_connection_reuse_can_be_disabled() {
    let fixture = Fixture::new();
    let bundler = fixture.bundler(SUCCEEDING_BUNDLER);

    let output = lambda_pack(&fixture, &bundler)
        .arg("index.js")
        .arg("--no-connection-reuse")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let descriptor = descriptor_from(&output);
    assert!(!descriptor.environment.contains_key("AWS_NODEJS_CONNECTION_REUSE_ENABLED"));
    assert_eq!(descriptor.environment["NODE_OPTIONS"], "--enable-source-maps");

    remove_output(&descriptor.code_directory);
}

#[test]
fn test_project_config_file_is_honoured() {
    let fixture = Fixture::new();
    let bundler = fixture.bundler(SUCCEEDING_BUNDLER);
    fixture.write(
        "lambda-pack.json",
        r#"{ "entry": "events/foo.js", "mode": "rollup", "handler": "main" }"#,
    );

    let output = lambda_pack(&fixture, &bundler)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let descriptor = descriptor_from(&output);
    assert_eq!(descriptor.handler, "events/foo.main");

    remove_output(&descriptor.code_directory);
}

#[test]
fn test_descriptor_written_to_file() {
    let fixture = Fixture::new();
    let bundler = fixture.bundler(SUCCEEDING_BUNDLER);
    let target = fixture.root().join("descriptor.json");

    lambda_pack(&fixture, &bundler)
        .arg("index.js")
        .arg("--descriptor")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let descriptor: FunctionDescriptor =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(descriptor.handler, "main.handler");

    remove_output(&descriptor.code_directory);
}

#[test]
fn test_bundler_failure_propagates_exit_code() {
    let fixture = Fixture::new();
    let seen = fixture.root().join("seen.config.js");
    let bundler = fixture.bundler(&format!(
        "cp \"$2\" '{}'\necho \"ERROR in ./index.js: boom\" >&2\nexit 3",
        seen.display()
    ));

    let stderr = lambda_pack(&fixture, &bundler)
        .arg("index.js")
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ERROR in ./index.js: boom"))
        .stderr(predicate::str::contains("bundler exited with status"))
        .get_output()
        .stderr
        .clone();

    // The configuration the bundler actually read is dumped in full.
    let config_text = std::fs::read_to_string(&seen).unwrap();
    assert!(config_text.contains("libraryTarget: 'commonjs2'"));
    assert!(String::from_utf8_lossy(&stderr).contains(&config_text));
}

/// `build` with only the given arguments, run from `cwd`.
fn lambda_pack_in(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lambda-pack").unwrap();
    cmd.current_dir(cwd)
        .env("NO_COLOR", "1")
        .arg("build")
        .arg("--runtime")
        .arg("nodejs12.x");
    cmd
}

#[test]
fn test_relative_bundler_flag_resolves_from_working_directory() {
    let fixture = Fixture::new();
    fixture.bundler(SUCCEEDING_BUNDLER);

    let output = lambda_pack_in(&fixture.root())
        .arg("index.js")
        .arg("--plugins-dir")
        .arg(".")
        .arg("--bundler")
        .arg("bin/fake-bundler")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let descriptor = descriptor_from(&output);
    assert_eq!(descriptor.handler, "main.handler");
    assert!(descriptor.code_directory.join("main.js").is_file());

    remove_output(&descriptor.code_directory);
}

#[test]
fn test_relative_bundler_in_config_file_resolves_from_root() {
    let fixture = Fixture::new();
    fixture.bundler(SUCCEEDING_BUNDLER);
    fixture.write(
        "lambda-pack.json",
        r#"{ "entry": "index.js", "bundler": "bin/fake-bundler", "pluginsDir": "." }"#,
    );

    let output = lambda_pack_in(&fixture.root())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let descriptor = descriptor_from(&output);
    assert!(descriptor.code_directory.join("main.js").is_file());

    remove_output(&descriptor.code_directory);
}

#[test]
fn test_relative_plugins_dir_searches_above_working_directory() {
    let fixture = Fixture::new();
    let nested = fixture.root().join("packages/api");
    std::fs::create_dir_all(&nested).unwrap();

    // Helpers live two levels above the search root.
    Command::cargo_bin("lambda-pack")
        .unwrap()
        .current_dir(&nested)
        .env("NO_COLOR", "1")
        .arg("config")
        .arg("index.js")
        .arg("--root")
        .arg("../..")
        .arg("--plugins-dir")
        .arg(".")
        .arg("--mode")
        .arg("rollup")
        .arg("--runtime")
        .arg("nodejs12.x")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            fixture
                .root()
                .join("node_modules/@rollup/plugin-commonjs")
                .display()
                .to_string(),
        ));
}

#[test]
fn test_signal_killed_bundler_still_fails() {
    let fixture = Fixture::new();
    let bundler = fixture.bundler("kill -9 $$");

    lambda_pack(&fixture, &bundler)
        .arg("index.js")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("generated configuration"));
}

#[test]
fn test_invalid_entry_extension_fails_without_bundling() {
    let fixture = Fixture::new();
    let marker = fixture.root().join("spawned");
    let bundler = fixture.bundler(&format!("touch '{}'", marker.display()));

    lambda_pack(&fixture, &bundler)
        .arg("handler.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported entry extension"));

    assert!(!marker.exists());
}

#[test]
fn test_config_command_prints_without_running() {
    let fixture = Fixture::new();

    Command::cargo_bin("lambda-pack")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("config")
        .arg("events/foo.js")
        .arg("--root")
        .arg(fixture.root())
        .arg("--plugins-dir")
        .arg(fixture.root())
        .arg("--mode")
        .arg("rollup")
        .arg("--runtime")
        .arg("nodejs12.x")
        .arg("--exclude")
        .arg("^pg-native$")
        .assert()
        .success()
        .stdout(predicate::str::contains("preserveModules: true,"))
        .stdout(predicate::str::contains(r#"new RegExp("^pg-native$")"#))
        .stdout(predicate::str::contains("@rollup/plugin-commonjs"));
}
