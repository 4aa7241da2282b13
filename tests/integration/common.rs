use lambda_pack::infrastructure::{AncestorSearch, LocatorChain};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every helper either strategy may ask for.
pub const HELPER_MODULES: &[&str] = &[
    "@rollup/plugin-node-resolve",
    "@rollup/plugin-commonjs",
    "@rollup/plugin-json",
    "webpack",
    "babel-loader",
    "@babel/preset-env",
    "ts-loader",
    "terser-webpack-plugin",
];

/// Checks it was invoked as `<bin> --config <existing file>` from the output
/// directory, then emits a bundle next to the configuration.
pub const SUCCEEDING_BUNDLER: &str = r#"[ "$1" = "--config" ] || exit 9
[ -f "$2" ] || exit 8
[ "$(dirname "$2")" = "$(pwd -P)" ] || exit 7
echo 'exports.handler = async () => ({ ok: true });' > main.js
echo "bundled with $(basename "$2")"
"#;

/// A project with two entry points and a node_modules tree holding the helpers.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::write(root.join("index.js"), "exports.handler = async () => ({ ok: true });\n").unwrap();
        std::fs::create_dir_all(root.join("events")).unwrap();
        std::fs::write(root.join("events/foo.js"), "exports.handler = async () => 'foo';\n").unwrap();
        std::fs::write(root.join("typed.ts"), "export const handler = async () => 1;\n").unwrap();

        for module in HELPER_MODULES {
            let package = root.join("node_modules").join(module);
            std::fs::create_dir_all(&package).unwrap();
            std::fs::write(package.join("package.json"), format!(r#"{{"name":"{}"}}"#, module)).unwrap();
        }

        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn locator(&self) -> LocatorChain {
        LocatorChain::new(self.root()).with_locator(Box::new(AncestorSearch::new(self.root())))
    }

    /// Writes an executable shell script standing in for the bundler.
    pub fn bundler(&self, body: &str) -> PathBuf {
        let bin = self.dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join("fake-bundler");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn write(&self, relative: &str, content: &str) {
        std::fs::write(self.dir.path().join(relative), content).unwrap();
    }
}

pub fn remove_output(dir: &Path) {
    let _ = std::fs::remove_dir_all(dir);
}
