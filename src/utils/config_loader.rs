use crate::core::models::{BuildOptions, BundleMode};
use crate::utils::{Logger, PackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "lambda-pack.json";

/// Configuration file format (lambda-pack.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Entry point, relative to the project root (e.g. "src/handler.js")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Exported handler name (default: "handler")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Runtime identifier such as "nodejs12.x" (default: derived from the host)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BundleMode>,

    /// Regular expressions for imports replaced by an empty module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_reuse: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_vendor: Option<bool>,

    /// Explicit bundler executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundler: Option<String>,

    /// Where the upward helper search starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_dir: Option<String>,

    /// Extra environment for the deployed function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,
}

/// Build settings given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub entry: Option<PathBuf>,
    pub handler: Option<String>,
    pub runtime: Option<String>,
    pub mode: Option<BundleMode>,
    pub exclude: Vec<String>,
    pub connection_reuse: Option<bool>,
    pub split_vendor: Option<bool>,
    pub bundler: Option<PathBuf>,
    pub plugins_dir: Option<PathBuf>,
    pub environment: BTreeMap<String, String>,
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads lambda-pack.json from the project root if it exists
    pub fn load_from_file(root: &Path) -> Result<Option<ProjectConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE_NAME));
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path)?;
        let config: ProjectConfig = serde_json::from_str(&content).map_err(|e| {
            PackError::config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
        })?;

        Ok(Some(config))
    }

    /// Merge file config with CLI arguments (CLI takes precedence)
    ///
    /// Relative paths given on the command line are anchored at `cwd`, those
    /// from the file at the project root, so the bundler can be spawned from
    /// its own output directory. Exclusion lists replace each other rather
    /// than concatenate; environment maps merge key by key.
    pub fn merge_with_cli(
        file_config: Option<ProjectConfig>,
        root: PathBuf,
        cwd: &Path,
        cli: CliOverrides,
    ) -> Result<BuildOptions> {
        let root = anchor_path(cwd, root);
        let base = file_config.unwrap_or_default();
        let defaults = BuildOptions::default();

        let entry = cli
            .entry
            .or_else(|| base.entry.map(PathBuf::from))
            .ok_or_else(|| {
                PackError::config(format!(
                    "no entry point given; pass one or set \"entry\" in {}",
                    CONFIG_FILE_NAME
                ))
            })?;

        let bundler = match cli.bundler {
            Some(program) => Some(anchor_program(cwd, program)),
            None => base.bundler.map(|raw| anchor_program(&root, PathBuf::from(raw))),
        };
        let plugins_dir = match cli.plugins_dir {
            Some(dir) => Some(anchor_path(cwd, dir)),
            None => base.plugins_dir.map(|raw| anchor_path(&root, PathBuf::from(raw))),
        };

        let exclude = if cli.exclude.is_empty() {
            base.exclude.unwrap_or_default()
        } else {
            cli.exclude
        };

        let mut environment = base.environment.unwrap_or_default();
        environment.extend(cli.environment);

        Ok(BuildOptions {
            entry,
            handler: cli.handler.or(base.handler),
            runtime: cli.runtime.or(base.runtime),
            mode: cli.mode.or(base.mode).unwrap_or(defaults.mode),
            exclude,
            connection_reuse: cli
                .connection_reuse
                .or(base.connection_reuse)
                .unwrap_or(defaults.connection_reuse),
            split_vendor: cli
                .split_vendor
                .or(base.split_vendor)
                .unwrap_or(defaults.split_vendor),
            bundler,
            plugins_dir,
            environment,
            project_root: root,
        })
    }
}

/// Joins a relative path onto `base`, normalizing it when it exists.
pub fn anchor_path(base: &Path, path: PathBuf) -> PathBuf {
    let joined = if path.is_absolute() { path } else { base.join(path) };
    joined.canonicalize().unwrap_or(joined)
}

/// Like [`anchor_path`], but a bare program name is left for the `PATH` lookup.
pub fn anchor_program(base: &Path, program: PathBuf) -> PathBuf {
    if !program.is_absolute() && program.components().count() == 1 {
        program
    } else {
        anchor_path(base, program)
    }
}
