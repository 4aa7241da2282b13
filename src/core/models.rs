use crate::core::runtime::Runtime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_HANDLER_NAME: &str = "handler";

/// Environment flag telling the cloud SDK to keep HTTP connections alive.
pub const CONNECTION_REUSE_ENV: &str = "AWS_NODEJS_CONNECTION_REUSE_ENABLED";
pub const NODE_OPTIONS_ENV: &str = "NODE_OPTIONS";
pub const SOURCE_MAPS_FLAG: &str = "--enable-source-maps";

/// Which bundler the configuration is synthesized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BundleMode {
    /// Direct bundling: module tree preserved, one output file per input module.
    Rollup,
    /// Transform pipeline: per-extension loaders, single consolidated entry output.
    #[default]
    Webpack,
}

impl BundleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleMode::Rollup => "rollup",
            BundleMode::Webpack => "webpack",
        }
    }
}

impl fmt::Display for BundleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied build properties, before validation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub entry: PathBuf,
    pub project_root: PathBuf,
    pub handler: Option<String>,
    pub runtime: Option<String>,
    pub mode: BundleMode,
    pub exclude: Vec<String>,
    pub connection_reuse: bool,
    pub split_vendor: bool,
    pub bundler: Option<PathBuf>,
    pub plugins_dir: Option<PathBuf>,
    pub environment: BTreeMap<String, String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            entry: PathBuf::new(),
            project_root: PathBuf::from("."),
            handler: None,
            runtime: None,
            mode: BundleMode::default(),
            exclude: Vec::new(),
            connection_reuse: true,
            split_vendor: false,
            bundler: None,
            plugins_dir: None,
            environment: BTreeMap::new(),
        }
    }
}

/// A validated, immutable request for one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub entry_path: PathBuf,
    pub project_root: PathBuf,
    pub handler_name: String,
    pub runtime: Runtime,
    pub exclusions: Vec<String>,
    pub split_vendor: bool,
}

/// Module name -> absolute path of a helper the generated config references.
pub type HelperPaths = BTreeMap<String, PathBuf>;

/// One loader or plugin in a transform chain, referenced by absolute path.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStep {
    pub module: String,
    pub path: PathBuf,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformRule {
    /// Regular expression matched against file paths.
    pub file_pattern: String,
    pub exclude_pattern: Option<String>,
    pub chain: Vec<TransformStep>,
}

/// Redirects any import matching `pattern` to a no-op module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRewrite {
    pub pattern: String,
    pub replacement: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorSplit {
    pub chunk_name: String,
    pub minifier: PathBuf,
}

/// Everything the generated bundler configuration expresses.
#[derive(Debug, Clone, PartialEq)]
pub struct BundlerConfig {
    pub mode: BundleMode,
    pub entry_path: PathBuf,
    pub project_root: PathBuf,
    pub output_directory: PathBuf,
    pub target_runtime_major: u32,
    pub transform_rules: Vec<TransformRule>,
    pub external_modules: BTreeSet<String>,
    pub exclusion_rewrite: Option<ExclusionRewrite>,
    pub vendor_split: Option<VendorSplit>,
    /// Helper module that provides runtime interop (`webpack` for plugin classes).
    pub bundler_module: Option<PathBuf>,
}

/// `module.export`, as the function runtime expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerReference {
    pub module: String,
    pub export: String,
}

impl HandlerReference {
    pub fn new(module: impl Into<String>, export: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            export: export.into(),
        }
    }
}

impl fmt::Display for HandlerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.export)
    }
}

/// Exit status and merged output of one bundler run.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// `None` when the bundler was killed by a signal.
    pub exit_code: Option<i32>,
    pub output_lines: Vec<String>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Success {
        output_dir: PathBuf,
        handler: HandlerReference,
    },
    Failure {
        exit_code: i32,
        diagnostics: String,
        config_snapshot: String,
    },
}

/// What the deployment side needs to create the function resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub runtime: String,
    pub code_directory: PathBuf,
    pub handler: String,
    pub environment: BTreeMap<String, String>,
}

impl FunctionDescriptor {
    pub fn new(
        runtime: &Runtime,
        code_directory: PathBuf,
        handler: &HandlerReference,
        connection_reuse: bool,
        extra_environment: &BTreeMap<String, String>,
    ) -> Self {
        let mut environment = extra_environment.clone();
        if connection_reuse {
            environment.insert(CONNECTION_REUSE_ENV.to_string(), "1".to_string());
        }
        environment.insert(NODE_OPTIONS_ENV.to_string(), SOURCE_MAPS_FLAG.to_string());

        Self {
            runtime: runtime.identifier.clone(),
            code_directory,
            handler: handler.to_string(),
            environment,
        }
    }
}
