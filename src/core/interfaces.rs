use crate::core::models::*;
use crate::utils::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One way of turning a module name into an absolute directory.
pub trait ModuleLocator: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;
    fn locate(&self, module: &str) -> Option<PathBuf>;
}

/// Inputs the synthesizer needs besides the request itself.
pub struct SynthesisContext<'a> {
    pub output_dir: &'a Path,
    pub helpers: &'a HelperPaths,
    pub noop_module: Option<&'a Path>,
    pub type_config: Option<&'a Path>,
}

/// A bundler-specific way of configuring and reading back a build.
pub trait BundlingStrategy: Send + Sync {
    fn mode(&self) -> BundleMode;

    /// Package that ships the bundler executable.
    fn bundler_package(&self) -> &'static str;
    fn bundler_bin(&self) -> &'static str;
    fn config_flag(&self) -> &'static str {
        "--config"
    }
    fn config_file_name(&self) -> &'static str;

    /// Helper modules the generated configuration references by path.
    fn helper_modules(&self, request: &BuildRequest) -> Vec<&'static str>;

    fn synthesize(&self, request: &BuildRequest, ctx: &SynthesisContext<'_>) -> Result<BundlerConfig>;

    /// Serializes the record into the bundler's configuration source.
    fn render(&self, config: &BundlerConfig) -> String;

    /// Where the deployed runtime finds the handler after this strategy's output layout.
    fn handler_reference(&self, request: &BuildRequest) -> Result<HandlerReference>;
}

/// Everything needed to run the bundler once.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub config_flag: String,
    pub config_file_name: String,
    pub config_text: String,
}

#[async_trait]
pub trait BundleExecutor: Send + Sync {
    /// Writes the configuration into `output_dir` and blocks until the bundler exits.
    async fn execute(&self, output_dir: &Path, invocation: &Invocation) -> Result<ExecutionResult>;
}
