use crate::core::interfaces::*;
use crate::core::models::*;
use crate::core::outcome;
use crate::infrastructure::module_locator::{locate_bundler_bin, LocatorChain};
use crate::infrastructure::strategies::{NOOP_MODULE_FILE, NOOP_MODULE_SOURCE};
use crate::infrastructure::BuildWorkspace;
use crate::utils::{Logger, Result, Timer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TYPE_CONFIG_FILE: &str = "tsconfig.json";

/// A synthesized configuration, ready to hand to the bundler.
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub config: BundlerConfig,
    pub text: String,
    pub handler: HandlerReference,
}

/// Orchestrates one build: synthesize, run the bundler, interpret the result.
///
/// Instances share nothing mutable, so building several functions means
/// building several services (or calling [`build`](Self::build) repeatedly).
pub struct LambdaBundleService {
    strategy: Arc<dyn BundlingStrategy>,
    locator: LocatorChain,
    executor: Arc<dyn BundleExecutor>,
    bundler_override: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
}

impl LambdaBundleService {
    pub fn new(
        strategy: Arc<dyn BundlingStrategy>,
        locator: LocatorChain,
        executor: Arc<dyn BundleExecutor>,
    ) -> Self {
        Self {
            strategy,
            locator,
            executor,
            bundler_override: None,
            workspace_root: None,
        }
    }

    /// Use this bundler executable instead of looking one up.
    pub fn with_bundler(mut self, program: impl Into<PathBuf>) -> Self {
        self.bundler_override = Some(program.into());
        self
    }

    /// Create output directories under `dir` instead of the system temp root.
    pub fn with_workspace_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(dir.into());
        self
    }

    pub fn strategy(&self) -> &dyn BundlingStrategy {
        self.strategy.as_ref()
    }

    /// Builds the configuration for `request` targeting `output_dir`.
    ///
    /// The stand-in module path is only computed here; the caller stages it.
    pub fn prepare(&self, request: &BuildRequest, output_dir: &Path) -> Result<PreparedBuild> {
        let helpers = self.locate_helpers(request)?;
        self.synthesize(request, &helpers, output_dir)
    }

    fn locate_helpers(&self, request: &BuildRequest) -> Result<HelperPaths> {
        self.locator.locate_all(&self.strategy.helper_modules(request))
    }

    fn synthesize(
        &self,
        request: &BuildRequest,
        helpers: &HelperPaths,
        output_dir: &Path,
    ) -> Result<PreparedBuild> {
        let noop_module = (!request.exclusions.is_empty()).then(|| output_dir.join(NOOP_MODULE_FILE));
        let type_config = Some(request.project_root.join(TYPE_CONFIG_FILE)).filter(|p| p.is_file());

        let ctx = SynthesisContext {
            output_dir,
            helpers,
            noop_module: noop_module.as_deref(),
            type_config: type_config.as_deref(),
        };

        let config = self.strategy.synthesize(request, &ctx)?;
        let text = self.strategy.render(&config);
        let handler = self.strategy.handler_reference(request)?;

        Ok(PreparedBuild {
            config,
            text,
            handler,
        })
    }

    fn bundler_program(&self) -> Result<PathBuf> {
        if let Some(program) = &self.bundler_override {
            return Ok(program.clone());
        }
        let package = self.locator.locate(self.strategy.bundler_package()).ok();
        locate_bundler_bin(package.as_deref(), self.strategy.bundler_bin())
    }

    /// Runs one complete build in a fresh output directory.
    ///
    /// Input and installation problems come back as `Err` before anything is
    /// spawned; a bundler that exits non-zero yields `BuildOutcome::Failure`.
    pub async fn build(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        let timer = Timer::start("bundling");
        Logger::build_start(
            &request.entry_path,
            self.strategy.mode().as_str(),
            &request.runtime.identifier,
        );

        // Installation problems surface before any directory is created.
        let program = self.bundler_program()?;
        let helpers = self.locate_helpers(request)?;

        let workspace = BuildWorkspace::allocate_in(self.workspace_root.as_deref())?;
        let staged = self
            .synthesize(request, &helpers, workspace.output_dir())
            .and_then(|prepared| {
                if prepared.config.exclusion_rewrite.is_some() {
                    workspace.stage(NOOP_MODULE_FILE, NOOP_MODULE_SOURCE)?;
                }
                Ok(prepared)
            });
        let prepared = match staged {
            Ok(prepared) => prepared,
            Err(e) => {
                workspace.discard();
                return Err(e);
            }
        };

        let invocation = Invocation {
            program,
            config_flag: self.strategy.config_flag().to_string(),
            config_file_name: self.strategy.config_file_name().to_string(),
            config_text: prepared.text.clone(),
        };

        let result = self.executor.execute(workspace.output_dir(), &invocation).await?;
        let outcome = outcome::interpret(
            result,
            &prepared.text,
            workspace.output_dir(),
            prepared.handler,
        );

        if let BuildOutcome::Success { output_dir, handler } = &outcome {
            workspace.discard_staged(&[self.strategy.config_file_name(), NOOP_MODULE_FILE]);
            Logger::build_complete(output_dir, &handler.to_string(), timer.elapsed());
        }

        Ok(outcome)
    }
}
