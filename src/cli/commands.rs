use crate::core::{models::*, outcome, services::*};
use crate::infrastructure::{detect_node_major, strategy_for, LocatorChain, ProcessBundleExecutor};
use crate::utils::{anchor_path, CliOverrides, ConfigLoader, Logger, PackUI, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lambda-pack", version)]
#[command(about = "Bundle a serverless function entry point for deployment")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle a function and print its deployment descriptor
    Build {
        #[command(flatten)]
        args: BuildArgs,
        /// Write the descriptor JSON here instead of stdout
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },
    /// Print the generated bundler configuration without running the bundler
    Config {
        #[command(flatten)]
        args: BuildArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Entry point, relative to the project root
    pub entry: Option<PathBuf>,
    /// Project root directory
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
    /// Exported handler name
    #[arg(long)]
    pub handler: Option<String>,
    /// Target runtime, e.g. nodejs12.x
    #[arg(long)]
    pub runtime: Option<String>,
    /// Bundling mode
    #[arg(short, long, value_enum)]
    pub mode: Option<BundleMode>,
    /// Regular expression for imports to replace with an empty module (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,
    /// Do not enable HTTP keep-alive in the cloud SDK
    #[arg(long)]
    pub no_connection_reuse: bool,
    /// Move node_modules code into a separate minified vendor chunk (webpack mode)
    #[arg(long)]
    pub split_vendor: bool,
    /// Bundler executable to run
    #[arg(long)]
    pub bundler: Option<PathBuf>,
    /// Where the upward search for helper modules starts
    #[arg(long)]
    pub plugins_dir: Option<PathBuf>,
    /// Node executable used to pick the default runtime
    #[arg(long, default_value = "node")]
    pub node: PathBuf,
    /// Extra environment for the deployed function (repeatable)
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

impl BuildArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            entry: self.entry.clone(),
            handler: self.handler.clone(),
            runtime: self.runtime.clone(),
            mode: self.mode,
            exclude: self.exclude.clone(),
            connection_reuse: self.no_connection_reuse.then_some(false),
            split_vendor: self.split_vendor.then_some(true),
            bundler: self.bundler.clone(),
            plugins_dir: self.plugins_dir.clone(),
            environment: self.env.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }
}

fn parse_env_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    /// Parses the process arguments and runs the command.
    ///
    /// Returns the process exit status; a failed bundler run is a non-zero
    /// status rather than an error.
    pub async fn run(&self) -> Result<i32> {
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Build { args, descriptor } => {
                self.handle_build_command(&args, descriptor.as_deref()).await
            }
            Commands::Config { args } => self.handle_config_command(&args).await,
        }
    }

    async fn prepare(&self, args: &BuildArgs) -> Result<(BuildOptions, BuildRequest, LambdaBundleService)> {
        // The bundler runs inside its output directory, so nothing may stay relative.
        let cwd = std::env::current_dir()?;
        let root = anchor_path(&cwd, args.root.clone());
        let file_config = ConfigLoader::load_from_file(&root)?;
        let options = ConfigLoader::merge_with_cli(file_config, root, &cwd, args.overrides())?;

        // The host is only probed when it decides something.
        let host_major = match options.runtime {
            Some(_) => None,
            None => detect_node_major(&args.node).await,
        };
        let request = BuildRequest::from_options(&options, host_major)?;

        let search_root = options
            .plugins_dir
            .clone()
            .unwrap_or_else(|| request.project_root.clone());
        let mut service = LambdaBundleService::new(
            strategy_for(options.mode),
            LocatorChain::standard(search_root),
            Arc::new(ProcessBundleExecutor),
        );
        if let Some(bundler) = &options.bundler {
            service = service.with_bundler(bundler);
        }

        Ok((options, request, service))
    }

    async fn handle_build_command(&self, args: &BuildArgs, descriptor_path: Option<&Path>) -> Result<i32> {
        let ui = PackUI::new();
        let (options, request, service) = self.prepare(args).await?;
        ui.show_banner(options.mode.as_str(), &request.runtime.identifier);

        match service.build(&request).await? {
            BuildOutcome::Success { output_dir, handler } => {
                let descriptor = FunctionDescriptor::new(
                    &request.runtime,
                    output_dir.clone(),
                    &handler,
                    options.connection_reuse,
                    &options.environment,
                );
                let json = serde_json::to_string_pretty(&descriptor)?;
                match descriptor_path {
                    Some(path) => std::fs::write(path, format!("{}\n", json))?,
                    None => println!("{}", json),
                }

                ui.show_success(&output_dir, &handler.to_string());
                Ok(0)
            }
            BuildOutcome::Failure {
                exit_code,
                diagnostics,
                config_snapshot,
            } => {
                ui.show_failure(exit_code, &diagnostics, &config_snapshot);
                Ok(outcome::failure_exit_status(exit_code))
            }
        }
    }

    async fn handle_config_command(&self, args: &BuildArgs) -> Result<i32> {
        let (_, request, service) = self.prepare(args).await?;

        // Nothing is written, so the output directory is only a placeholder.
        let output_dir = std::env::temp_dir().join("lambda-pack-dry-run");
        let prepared = service.prepare(&request, &output_dir)?;

        Logger::info(&format!(
            "Handler would be {} ({} mode)",
            prepared.handler,
            service.strategy().mode()
        ));
        print!("{}", prepared.text);
        Ok(0)
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
