use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    pub fn init() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lambda_pack=info"));

        // A second init (tests driving the CLI in-process) is harmless.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub fn build_start(entry: &Path, mode: &str, runtime: &str) {
        info!("📦 Bundling {} ({} mode, {})", entry.display(), mode, runtime);
    }

    pub fn helper_located(name: &str, path: &Path, strategy: &str) {
        debug!("🔍 {} -> {} (via {})", name, path.display(), strategy);
    }

    pub fn bundler_spawned(program: &Path, workdir: &Path) {
        debug!("⚙️  Running {} in {}", program.display(), workdir.display());
    }

    pub fn build_complete(output_dir: &Path, handler: &str, build_time: std::time::Duration) {
        info!("✅ Bundle ready in {:.2?}", build_time);
        info!("  • Output directory: {}", output_dir.display());
        info!("  • Handler: {}", handler);
    }

    /// Dumps everything needed to reproduce a failed bundler run.
    pub fn build_failed(exit_code: i32, diagnostics: &str, config_snapshot: &str) {
        error!("❌ Bundler exited with status {}", exit_code);
        error!("Bundler output:\n{}", diagnostics);
        error!("Generated configuration:\n{}", config_snapshot);
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
