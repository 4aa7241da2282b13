use colored::*;
use std::path::Path;
use std::time::Instant;

/// Human-facing build summary.
///
/// Everything goes to stderr: stdout carries the function descriptor JSON.
pub struct PackUI {
    start_time: Instant,
}

impl PackUI {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn show_banner(&self, mode: &str, runtime: &str) {
        eprintln!(
            "\n  {} {}  {} {}",
            "LAMBDA-PACK".bright_cyan().bold(),
            concat!("v", env!("CARGO_PKG_VERSION")).bright_white(),
            mode.bright_black(),
            runtime.bright_black()
        );
        eprintln!();
    }

    pub fn show_success(&self, output_dir: &Path, handler: &str) {
        let build_time = self.start_time.elapsed();

        eprintln!("  {} {}", "code:".bright_black(), output_dir.display().to_string().bright_cyan());
        eprintln!("  {} {}", "handler:".bright_black(), handler.bright_cyan());
        eprintln!();
        eprintln!(
            "  {} bundled in {}",
            "✓".bright_green(),
            format!("{:.0}ms", build_time.as_secs_f64() * 1000.0).bright_white().bold()
        );
    }

    /// Printed verbatim so it survives any log filter.
    pub fn show_failure(&self, exit_code: i32, diagnostics: &str, config_snapshot: &str) {
        eprintln!(
            "  {} bundler exited with status {}",
            "✗".bright_red(),
            exit_code.to_string().bold()
        );
        eprintln!();
        eprintln!("{}", "── bundler output ──".bright_black());
        eprintln!("{}", diagnostics);
        eprintln!("{}", "── generated configuration ──".bright_black());
        eprintln!("{}", config_snapshot);
    }
}

impl Default for PackUI {
    fn default() -> Self {
        Self::new()
    }
}
