use crate::core::models::{BuildOutcome, ExecutionResult, HandlerReference};
use crate::utils::Logger;
use std::path::Path;

/// Exit code reported when the bundler died without one (killed by a signal).
pub const SIGNALLED_EXIT_CODE: i32 = -1;

/// Turns a finished bundler run into a terminal outcome.
///
/// A failure carries the raw bundler output and the generated configuration
/// verbatim, since the configuration was not written by the user and has to
/// be inspectable to debug unresolved imports or transform errors.
pub fn interpret(
    result: ExecutionResult,
    config_text: &str,
    output_dir: &Path,
    handler: HandlerReference,
) -> BuildOutcome {
    if result.success() {
        return BuildOutcome::Success {
            output_dir: output_dir.to_path_buf(),
            handler,
        };
    }

    let exit_code = result.exit_code.unwrap_or(SIGNALLED_EXIT_CODE);
    let diagnostics = result.output_lines.join("\n");
    Logger::build_failed(exit_code, &diagnostics, config_text);

    BuildOutcome::Failure {
        exit_code,
        diagnostics,
        config_snapshot: config_text.to_string(),
    }
}

/// Process exit status for a failed outcome; never zero.
pub fn failure_exit_status(exit_code: i32) -> i32 {
    if exit_code > 0 {
        exit_code
    } else {
        1
    }
}
