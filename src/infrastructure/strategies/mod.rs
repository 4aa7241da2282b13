// Bundling strategies: one per supported bundler
pub mod rollup;
pub mod webpack;

pub use rollup::RollupStrategy;
pub use webpack::WebpackStrategy;

use crate::core::interfaces::BundlingStrategy;
use crate::core::models::{BundleMode, ExclusionRewrite, HelperPaths, TransformStep};
use crate::core::request::join_exclusions;
use crate::infrastructure::config_writer::{js_regex, js_string_array};
use crate::utils::{PackError, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Assumed present in the function runtime, never inlined.
pub const CLOUD_SDK_PACKAGE: &str = "aws-sdk";

/// Built-in modules of the script runtime.
pub const RUNTIME_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "dns", "domain", "events", "fs", "http", "http2", "https", "inspector",
    "module", "net", "os", "path", "perf_hooks", "process", "punycode", "querystring",
    "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls", "trace_events",
    "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

pub const NOOP_MODULE_FILE: &str = "noop.js";
pub const NOOP_MODULE_SOURCE: &str = "module.exports = {};\n";

/// Matches `request` (and its subpaths) against the `externals` set declared next to it.
pub(crate) const EXTERNAL_MATCHER: &str = "\
const isExternal = (request) => {
  if (request.startsWith('node:')) return true;
  const parts = request.split('/');
  const name = request.startsWith('@') ? parts.slice(0, 2).join('/') : parts[0];
  return externals.has(name);
};
";

pub fn strategy_for(mode: BundleMode) -> Arc<dyn BundlingStrategy> {
    match mode {
        BundleMode::Rollup => Arc::new(RollupStrategy),
        BundleMode::Webpack => Arc::new(WebpackStrategy),
    }
}

pub fn default_externals() -> BTreeSet<String> {
    std::iter::once(CLOUD_SDK_PACKAGE)
        .chain(RUNTIME_BUILTINS.iter().copied())
        .map(str::to_string)
        .collect()
}

pub(crate) fn helper<'a>(helpers: &'a HelperPaths, module: &str) -> Result<&'a Path> {
    helpers
        .get(module)
        .map(|p| p.as_path())
        .ok_or_else(|| PackError::config(format!("helper module '{}' was not resolved", module)))
}

pub(crate) fn step(
    helpers: &HelperPaths,
    module: &str,
    options: serde_json::Value,
) -> Result<TransformStep> {
    Ok(TransformStep {
        module: module.to_string(),
        path: helper(helpers, module)?.to_path_buf(),
        options,
    })
}

pub(crate) fn exclusion_rewrite(
    patterns: &[String],
    noop_module: Option<&Path>,
) -> Result<Option<ExclusionRewrite>> {
    let Some(pattern) = join_exclusions(patterns) else {
        return Ok(None);
    };
    let replacement = noop_module.ok_or_else(|| {
        PackError::config("exclusions were given but no stand-in module was staged")
    })?;
    Ok(Some(ExclusionRewrite {
        pattern,
        replacement: replacement.to_path_buf(),
    }))
}

pub(crate) fn render_externals(externals: &BTreeSet<String>) -> String {
    format!(
        "const externals = new Set({});\n{}",
        js_string_array(externals),
        EXTERNAL_MATCHER
    )
}

pub(crate) fn render_exclusion_pattern(rewrite: &ExclusionRewrite) -> String {
    format!("const excluded = {};\n", js_regex(&rewrite.pattern))
}
