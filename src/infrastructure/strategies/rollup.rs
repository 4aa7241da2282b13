//! Direct bundling: a single resolve/interop/JSON plugin chain, with the
//! module tree preserved in the output so the handler path mirrors the
//! entry's own path.

use super::{default_externals, exclusion_rewrite, render_exclusion_pattern, render_externals, step};
use crate::core::entry::is_typed_source;
use crate::core::interfaces::{BundlingStrategy, SynthesisContext};
use crate::core::models::*;
use crate::infrastructure::config_writer::{generated_header, js_path, js_value};
use crate::utils::{PackError, Result};
use serde_json::json;
use std::fmt::Write as _;
use std::path::Component;

const NODE_RESOLVE: &str = "@rollup/plugin-node-resolve";
const COMMONJS: &str = "@rollup/plugin-commonjs";
const JSON_PLUGIN: &str = "@rollup/plugin-json";

/// Every module the plugin chain applies to.
const ALL_MODULES_PATTERN: &str = r"\.(c|m)?js$|\.json$";

pub struct RollupStrategy;

impl BundlingStrategy for RollupStrategy {
    fn mode(&self) -> BundleMode {
        BundleMode::Rollup
    }

    fn bundler_package(&self) -> &'static str {
        "rollup"
    }

    fn bundler_bin(&self) -> &'static str {
        "rollup"
    }

    fn config_file_name(&self) -> &'static str {
        "rollup.config.cjs"
    }

    fn helper_modules(&self, _request: &BuildRequest) -> Vec<&'static str> {
        vec![NODE_RESOLVE, COMMONJS, JSON_PLUGIN]
    }

    fn synthesize(&self, request: &BuildRequest, ctx: &SynthesisContext<'_>) -> Result<BundlerConfig> {
        // No transpilation step in this mode.
        if is_typed_source(&request.entry_path) {
            return Err(PackError::InvalidEntryExtension {
                path: request.entry_path.clone(),
                allowed: vec!["js"],
            });
        }
        self.handler_reference(request)?;

        let chain = vec![
            step(ctx.helpers, NODE_RESOLVE, json!({ "preferBuiltins": true }))?,
            step(ctx.helpers, COMMONJS, json!({}))?,
            step(ctx.helpers, JSON_PLUGIN, json!({}))?,
        ];

        Ok(BundlerConfig {
            mode: BundleMode::Rollup,
            entry_path: request.entry_path.clone(),
            project_root: request.project_root.clone(),
            output_directory: ctx.output_dir.to_path_buf(),
            target_runtime_major: request.runtime.major,
            transform_rules: vec![TransformRule {
                file_pattern: ALL_MODULES_PATTERN.to_string(),
                exclude_pattern: None,
                chain,
            }],
            external_modules: default_externals(),
            exclusion_rewrite: exclusion_rewrite(&request.exclusions, ctx.noop_module)?,
            vendor_split: None,
            bundler_module: None,
        })
    }

    fn render(&self, config: &BundlerConfig) -> String {
        let mut out = generated_header(&format!("rollup (node {})", config.target_runtime_major));
        out.push_str(
            "const load = (modulePath) => {\n  const loaded = require(modulePath);\n  return loaded && loaded.default ? loaded.default : loaded;\n};\n",
        );
        out.push_str(&render_externals(&config.external_modules));
        if let Some(rewrite) = &config.exclusion_rewrite {
            out.push_str(&render_exclusion_pattern(rewrite));
        }

        out.push_str("\nmodule.exports = {\n");
        let _ = writeln!(out, "  input: {},", js_path(&config.entry_path));
        out.push_str("  external: isExternal,\n");

        out.push_str("  plugins: [\n");
        if let Some(rewrite) = &config.exclusion_rewrite {
            let _ = writeln!(
                out,
                "    {{ name: 'lambda-pack-exclude', resolveId: (source) => (excluded.test(source) ? {} : null) }},",
                js_path(&rewrite.replacement)
            );
        }
        for rule in &config.transform_rules {
            for step in &rule.chain {
                let options = if step.options.as_object().map(|o| o.is_empty()).unwrap_or(true) {
                    String::new()
                } else {
                    js_value(&step.options, 2)
                };
                let _ = writeln!(out, "    load({})({}),", js_path(&step.path), options);
            }
        }
        out.push_str("  ],\n");

        out.push_str("  output: {\n");
        let _ = writeln!(out, "    dir: {},", js_path(&config.output_directory));
        out.push_str("    format: 'cjs',\n");
        out.push_str("    exports: 'auto',\n");
        out.push_str("    sourcemap: true,\n");
        out.push_str("    preserveModules: true,\n");
        let _ = writeln!(out, "    preserveModulesRoot: {},", js_path(&config.project_root));
        out.push_str("  },\n");
        out.push_str("};\n");
        out
    }

    fn handler_reference(&self, request: &BuildRequest) -> Result<HandlerReference> {
        let relative = request
            .entry_path
            .strip_prefix(&request.project_root)
            .map_err(|_| {
                PackError::config(format!(
                    "entry {} is outside the project root {}; rollup mode mirrors the entry path in its output",
                    request.entry_path.display(),
                    request.project_root.display()
                ))
            })?
            .with_extension("");

        let module: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Ok(HandlerReference::new(module.join("/"), request.handler_name.clone()))
    }
}
