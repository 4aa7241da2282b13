//! Transform pipeline: per-extension loader rules and one consolidated
//! `main` output module, with third-party code optionally split out and
//! minified on its own.

use super::{default_externals, exclusion_rewrite, helper, render_exclusion_pattern, render_externals, step};
use crate::core::interfaces::{BundlingStrategy, SynthesisContext};
use crate::core::models::*;
use crate::infrastructure::config_writer::{generated_header, js_path, js_regex, js_value};
use crate::utils::Result;
use serde_json::json;
use std::fmt::Write as _;

const WEBPACK: &str = "webpack";
const BABEL_LOADER: &str = "babel-loader";
const PRESET_ENV: &str = "@babel/preset-env";
const TS_LOADER: &str = "ts-loader";
const TERSER_PLUGIN: &str = "terser-webpack-plugin";

/// Name of the single consolidated entry output unit.
pub const ENTRY_CHUNK: &str = "main";
pub const VENDOR_CHUNK: &str = "vendor";

const SCRIPT_PATTERN: &str = r"\.js$";
const TYPED_PATTERN: &str = r"\.ts$";
const THIRD_PARTY_PATTERN: &str = r"[\\/]node_modules[\\/]";

pub struct WebpackStrategy;

impl BundlingStrategy for WebpackStrategy {
    fn mode(&self) -> BundleMode {
        BundleMode::Webpack
    }

    fn bundler_package(&self) -> &'static str {
        "webpack-cli"
    }

    fn bundler_bin(&self) -> &'static str {
        "webpack"
    }

    fn config_file_name(&self) -> &'static str {
        "webpack.config.js"
    }

    fn helper_modules(&self, request: &BuildRequest) -> Vec<&'static str> {
        let mut modules = vec![WEBPACK, BABEL_LOADER, PRESET_ENV, TS_LOADER];
        if request.split_vendor {
            modules.push(TERSER_PLUGIN);
        }
        modules
    }

    fn synthesize(&self, request: &BuildRequest, ctx: &SynthesisContext<'_>) -> Result<BundlerConfig> {
        let preset_env = helper(ctx.helpers, PRESET_ENV)?;

        let script_rule = TransformRule {
            file_pattern: SCRIPT_PATTERN.to_string(),
            exclude_pattern: Some(THIRD_PARTY_PATTERN.to_string()),
            chain: vec![step(
                ctx.helpers,
                BABEL_LOADER,
                json!({
                    "presets": [[
                        preset_env.to_string_lossy(),
                        {
                            "targets": { "node": request.runtime.major.to_string() },
                            "loose": true,
                            "bugfixes": true
                        }
                    ]]
                }),
            )?],
        };

        // Type errors are caught earlier in the workflow; only strip types here.
        let mut ts_options = json!({ "transpileOnly": true });
        if let Some(type_config) = ctx.type_config {
            ts_options["configFile"] = json!(type_config.to_string_lossy());
        }
        let typed_rule = TransformRule {
            file_pattern: TYPED_PATTERN.to_string(),
            exclude_pattern: None,
            chain: vec![step(ctx.helpers, TS_LOADER, ts_options)?],
        };

        let vendor_split = if request.split_vendor {
            Some(VendorSplit {
                chunk_name: VENDOR_CHUNK.to_string(),
                minifier: helper(ctx.helpers, TERSER_PLUGIN)?.to_path_buf(),
            })
        } else {
            None
        };

        Ok(BundlerConfig {
            mode: BundleMode::Webpack,
            entry_path: request.entry_path.clone(),
            project_root: request.project_root.clone(),
            output_directory: ctx.output_dir.to_path_buf(),
            target_runtime_major: request.runtime.major,
            transform_rules: vec![script_rule, typed_rule],
            external_modules: default_externals(),
            exclusion_rewrite: exclusion_rewrite(&request.exclusions, ctx.noop_module)?,
            vendor_split,
            bundler_module: Some(helper(ctx.helpers, WEBPACK)?.to_path_buf()),
        })
    }

    fn render(&self, config: &BundlerConfig) -> String {
        let mut out = generated_header(&format!("webpack (node {})", config.target_runtime_major));
        if let Some(webpack) = &config.bundler_module {
            let _ = writeln!(out, "const webpack = require({});", js_path(webpack));
        }
        if let Some(split) = &config.vendor_split {
            let _ = writeln!(out, "const TerserPlugin = require({});", js_path(&split.minifier));
        }
        out.push_str(&render_externals(&config.external_modules));
        if let Some(rewrite) = &config.exclusion_rewrite {
            out.push_str(&render_exclusion_pattern(rewrite));
        }

        out.push_str("\nmodule.exports = {\n");
        out.push_str("  mode: 'production',\n");
        out.push_str("  target: 'node',\n");
        out.push_str("  devtool: 'source-map',\n");
        let _ = writeln!(out, "  context: {},", js_path(&config.project_root));
        let _ = writeln!(out, "  entry: {{ {}: {} }},", ENTRY_CHUNK, js_path(&config.entry_path));
        out.push_str("  output: {\n");
        let _ = writeln!(out, "    path: {},", js_path(&config.output_directory));
        out.push_str("    filename: '[name].js',\n");
        out.push_str("    libraryTarget: 'commonjs2',\n");
        out.push_str("  },\n");
        out.push_str("  resolve: { extensions: ['.ts', '.js', '.json'] },\n");
        out.push_str("  externals: [\n");
        out.push_str(
            "    ({ request }, callback) => (isExternal(request) ? callback(null, `commonjs ${request}`) : callback()),\n",
        );
        out.push_str("  ],\n");

        out.push_str("  module: {\n    rules: [\n");
        for rule in &config.transform_rules {
            out.push_str("      {\n");
            let _ = writeln!(out, "        test: {},", js_regex(&rule.file_pattern));
            if let Some(exclude) = &rule.exclude_pattern {
                let _ = writeln!(out, "        exclude: {},", js_regex(exclude));
            }
            out.push_str("        use: [\n");
            for step in &rule.chain {
                let _ = writeln!(
                    out,
                    "          {{ loader: {}, options: {} }},",
                    js_path(&step.path),
                    js_value(&step.options, 5)
                );
            }
            out.push_str("        ],\n");
            out.push_str("      },\n");
        }
        out.push_str("    ],\n  },\n");

        out.push_str("  plugins: [\n");
        if let Some(rewrite) = &config.exclusion_rewrite {
            let _ = writeln!(
                out,
                "    new webpack.NormalModuleReplacementPlugin(excluded, {}),",
                js_path(&rewrite.replacement)
            );
        }
        out.push_str("  ],\n");

        match &config.vendor_split {
            // First-party code stays readable; only the vendor unit is minified.
            Some(split) => {
                out.push_str("  optimization: {\n");
                out.push_str("    minimize: true,\n");
                let _ = writeln!(
                    out,
                    "    minimizer: [new TerserPlugin({{ include: {} }})],",
                    js_regex(&format!("^{}", split.chunk_name))
                );
                out.push_str("    splitChunks: {\n      cacheGroups: {\n");
                let _ = writeln!(out, "        {}: {{", split.chunk_name);
                let _ = writeln!(out, "          test: {},", js_regex(THIRD_PARTY_PATTERN));
                let _ = writeln!(out, "          name: '{}',", split.chunk_name);
                out.push_str("          chunks: 'all',\n");
                out.push_str("        },\n      },\n    },\n");
                out.push_str("  },\n");
            }
            None => out.push_str("  optimization: { minimize: false },\n"),
        }
        out.push_str("};\n");
        out
    }

    fn handler_reference(&self, request: &BuildRequest) -> Result<HandlerReference> {
        Ok(HandlerReference::new(ENTRY_CHUNK, request.handler_name.clone()))
    }
}
