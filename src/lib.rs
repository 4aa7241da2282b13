// lambda-pack: bundles a serverless function's entry point with a JavaScript
// bundler and reports where the deployable code ended up.

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;

pub use crate::core::{BuildOptions, BuildOutcome, BuildRequest, BundleMode, LambdaBundleService};
pub use crate::utils::{PackError, Result};
