// Infrastructure layer
pub mod config_writer;
pub mod executor;
pub mod host_runtime;
pub mod module_locator;
pub mod strategies;

pub use executor::*;
pub use host_runtime::*;
pub use module_locator::*;
pub use strategies::{strategy_for, RollupStrategy, WebpackStrategy};
