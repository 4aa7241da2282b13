// Command line surface
pub mod commands;

pub use commands::*;
