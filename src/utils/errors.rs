use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Unsupported entry extension: {}\n\nHint: The entry must be one of: {}",
        .path.display(),
        .allowed.join(", ")
    )]
    InvalidEntryExtension {
        path: PathBuf,
        allowed: Vec<&'static str>,
    },

    #[error("Entry point not found: {}\n\nHint: Paths are resolved against the project root", .0.display())]
    EntryNotFound(PathBuf),

    #[error("Unsupported runtime: {0}\n\nHint: Only nodejs runtimes (e.g. nodejs12.x) can be bundled")]
    UnsupportedRuntime(String),

    #[error("Cannot read a version from runtime '{0}'\n\nHint: Expected an identifier like nodejs12.x")]
    RuntimeVersionUnparseable(String),

    #[error(
        "Cannot locate module '{name}' (searched from {})\n\nHint: Reinstall lambda-pack's helper modules or pass --plugins-dir",
        .search_root.display()
    )]
    ModuleNotLocatable { name: String, search_root: PathBuf },

    #[error("Invalid exclusion pattern '{pattern}': {reason}")]
    InvalidExclusionPattern { pattern: String, reason: String },

    #[error("Bundler executable '{0}' not found\n\nHint: Install it next to the helper modules or pass --bundler <path>")]
    BundlerNotFound(String),

    #[error("Failed to spawn {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PackError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn not_locatable(name: &str, search_root: impl Into<PathBuf>) -> Self {
        Self::ModuleNotLocatable {
            name: name.to_string(),
            search_root: search_root.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
