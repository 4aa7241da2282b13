use crate::utils::{PackError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static MAJOR_VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\.(?:\d+|x))*$").expect("valid regex"));

pub const RUNTIME_FAMILY: &str = "nodejs";
pub const CURRENT_RUNTIME: &str = "nodejs12.x";
pub const LEGACY_RUNTIME: &str = "nodejs10.x";

/// Host majors at or above this select [`CURRENT_RUNTIME`] by default.
pub const CURRENT_RUNTIME_MIN_HOST_MAJOR: u32 = 12;

/// A deployable function runtime, e.g. `nodejs12.x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    pub identifier: String,
    pub major: u32,
}

impl Runtime {
    /// Parses a runtime identifier (`nodejs12.x`) or a bare version (`12`, `12.18.3`).
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();

        let (identifier, version) = if let Some(version) = trimmed.strip_prefix(RUNTIME_FAMILY) {
            (trimmed.to_string(), version)
        } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            (String::new(), trimmed)
        } else {
            return Err(PackError::UnsupportedRuntime(raw.to_string()));
        };

        let major = MAJOR_VERSION_REGEX
            .captures(version)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(|| PackError::RuntimeVersionUnparseable(raw.to_string()))?;

        let identifier = if identifier.is_empty() {
            format!("{}{}.x", RUNTIME_FAMILY, major)
        } else {
            identifier
        };

        Ok(Self { identifier, major })
    }

    /// Runtime used when the caller does not pick one.
    pub fn default_for_host(host_major: Option<u32>) -> Self {
        match host_major {
            Some(major) if major >= CURRENT_RUNTIME_MIN_HOST_MAJOR => Self {
                identifier: CURRENT_RUNTIME.to_string(),
                major: 12,
            },
            _ => Self {
                identifier: LEGACY_RUNTIME.to_string(),
                major: 10,
            },
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
