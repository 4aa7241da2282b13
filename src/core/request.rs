use crate::core::entry::EntryResolver;
use crate::core::models::{BuildOptions, BuildRequest, DEFAULT_HANDLER_NAME};
use crate::core::runtime::Runtime;
use crate::utils::{PackError, Result};
use regex::Regex;

impl BuildRequest {
    /// Validates caller options. Nothing is spawned or written here.
    pub fn from_options(options: &BuildOptions, host_major: Option<u32>) -> Result<Self> {
        let project_root = options.project_root.canonicalize().map_err(|e| {
            PackError::config(format!(
                "project root {} is not accessible: {}",
                options.project_root.display(),
                e
            ))
        })?;

        let runtime = match options.runtime.as_deref() {
            Some(raw) => Runtime::parse(raw)?,
            None => Runtime::default_for_host(host_major),
        };

        let entry_path = EntryResolver::new(&project_root).resolve(&options.entry)?;

        let handler_name = options
            .handler
            .clone()
            .unwrap_or_else(|| DEFAULT_HANDLER_NAME.to_string());
        if handler_name.is_empty() || handler_name.contains(['.', '/', '\\']) {
            return Err(PackError::config(format!(
                "invalid handler export name '{}'",
                handler_name
            )));
        }

        validate_exclusions(&options.exclude)?;

        Ok(Self {
            entry_path,
            project_root,
            handler_name,
            runtime,
            exclusions: options.exclude.clone(),
            split_vendor: options.split_vendor,
        })
    }
}

/// Every pattern must be a valid expression on its own before they are joined.
pub fn validate_exclusions(patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        if pattern.is_empty() {
            return Err(PackError::InvalidExclusionPattern {
                pattern: pattern.clone(),
                reason: "empty pattern would exclude every module".to_string(),
            });
        }
        Regex::new(pattern).map_err(|e| PackError::InvalidExclusionPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Joins patterns as alternatives, preserving caller order.
pub fn join_exclusions(patterns: &[String]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }
    Some(patterns.join("|"))
}
