use crate::utils::Logger;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::process::Command;

static NODE_VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?(\d+)\.\d+\.\d+").expect("valid regex"));

/// Major version of the host's script runtime, read at build time only.
pub async fn detect_node_major(node: &Path) -> Option<u32> {
    let output = match Command::new(node).arg("--version").output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            Logger::warn(&format!(
                "{} --version exited with {}; assuming an older runtime",
                node.display(),
                output.status
            ));
            return None;
        }
        Err(e) => {
            Logger::warn(&format!(
                "Could not run {} ({}); assuming an older runtime",
                node.display(),
                e
            ));
            return None;
        }
    };

    parse_node_version(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_node_version(raw: &str) -> Option<u32> {
    NODE_VERSION_REGEX
        .captures(raw.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
