//! Emits values into generated bundler configuration source.
//!
//! Every string that reaches the configuration text goes through
//! [`js_string`], so paths survive intact whatever separator the host uses.
//! A backslash is an escape character in the configuration grammar and is
//! always doubled.

use std::fmt::Write as _;
use std::path::Path;

/// Quotes `value` as a double-quoted script string literal.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Line terminators inside string literals in older engines.
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn js_path(path: &Path) -> String {
    js_string(&path.to_string_lossy())
}

/// A regular expression built from a string literal, so `/` needs no escaping.
pub fn js_regex(source: &str) -> String {
    format!("new RegExp({})", js_string(source))
}

pub fn js_string_array(values: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let items: Vec<String> = values.into_iter().map(|v| js_string(v.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

/// Renders a JSON value as an object literal, indented to `indent` levels.
pub fn js_value(value: &serde_json::Value, indent: usize) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => js_string(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(|item| js_value(item, indent)).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let pad = "  ".repeat(indent + 1);
            let mut out = String::from("{\n");
            for (key, item) in map {
                let _ = writeln!(out, "{}{}: {},", pad, js_key(key), js_value(item, indent + 1));
            }
            out.push_str(&"  ".repeat(indent));
            out.push('}');
            out
        }
    }
}

fn js_key(key: &str) -> String {
    let is_identifier = key
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false)
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if is_identifier {
        key.to_string()
    } else {
        js_string(key)
    }
}

/// Header placed at the top of every generated file.
pub fn generated_header(mode: &str) -> String {
    format!(
        "// Generated by lambda-pack for {}. Edits are overwritten on the next build.\n'use strict';\n",
        mode
    )
}
