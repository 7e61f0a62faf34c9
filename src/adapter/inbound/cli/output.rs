//! Terminal output for CLI handlers.
//!
//! Human-readable lines by default; one JSON object per line with
//! `--json` for scripting. `--quiet` suppresses everything except
//! warnings, errors and JSON.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::command::ColorChoice;

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Apply output settings from the global CLI flags.
pub fn configure(config: OutputConfig, color: ColorChoice) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
    match color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("header", json!({ "app": "pmd", "version": version }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!(
        "{} {}",
        "pmd".if_supports_color(Stream::Stdout, |t| t.bold()),
        version.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();
    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!(
        "  {:<16} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

pub fn success(message: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

pub fn warning(message: &str) {
    if read_config().json {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }
    println!(
        "  {} {}",
        "⚠".if_supports_color(Stream::Stdout, |t| t.yellow()),
        message
    );
}

pub fn error(message: &str) {
    if read_config().json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!(
        "  {} {}",
        "×".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}

pub fn section(title: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a structured value: as-is in JSON mode, as a table otherwise.
pub fn table<R: Tabled>(kind: &str, rows: Vec<R>, payload: serde_json::Value) {
    let config = read_config();
    if config.json {
        emit_json_line(kind, payload);
        return;
    }
    if suppressed(config) {
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

/// One `key | value` table row.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct KeyValueRow {
    #[tabled(rename = "Field")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Flatten a JSON object into display rows. Non-objects yield one row.
#[must_use]
pub fn key_value_rows(value: &serde_json::Value) -> Vec<KeyValueRow> {
    let render = |v: &serde_json::Value| match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    match value.as_object() {
        Some(map) => map
            .iter()
            .map(|(k, v)| KeyValueRow {
                key: k.clone(),
                value: render(v),
            })
            .collect(),
        None => vec![KeyValueRow {
            key: "value".into(),
            value: render(value),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_fields_become_rows() {
        let rows = key_value_rows(&json!({
            "plan_name": "pro",
            "allowed_strengths": ["MEDIUM", "STRONG"],
            "p_min": 0.15
        }));
        assert_eq!(rows.len(), 3);
        let strengths = rows.iter().find(|r| r.key == "allowed_strengths").unwrap();
        assert_eq!(strengths.value, "MEDIUM, STRONG");
        let plan = rows.iter().find(|r| r.key == "plan_name").unwrap();
        assert_eq!(plan.value, "pro");
    }

    #[test]
    fn scalar_is_a_single_row() {
        assert_eq!(key_value_rows(&json!(3)).len(), 1);
    }
}
