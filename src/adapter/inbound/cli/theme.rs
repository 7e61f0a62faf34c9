//! Handler for the `theme` command.

use serde_json::json;

use super::command::ThemeArgs;
use super::output::{self, KeyValueRow};
use crate::application::theme::extract::extract_theme;

pub fn execute(args: &ThemeArgs) {
    let info = extract_theme(&args.title, args.category.as_deref(), args.slug.as_deref());
    let payload = json!({
        "key": info.key,
        "label": info.label,
        "short_title": info.short_title,
        "kind": info.kind.as_str(),
    });
    let rows = vec![
        row("Kind", info.kind.as_str()),
        row("Key", &info.key),
        row("Label", &info.label),
        row("Short title", &info.short_title),
    ];
    output::table("theme", rows, payload);
}

fn row(key: &str, value: &str) -> KeyValueRow {
    KeyValueRow {
        key: key.to_string(),
        value: value.to_string(),
    }
}
