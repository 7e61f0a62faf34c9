//! Entry point of the theme extractor.

use tracing::trace;

use crate::domain::theme::ThemeInfo;

use super::fingerprint::Fingerprint;
use super::matcher::{default_chain, TitleContext};

/// Parse a contract title into its theme.
///
/// Pure and deterministic: the same `(title, category, slug)` always yields
/// the same [`ThemeInfo`]. Titles no matcher claims land in a generic theme.
#[must_use]
pub fn extract_theme(title: &str, category: Option<&str>, slug: Option<&str>) -> ThemeInfo {
    let ctx = TitleContext::new(title, category, slug);
    for matcher in default_chain() {
        if let Some(info) = matcher.try_match(&ctx) {
            trace!(matcher = matcher.name(), theme_key = %info.key, "theme matched");
            return info;
        }
    }
    Fingerprint.info(&ctx)
}
