//! Catch-all matcher keyed on the leading content words of the title.

use sha2::{Digest, Sha256};

use crate::domain::theme::{ThemeInfo, ThemeKind};

use super::matcher::{TitleContext, ThemeMatcher};
use super::text;

const KEY_WORDS: usize = 6;
const LABEL_WORDS: usize = 7;
const MAX_KEY_LEN: usize = 80;
const SHORT_TITLE_LEN: usize = 40;

/// Stable key fragment for arbitrary text: joined content words, or a
/// truncated SHA-256 when the joined form would be too long.
#[must_use]
pub fn fingerprint(title: &str) -> String {
    let words: Vec<String> = text::tokens(title)
        .into_iter()
        .filter(|t| !text::is_stopword(t))
        .take(KEY_WORDS)
        .collect();
    if words.is_empty() {
        return "untitled".to_string();
    }
    let joined = words.join("_");
    if joined.len() > MAX_KEY_LEN {
        let digest = format!("{:x}", Sha256::digest(joined.as_bytes()));
        return digest[..16].to_string();
    }
    joined
}

pub struct Fingerprint;

impl Fingerprint {
    /// The generic theme for any title.
    #[must_use]
    pub fn info(&self, ctx: &TitleContext<'_>) -> ThemeInfo {
        let label_words: Vec<&str> = ctx
            .tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !text::is_stopword(t))
            .take(LABEL_WORDS)
            .collect();
        let label = if label_words.is_empty() {
            text::truncate(ctx.title.trim(), SHORT_TITLE_LEN)
        } else {
            text::title_case(&label_words.join(" "))
        };

        ThemeInfo {
            key: format!("generic|{}", fingerprint(ctx.title)),
            label,
            short_title: text::truncate(ctx.title.trim(), SHORT_TITLE_LEN),
            kind: ThemeKind::Generic,
        }
    }
}

impl ThemeMatcher for Fingerprint {
    fn name(&self) -> &'static str {
        "fingerprint"
    }

    fn try_match(&self, ctx: &TitleContext<'_>) -> Option<ThemeInfo> {
        Some(self.info(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_first_content_words() {
        assert_eq!(
            fingerprint("Will the Fed cut rates in December 2026?"),
            "fed_cut_rates_december_2026"
        );
    }

    #[test]
    fn punctuation_variants_share_a_key() {
        assert_eq!(
            fingerprint("Will the Fed cut rates\u{2014}December 2026?"),
            fingerprint("will the fed cut rates, december 2026")
        );
    }

    #[test]
    fn long_keys_are_hashed() {
        let key = fingerprint(
            "Supercalifragilisticexpialidocious antidisestablishmentarianism \
             floccinaucinihilipilification pneumonoultramicroscopic incomprehensibilities \
             honorificabilitudinitatibus",
        );
        assert_eq!(key.len(), 16);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn empty_titles_are_untitled() {
        assert_eq!(fingerprint("???"), "untitled");
        assert_eq!(fingerprint("Will the"), "untitled");
    }

    #[test]
    fn matcher_always_claims() {
        let ctx = TitleContext::new("Will the Fed cut rates in December 2026?", None, None);
        let info = Fingerprint.try_match(&ctx).unwrap();
        assert_eq!(info.key, "generic|fed_cut_rates_december_2026");
        assert_eq!(info.label, "Fed Cut Rates December 2026");
        assert_eq!(info.kind, ThemeKind::Generic);
    }
}
