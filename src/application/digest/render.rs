//! Digest message rendering (Telegram HTML).

use url::Url;

use crate::application::format::{
    compact_move, compact_probability, escape_html, market_link, Descriptors, FOOTER,
};
use crate::domain::alert::Strength;
use crate::domain::theme::{Theme, ThemeMember};

/// Rendering inputs that do not change per theme.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub market_base: &'a Url,
    pub descriptors: Descriptors,
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn rep_line(member: &ThemeMember, ctx: &RenderContext<'_>) -> String {
    let alert = &member.alert;
    format!(
        "Rep: {} | Move {} | {} | Liq {} | Vol {}",
        escape_html(&member.theme.short_title),
        compact_move(alert),
        compact_probability(alert),
        ctx.descriptors.liquidity(alert.liquidity),
        ctx.descriptors.volume(alert.volume_24h),
    )
}

fn member_line(member: &ThemeMember) -> String {
    format!(
        "- {} | {} | {}",
        escape_html(&member.theme.short_title),
        compact_move(&member.alert),
        compact_probability(&member.alert),
    )
}

fn push_members(lines: &mut Vec<String>, theme: &Theme, ctx: &RenderContext<'_>) {
    for member in theme.members.iter().skip(1) {
        lines.push(member_line(member));
    }
    lines.push(market_link(ctx.market_base, &theme.representative().alert.contract_id));
    lines.push(String::new());
}

/// Standard section: `#i THEME - label (n markets)` blocks.
///
/// `market_counts[i]` is the theme's size before the per-theme cap.
#[must_use]
pub fn render_standard(
    themes: &[Theme],
    market_counts: &[usize],
    window_minutes: u32,
    ctx: &RenderContext<'_>,
) -> String {
    let mut lines = vec![
        format!("<b>PMD - {} ({window_minutes}m)</b>", plural(themes.len(), "theme")),
        String::new(),
    ];
    for (idx, theme) in themes.iter().enumerate() {
        let count = market_counts.get(idx).copied().unwrap_or(theme.len());
        lines.push(format!(
            "<b>#{} THEME - {} ({})</b>",
            idx + 1,
            escape_html(&theme.label),
            plural(count, "market"),
        ));
        lines.push(rep_line(theme.representative(), ctx));
        push_members(&mut lines, theme, ctx);
    }
    lines.join("\n").trim().to_string()
}

fn watch_confidence(strength: Strength) -> &'static str {
    match strength {
        Strength::Medium | Strength::Strong => "MEDIUM",
        Strength::Low => "LOW",
    }
}

/// Fast watchlist section. Never suggests following a move.
#[must_use]
pub fn render_fast(
    themes: &[Theme],
    market_counts: &[usize],
    window_minutes: u32,
    ctx: &RenderContext<'_>,
) -> String {
    let mut lines = vec![
        format!(
            "<b>PMD - FAST: {} ({window_minutes}m)</b>",
            plural(themes.len(), "watchlist theme")
        ),
        String::new(),
    ];
    for (idx, theme) in themes.iter().enumerate() {
        let count = market_counts.get(idx).copied().unwrap_or(theme.len());
        let rep = theme.representative();
        lines.push(format!(
            "<b>#{} FAST - {} watchlist ({})</b>",
            idx + 1,
            escape_html(&theme.label),
            plural(count, "market"),
        ));
        lines.push(format!(
            "{} | WATCH ({})",
            rep_line(rep, ctx),
            watch_confidence(rep.alert.strength)
        ));
        push_members(&mut lines, theme, ctx);
    }
    lines.join("\n").trim().to_string()
}

/// Join the non-empty sections and close with the footer.
#[must_use]
pub fn compose(sections: &[String]) -> Option<String> {
    let body: Vec<&str> = sections
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if body.is_empty() {
        return None;
    }
    Some(format!("{}\n\n{FOOTER}", body.join("\n\n")))
}
