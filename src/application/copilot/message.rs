//! Copilot message body and inline keyboard.

use crate::application::format::{compact_move, compact_probability, escape_html, FOOTER};
use crate::domain::alert::Alert;
use crate::domain::recommendation::{DraftOrder, Recommendation, RecommendationKind};
use crate::port::outbound::messenger::Button;

use super::sizing::SizingRejection;

/// How the draft section is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftView<'a> {
    Order(&'a DraftOrder),
    NotProposed,
    Unavailable(&'a [SizingRejection]),
}

fn duration_label(minutes: u32) -> String {
    if minutes >= 60 && minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{minutes}m")
    }
}

fn bullets(lines: &mut Vec<String>, items: &[String]) {
    for item in items {
        lines.push(format!("- {}", escape_html(item)));
    }
}

/// Message body.
#[must_use]
pub fn render(
    recommendation: &Recommendation,
    alert: &Alert,
    evidence: &[String],
    draft: &DraftView<'_>,
) -> String {
    let mut lines = vec![
        format!(
            "<b>AI Copilot: {} ({})</b>",
            recommendation.recommendation, recommendation.confidence
        ),
        format!("<b>{}</b>", escape_html(&alert.title)),
        format!("Move: {} | {}", compact_move(alert), compact_probability(alert)),
        String::new(),
        "<b>Evidence</b>".to_string(),
    ];
    bullets(&mut lines, evidence);
    lines.push(String::new());
    lines.push(format!(
        "<b>Rationale:</b> {}",
        escape_html(&recommendation.rationale)
    ));
    if !recommendation.risks.is_empty() {
        lines.push("<b>Risks</b>".to_string());
        bullets(&mut lines, &recommendation.risks);
    }
    lines.push(String::new());
    match draft {
        DraftView::Order(order) => {
            lines.push("<b>Draft order</b> (not submitted)".to_string());
            lines.push(format!(
                "<pre>{} @ {}\nSize: {} shares\nNotional: ${}</pre>",
                order.side,
                order.price,
                order.size_shares,
                order.notional_usd.round_dp(2),
            ));
        }
        DraftView::NotProposed => lines.push("Draft not proposed for WAIT/SKIP.".to_string()),
        DraftView::Unavailable(reasons) => {
            lines.push("Draft size unavailable:".to_string());
            for reason in reasons.iter() {
                lines.push(format!("- {reason}"));
            }
        }
    }
    lines.push(String::new());
    lines.push(FOOTER.to_string());
    lines.join("\n")
}

/// Confirm and skip for BUY only; mute buttons always.
#[must_use]
pub fn keyboard(
    recommendation: &Recommendation,
    alert: &Alert,
    mute_minutes: u32,
) -> Vec<Vec<Button>> {
    let mut rows = Vec::with_capacity(2);
    if recommendation.recommendation == RecommendationKind::Buy {
        rows.push(vec![
            Button::new("Confirm", format!("confirm:{}", recommendation.id)),
            Button::new("Skip", format!("skip:{}", recommendation.id)),
        ]);
    }
    let span = duration_label(mute_minutes);
    rows.push(vec![
        Button::new(
            format!("Mute theme {span}"),
            format!("mute:theme_alert:{}:{mute_minutes}", alert.id),
        ),
        Button::new(
            format!("Mute market {span}"),
            format!("mute:market_alert:{}:{mute_minutes}", alert.id),
        ),
    ]);
    rows
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::id::UserId;
    use crate::testkit::domain::{alert_at, recommendation_for};

    fn fixture(kind: RecommendationKind) -> (Recommendation, Alert) {
        let mut alert = alert_at(
            "btc-100",
            Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap(),
            0.40,
            0.45,
        );
        alert.title = "Will BTC be > $100k?".into();
        let mut rec = recommendation_for(&UserId::new("u1"), &alert);
        rec.recommendation = kind;
        rec.risks = vec!["Thin book".into()];
        (rec, alert)
    }

    #[test]
    fn buy_message_has_draft_and_four_buttons() {
        let (rec, alert) = fixture(RecommendationKind::Buy);
        let draft = DraftOrder {
            side: "BUY YES".into(),
            price: dec!(0.46),
            size_shares: dec!(54.34),
            notional_usd: dec!(25),
        };
        let text = render(&rec, &alert, &["Line".into()], &DraftView::Order(&draft));
        assert!(text.starts_with("<b>AI Copilot: BUY (HIGH)</b>"));
        assert!(text.contains("<b>Will BTC be &gt; $100k?</b>"));
        assert!(text.contains("- Line"));
        assert!(text.contains("<pre>BUY YES @ 0.46\nSize: 54.34 shares\nNotional: $25</pre>"));
        assert!(text.ends_with(FOOTER));

        let rows = keyboard(&rec, &alert, 1440);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].callback_data, format!("confirm:{}", rec.id));
        assert_eq!(rows[1][0].label, "Mute theme 24h");
        assert_eq!(
            rows[1][1].callback_data,
            format!("mute:market_alert:{}:1440", alert.id)
        );
    }

    #[test]
    fn wait_message_has_no_confirm_buttons() {
        let (rec, alert) = fixture(RecommendationKind::Wait);
        let text = render(&rec, &alert, &[], &DraftView::NotProposed);
        assert!(text.contains("Draft not proposed for WAIT/SKIP."));
        let rows = keyboard(&rec, &alert, 90);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].label, "Mute theme 90m");
    }

    #[test]
    fn unavailable_draft_lists_reasons() {
        let (rec, alert) = fixture(RecommendationKind::Buy);
        let reasons = [SizingRejection::BudgetExhausted];
        let text = render(&rec, &alert, &[], &DraftView::Unavailable(&reasons));
        assert!(text.contains("Draft size unavailable:\n- daily_budget_remaining is 0"));
    }
}
