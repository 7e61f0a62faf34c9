//! Clustering alerts into themes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::alert::Alert;
use crate::domain::classification::AlertClassification;
use crate::domain::theme::{Theme, ThemeMember};

use super::extract::extract_theme;

fn member_order(a: &ThemeMember, b: &ThemeMember) -> Ordering {
    b.alert
        .abs_move()
        .total_cmp(&a.alert.abs_move())
        .then_with(|| b.alert.liquidity.total_cmp(&a.alert.liquidity))
        .then_with(|| a.alert.contract_id.cmp(&b.alert.contract_id))
        .then_with(|| a.alert.id.cmp(&b.alert.id))
}

fn theme_order(a: &Theme, b: &Theme) -> Ordering {
    let (ra, rb) = (a.representative(), b.representative());
    let confidence = |m: &ThemeMember| m.classification.map(|c| c.confidence);
    confidence(rb)
        .cmp(&confidence(ra))
        .then_with(|| rb.alert.abs_move().total_cmp(&ra.alert.abs_move()))
        .then_with(|| a.key.cmp(&b.key))
}

/// Group alerts by theme key.
///
/// Members are ordered by |move| desc, liquidity desc, then contract id, so
/// the first member is the representative. Themes are ordered by the
/// representative's confidence (unclassified last), then |move| desc, then
/// key. The output depends only on the input values, never on input order.
#[must_use]
pub fn group_into_themes<I>(alerts: I) -> Vec<Theme>
where
    I: IntoIterator<Item = (Alert, Option<AlertClassification>)>,
{
    let mut buckets: BTreeMap<String, Vec<ThemeMember>> = BTreeMap::new();
    for (alert, classification) in alerts {
        let theme = extract_theme(&alert.title, alert.category.as_deref(), alert.slug.as_deref());
        buckets.entry(theme.key.clone()).or_default().push(ThemeMember {
            alert,
            classification,
            theme,
        });
    }

    let mut themes: Vec<Theme> = buckets
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(member_order);
            let representative = &members[0].theme;
            Theme {
                label: representative.label.clone(),
                kind: representative.kind,
                key,
                members,
            }
        })
        .collect();
    themes.sort_by(theme_order);
    themes
}
