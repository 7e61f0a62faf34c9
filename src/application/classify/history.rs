//! Price history around an alert's trigger bucket.

use std::collections::BTreeMap;

use crate::domain::alert::Alert;
use crate::domain::snapshot::PricePoint;
use crate::error::Result;
use crate::port::outbound::store::SnapshotStore;

/// Up to `depth` points before the trigger bucket and `depth` points from it
/// onward, ascending and deduplicated by bucket.
pub async fn load_price_points(
    store: &dyn SnapshotStore,
    alert: &Alert,
    depth: usize,
) -> Result<Vec<PricePoint>> {
    let before = store.before(&alert.contract_id, alert.bucket_ts, depth).await?;
    let after = store
        .from_bucket(&alert.contract_id, alert.bucket_ts, depth)
        .await?;

    let merged: BTreeMap<_, _> = before
        .iter()
        .chain(after.iter())
        .map(|s| (s.bucket_ts, s.p_yes))
        .collect();
    Ok(merged
        .into_iter()
        .map(|(bucket_ts, price)| PricePoint::new(bucket_ts, price))
        .collect())
}
