//! Theme extraction and grouping.

pub mod date;
pub mod extract;
pub mod fingerprint;
pub mod group;
pub mod matcher;
pub mod matchup;
pub mod price;
pub mod text;
