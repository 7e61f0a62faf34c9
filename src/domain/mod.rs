//! Pipeline domain types. No I/O lives here.

pub mod alert;
pub mod classification;
pub mod id;
pub mod mute;
pub mod plan;
pub mod recommendation;
pub mod settings;
pub mod snapshot;
pub mod theme;
pub mod user;
