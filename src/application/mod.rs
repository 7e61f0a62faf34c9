//! Application services (use cases).
//!
//! These services orchestrate domain logic over the outbound ports to
//! implement detection, digests and the copilot.

pub mod cancel;
pub mod classify;
pub mod copilot;
pub mod detect;
pub mod digest;
pub mod format;
pub mod keyspace;
pub mod pipeline;
pub mod settings;
pub mod theme;
