//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure the pipeline depends on:
//! snapshot feed, record stores, key-value store, completion service,
//! messenger and user directory.

pub mod directory;
pub mod kv;
pub mod llm;
pub mod messenger;
pub mod source;
pub mod store;
