//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the detection pipeline and the systems it
//! consumes: the snapshot feed, persistence, the key-value store, the
//! completion service and the messenger. Adapters implement them; the
//! application layer only ever sees `Arc<dyn Port>`.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  detect/classify/digest │
//!     ┌──────────────┤  copilot/pass           ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Feed   │            │ Store / KV  │              │ LLM / Bot │
//! │ Adapter │            │  Adapters   │              │ Adapters  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;
