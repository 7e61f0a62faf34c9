//! Scripted [`Llm`] for copilot tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::outbound::llm::Llm;

/// Replays canned responses in order, repeating the last one when the
/// script runs out. A failing instance errors on every call.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    failing: bool,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Llm for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::Completion("scripted failure".into()));
        }
        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(response) = next {
            *last = Some(response);
        }
        last.clone()
            .ok_or_else(|| Error::Completion("script exhausted".into()))
    }
}
