//! Completion clients implementing [`Llm`](crate::port::outbound::llm::Llm)
//! for Anthropic Claude and OpenAI, plus an offline stand-in.

pub mod anthropic;
pub mod offline;
pub mod openai;
