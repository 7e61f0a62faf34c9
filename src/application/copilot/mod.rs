//! AI trade copilot: eligibility, exclusive theme claims, completion-backed
//! advice, draft sizing, delivery, button callbacks and expiry.

pub mod advice;
pub mod callback;
pub mod claim;
pub mod config;
pub mod eligibility;
pub mod evidence;
pub mod expiry;
pub mod ledger;
pub mod message;
pub mod orchestrator;
pub mod sizing;
