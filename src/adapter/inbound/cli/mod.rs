//! Operator CLI.

pub mod check;
pub mod command;
pub mod once;
pub mod output;
pub mod run;
pub mod settings;
pub mod theme;
