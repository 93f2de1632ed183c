//! Interactive bulk archiving of workspace factsheets.

pub mod confirm;
pub mod prompt;
pub mod runner;
pub mod targets;

pub use confirm::{decide, Decision, CONFIRMATION_PHRASE};
pub use prompt::{Prompter, TerminalPrompter};
pub use runner::{RunOptions, Runner, Stage, TypeSummary};
pub use targets::{Target, TARGETS};
