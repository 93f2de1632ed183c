//! Terminal input for the confirmations.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

/// Source of the operator's answers.
pub trait Prompter {
    /// Ask the operator to type `phrase`; returns what was typed.
    fn confirmation_phrase(&mut self, phrase: &str) -> Result<String>;

    /// Blocking per-type confirmation before anything of `entity_type` is touched.
    fn confirm_type(&mut self, entity_type: &str) -> Result<bool>;
}

/// Interactive prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn confirmation_phrase(&mut self, phrase: &str) -> Result<String> {
        let typed: String = Input::with_theme(&self.theme)
            .with_prompt(format!(
                "Type {} to archive all the factsheets in the workspace",
                phrase
            ))
            .allow_empty(true)
            .interact_text()?;
        Ok(typed)
    }

    fn confirm_type(&mut self, entity_type: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "Archiving all {} factsheets in the workspace, press enter to confirm",
                entity_type
            ))
            .default(true)
            .interact()?)
    }
}
