//! Drives one archive run: confirmation, then fetch and archive per type.

use anyhow::{Context, Result};
use console::style;
use factsheet_client::{ArchiveReport, BatchArchiver, FactsheetClient};

use crate::confirm::{decide, Decision, CONFIRMATION_PHRASE};
use crate::prompt::Prompter;
use crate::targets::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitConfirmation,
    ConfirmedOrSkipped,
    FetchingPerType,
    DeletingPerType,
    Done,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Bypass the phrase and every per-type confirmation.
    pub skip_confirmation: bool,
    /// Fetch with cursor pagination when set.
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSummary {
    /// Operator declined the per-type confirmation.
    Skipped { entity_type: String },
    Processed {
        entity_type: String,
        found: usize,
        report: ArchiveReport,
    },
}

pub struct Runner<'a, P: Prompter> {
    options: RunOptions,
    prompter: &'a mut P,
    stage: Stage,
}

impl<'a, P: Prompter> Runner<'a, P> {
    pub fn new(options: RunOptions, prompter: &'a mut P) -> Self {
        Self {
            options,
            prompter,
            stage: Stage::AwaitConfirmation,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "Run stage");
        self.stage = stage;
    }

    /// Collect the confirmation phrase unless confirmations are skipped.
    pub fn confirm(&mut self) -> Result<Decision> {
        let decision = if self.options.skip_confirmation {
            decide(true, None)
        } else {
            let typed = self.prompter.confirmation_phrase(CONFIRMATION_PHRASE)?;
            decide(false, Some(&typed))
        };

        match decision {
            Decision::Proceed => self.enter(Stage::ConfirmedOrSkipped),
            Decision::Abort => {
                println!("{}", style("Confirmation failed. Nothing was archived.").yellow());
                self.enter(Stage::Done);
            }
        }
        Ok(decision)
    }

    /// Fetch and archive every target in order. Must follow a `Proceed` from
    /// [`Runner::confirm`]; a fetch failure ends the run.
    pub async fn process(
        &mut self,
        client: &FactsheetClient,
        targets: &[Target],
    ) -> Result<Vec<TypeSummary>> {
        anyhow::ensure!(
            self.stage == Stage::ConfirmedOrSkipped,
            "archive run was not confirmed"
        );

        let mut summaries = Vec::with_capacity(targets.len());
        for target in targets {
            if !self.options.skip_confirmation && !self.prompter.confirm_type(target.entity_type)? {
                println!(
                    "{}",
                    style(format!("Skipping {}", target.entity_type)).yellow()
                );
                summaries.push(TypeSummary::Skipped {
                    entity_type: target.entity_type.to_string(),
                });
                continue;
            }

            self.enter(Stage::FetchingPerType);
            let table = client
                .fetch(&target.query(self.options.page_size))
                .await
                .with_context(|| format!("Failed to retrieve {} factsheets", target.entity_type))?;

            println!(
                "{}",
                style(format!(
                    "{} {} factsheets will be archived",
                    table.len(),
                    target.entity_type
                ))
                .bold()
            );
            let ids = table.ids();
            tracing::debug!(entity_type = target.entity_type, ?ids, "Factsheets to archive");

            self.enter(Stage::DeletingPerType);
            let report = BatchArchiver::new(client)
                .archive_all(target.entity_type, &ids)
                .await
                .with_context(|| format!("Failed to archive {} factsheets", target.entity_type))?;

            print_report(target.entity_type, &report);
            summaries.push(TypeSummary::Processed {
                entity_type: target.entity_type.to_string(),
                found: table.len(),
                report,
            });
        }

        self.enter(Stage::Done);
        Ok(summaries)
    }
}

fn print_report(entity_type: &str, report: &ArchiveReport) {
    let line = format!(
        "{}: {} of {} factsheets archived in {} requests",
        entity_type, report.archived, report.attempted, report.batches_sent
    );
    if report.failed_batches == 0 {
        println!("{}", style(line).green());
    } else {
        println!("{}", style(line).yellow());
        println!(
            "{}",
            style(format!(
                "  {} batch(es) failed; their factsheets may be partially archived",
                report.failed_batches
            ))
            .red()
        );
    }
}
