//! The batch engine: ingest -> classify -> allocate -> export.
//!
//! EXECUTION ORDER (fixed):
//!   1. Startup validation of the static tables (fatal on failure).
//!   2. Ingest: IDs assigned from input position, bad rows rejected.
//!   3. Classify each respondent (unmapped labels become `None`).
//!   4. Allocate each respondent; a missing rule skips that respondent
//!      and is reported, the batch continues.
//!   5. Rows are handed to the sink in respondent order, asset order
//!      within each respondent.

use crate::{
    allocator::Allocator,
    classifier::Classifier,
    config::PortfolioConfig,
    error::{PortfolioError, PortfolioResult},
    export::PortfolioWriter,
    ingest::{self, IngestedBatch},
    record::{AllocationRow, RespondentRecord},
    types::{InvestorId, RunId},
};
use serde::Serialize;
use std::path::Path;

/// A respondent left out of the output, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedRespondent {
    pub investor_id: InvestorId,
    pub reason:      String,
}

/// Counts for one batch run.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct BatchReport {
    pub run_id:             RunId,
    pub rows_read:          usize,
    pub rejected_at_ingest: Vec<SkippedRespondent>,
    pub respondents:        usize,
    pub unmapped_labels:    usize,
    pub missing_rule:       Vec<SkippedRespondent>,
    pub rows_written:       usize,
}

impl BatchReport {
    pub fn respondents_allocated(&self) -> usize {
        self.respondents - self.missing_rule.len()
    }
}

pub struct PortfolioEngine {
    pub run_id: RunId,
    config:     PortfolioConfig,
    classifier: Classifier,
    allocator:  Allocator,
}

impl PortfolioEngine {
    /// Validate `config` and build the classifier and allocator.
    /// Fails before any record is read if the tables are inconsistent.
    pub fn new(config: PortfolioConfig) -> PortfolioResult<Self> {
        let allocator = Allocator::new(&config)?;
        let classifier = Classifier::new(&config);
        let run_id = uuid::Uuid::new_v4().to_string();
        log::debug!("run {run_id}: tables validated");
        Ok(Self {
            run_id,
            config,
            classifier,
            allocator,
        })
    }

    /// Engine over the built-in survey tables.
    pub fn reference() -> PortfolioResult<Self> {
        Self::new(PortfolioConfig::reference())
    }

    pub fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    /// Classify and allocate `records`, handing each row to `sink`.
    ///
    /// Records must already carry their positional IDs. A `MissingRule`
    /// skips that respondent; any other error (e.g. from the sink) aborts.
    pub fn run<I, F>(&self, records: I, mut sink: F) -> PortfolioResult<BatchReport>
    where
        I: IntoIterator<Item = RespondentRecord>,
        F: FnMut(AllocationRow) -> PortfolioResult<()>,
    {
        let mut report = BatchReport {
            run_id: self.run_id.clone(),
            ..BatchReport::default()
        };

        for respondent in records {
            report.respondents += 1;
            let classified = self.classifier.classify(respondent);
            report.unmapped_labels += classified.unmapped_labels().len();

            match self.allocator.allocate(&classified) {
                Ok(rows) => {
                    for row in rows {
                        sink(row)?;
                        report.rows_written += 1;
                    }
                }
                Err(e @ PortfolioError::MissingRule { .. }) => {
                    log::warn!("run {}: skipping respondent: {e}", self.run_id);
                    report.missing_rule.push(SkippedRespondent {
                        investor_id: classified.investor_id().to_string(),
                        reason:      e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        report.rows_read = report.respondents;

        log::info!(
            "run {}: {} respondents, {} skipped, {} unmapped labels, {} rows",
            self.run_id,
            report.respondents,
            report.missing_rule.len(),
            report.unmapped_labels,
            report.rows_written
        );
        Ok(report)
    }

    /// Collect every row in memory.
    pub fn process<I>(&self, records: I) -> PortfolioResult<(Vec<AllocationRow>, BatchReport)>
    where
        I: IntoIterator<Item = RespondentRecord>,
    {
        let mut rows = Vec::new();
        let report = self.run(records, |row| {
            rows.push(row);
            Ok(())
        })?;
        Ok((rows, report))
    }

    /// Run an ingested batch, folding ingest rejections into the report.
    pub fn process_batch<F>(&self, batch: IngestedBatch, sink: F) -> PortfolioResult<BatchReport>
    where
        F: FnMut(AllocationRow) -> PortfolioResult<()>,
    {
        let rows_read = batch.rows_read();
        let rejected: Vec<_> = batch
            .rejected
            .into_iter()
            .map(|r| SkippedRespondent {
                investor_id: r.investor_id,
                reason:      r.error.to_string(),
            })
            .collect();

        let mut report = self.run(batch.records, sink)?;
        report.rows_read = rows_read;
        report.rejected_at_ingest = rejected;
        Ok(report)
    }

    /// Survey CSV in, portfolio CSV out.
    pub fn run_files(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> PortfolioResult<BatchReport> {
        let batch = ingest::read_survey_file(input.as_ref(), &self.config.cleaning)?;
        let mut writer = PortfolioWriter::create(output.as_ref())?;
        let report = self.process_batch(batch, |row| writer.write_row(&row))?;
        writer.finish()?;
        Ok(report)
    }
}
