/// Sequential enrichment driver
///
/// For each identifier read from the input file:
/// 1. Normalize and look it up in the registry (one attempt)
/// 2. Extract an enrichment record from the response
/// 3. Wait the fixed throttle interval, whatever the outcome
///
/// The enriched file is written once, after the last lookup, and then ranked
/// into the frequency report.
use crate::classifier;
use crate::config::Config;
use crate::enrichment::extract_record;
use crate::errors::AppError;
use crate::models::EnrichmentRecord;
use crate::services::{lookup, LookupOutcome, RegistrySource};
use crate::tabular::{self, ENRICHED_COLUMNS, OUTPUT_DELIMITER};
use crate::throttle::{Clock, RateLimiter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Diagnostic emitted for a failed lookup, mirrored from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEvent {
    pub level: Level,
    pub identifier: String,
    pub cause: String,
}

/// Tally of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Identifiers read from the input file.
    pub total: usize,
    /// Identifiers with no digits; the registry is not contacted for them.
    pub invalid: usize,
    /// Lookups that reached the registry client.
    pub attempts: usize,
    /// Lookups that failed in transport.
    pub failed: usize,
    /// Responses that were empty or carried the registry's error status.
    pub rejected: usize,
    /// Records written to the enriched file.
    pub enriched: usize,
    /// Transport failures only; invalid and rejected identifiers are silent.
    pub events: Vec<LookupEvent>,
}

/// File locations for one run.
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Ranked report destination; `None` skips classification.
    pub report: Option<PathBuf>,
    pub input_delimiter: u8,
}

impl PipelinePaths {
    pub fn from_config(config: &Config) -> Self {
        Self {
            input: config.input_file.clone(),
            output: config.output_file.clone(),
            report: config
                .generate_report
                .then(|| config.report_file.clone()),
            input_delimiter: config.input_delimiter,
        }
    }
}

pub struct Pipeline<S: RegistrySource, C: Clock> {
    source: S,
    limiter: RateLimiter<C>,
}

impl<S: RegistrySource, C: Clock> Pipeline<S, C> {
    pub fn new(source: S, delay: Duration, clock: C) -> Self {
        Self {
            source,
            limiter: RateLimiter::new(delay, clock),
        }
    }

    /// Looks up every identifier in order and collects accepted records.
    pub async fn enrich(
        &self,
        identifiers: &[String],
    ) -> (Vec<EnrichmentRecord>, PipelineSummary) {
        let mut records = Vec::new();
        let mut summary = PipelineSummary {
            total: identifiers.len(),
            ..Default::default()
        };

        for identifier in identifiers {
            tracing::info!("Processing CNPJ: {}", identifier);

            match lookup(&self.source, identifier).await {
                LookupOutcome::Invalid => summary.invalid += 1,
                LookupOutcome::Failed(e) => {
                    summary.attempts += 1;
                    summary.failed += 1;
                    summary.events.push(LookupEvent {
                        level: Level::ERROR,
                        identifier: identifier.clone(),
                        cause: e.to_string(),
                    });
                }
                LookupOutcome::Found(response) => {
                    summary.attempts += 1;
                    match extract_record(Some(&response)) {
                        Some(record) => records.push(record),
                        None => summary.rejected += 1,
                    }
                }
            }

            self.limiter.wait().await;
        }

        summary.enriched = records.len();
        (records, summary)
    }

    /// Full run: read identifiers, enrich, write the enriched file, rank it.
    pub async fn run(&self, paths: &PipelinePaths) -> Result<PipelineSummary, AppError> {
        let identifiers = tabular::read_identifiers(&paths.input, paths.input_delimiter)?;
        let (records, mut summary) = self.enrich(&identifiers).await;

        summary.enriched =
            tabular::write_records(&paths.output, &records, &ENRICHED_COLUMNS, OUTPUT_DELIMITER)?;
        tracing::info!(
            "Process finished. Data saved to {} ({} enriched, {} failed, {} rejected, {} invalid)",
            paths.output.display(),
            summary.enriched,
            summary.failed,
            summary.rejected,
            summary.invalid
        );

        if let Some(report) = &paths.report {
            classifier::classify_to_report(&paths.output, report, OUTPUT_DELIMITER)?;
        }

        Ok(summary)
    }
}
