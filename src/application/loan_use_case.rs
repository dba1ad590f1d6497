// ============================================================
// Layer 2: Loan Use Case
// ============================================================
// Orchestrates the loan approval pipeline in order:
//
//   Step 1: Load the CSV                       (Layer 4 - data)
//   Step 2: Coerce, impute, derive, dropna     (Layer 4 - data)
//   Step 3: Seeded 80/20 split                 (Layer 4 - data)
//   Step 4: Fit scaler + encoder + classifier  (Layer 5 - ml)
//   Step 5: Evaluate on the held-out rows      (Layer 5 - ml)
//   Step 6: Score the example applicant        (Layer 5 - ml)
//
// Nothing is written to disk; the CLI prints the outcome.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    loader::CsvLoanLoader,
    loan_features::{prepare_rows, PrepareStats},
    splitter::split_train_test,
};
use crate::domain::{
    loan::{ApplicantInput, LoanDecision},
    traits::LoanRecordSource,
};
use crate::ml::{
    loan_pipeline::{predict_loan, FittedPipeline},
    logistic::LogisticRegressionConfig,
    report::ClassificationReport,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanConfig {
    pub data_path:     PathBuf,
    pub test_fraction: f64,
    pub seed:          u64,
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            data_path:     PathBuf::from("loan_data.csv"),
            test_fraction: 0.2,
            seed:          42,
        }
    }
}

/// Everything the `loan` command reports.
#[derive(Debug, Clone)]
pub struct LoanOutcome {
    pub stats:      PrepareStats,
    pub train_rows: usize,
    pub test_rows:  usize,
    pub report:     ClassificationReport,
    pub decision:   LoanDecision,
}

pub struct LoanUseCase {
    config: LoanConfig,
}

impl LoanUseCase {
    pub fn new(config: LoanConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<LoanOutcome> {
        let source = CsvLoanLoader::new(&self.config.data_path);
        self.execute_with(&source, ApplicantInput::example())
    }

    /// Same pipeline against any record source and applicant.
    pub fn execute_with(
        &self,
        source:    &dyn LoanRecordSource,
        applicant: ApplicantInput,
    ) -> Result<LoanOutcome> {
        let cfg = &self.config;

        // ── Steps 1-2 ─────────────────────────────────────────────────────────
        let records         = source.load_all()?;
        let (rows, stats)   = prepare_rows(&records);
        tracing::info!(
            "Prepared {} of {} rows ({} dropped)",
            rows.len(),
            stats.input_rows,
            stats.dropped_rows
        );
        tracing::debug!("Imputation medians: {:?}", stats.medians);

        // ── Step 3 ────────────────────────────────────────────────────────────
        let (train, test) = split_train_test(rows, cfg.test_fraction, cfg.seed);
        tracing::info!("Split: {} train, {} test", train.len(), test.len());

        // ── Step 4 ────────────────────────────────────────────────────────────
        let pipeline = FittedPipeline::fit(&train, &LogisticRegressionConfig::default())
            .context("Cannot fit the loan approval model")?;

        // ── Steps 5-6 ─────────────────────────────────────────────────────────
        let report   = pipeline.evaluate(&test);
        let decision = predict_loan(&pipeline, &applicant);

        Ok(LoanOutcome {
            stats,
            train_rows: train.len(),
            test_rows:  test.len(),
            report,
            decision,
        })
    }
}
