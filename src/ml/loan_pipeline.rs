// ============================================================
// Layer 5: Loan Approval Pipeline
// ============================================================
// Chains the three fitted stages that turn a prepared row into an
// approval probability:
//
//   numeric[8]     ──► StandardScaler ──┐
//                                       ├──► concat ──► LogisticRegression
//   categorical[5] ──► OneHotEncoder  ──┘
//
// All three stages are fitted on the training split only and are
// immutable afterwards, so a FittedPipeline can be shared freely
// between threads.

use thiserror::Error;

use crate::data::loan_features::applicant_features;
use crate::domain::loan::{
    ApplicantInput, LoanDecision, PreparedRow, CATEGORICAL_FEATURES, NUMERIC_FEATURES,
};
use crate::ml::{
    encoder::OneHotEncoder,
    logistic::{FitError, LogisticRegression, LogisticRegressionConfig},
    report::ClassificationReport,
    scaler::StandardScaler,
};

#[derive(Error, Debug, PartialEq)]
pub enum LoanDataError {
    #[error("no usable rows left to train on")]
    NoUsableRows,

    #[error("training rows contain only label {0}; need both approved and rejected")]
    SingleClass(u8),

    #[error(transparent)]
    Fit(#[from] FitError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedPipeline {
    pub scaler:  StandardScaler,
    pub encoder: OneHotEncoder,
    pub model:   LogisticRegression,
}

impl FittedPipeline {
    pub fn fit(rows: &[PreparedRow], cfg: &LogisticRegressionConfig) -> Result<Self, LoanDataError> {
        let first = rows.first().ok_or(LoanDataError::NoUsableRows)?;
        if rows.iter().all(|r| r.label == first.label) {
            return Err(LoanDataError::SingleClass(first.label));
        }

        let numeric:     Vec<[f64; 8]>    = rows.iter().map(|r| r.numeric).collect();
        let categorical: Vec<[String; 5]> = rows.iter().map(|r| r.categorical.clone()).collect();

        let scaler  = StandardScaler::fit(&numeric);
        let encoder = OneHotEncoder::fit(&categorical);

        let design: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| transform_with(&scaler, &encoder, &r.numeric, &r.categorical))
            .collect();
        let labels: Vec<u8> = rows.iter().map(|r| r.label).collect();

        let model = cfg.fit(&design, &labels)?;
        tracing::info!(
            "Fitted logistic regression on {} rows x {} features ({} Newton iterations)",
            design.len(),
            scaler.width() + encoder.width(),
            model.iterations,
        );
        for (name, w) in NUMERIC_FEATURES.iter().zip(&model.weights) {
            tracing::debug!("coef {:<22} {:+.4}", name, w);
        }
        for (name, width) in CATEGORICAL_FEATURES.iter().zip(encoder.categories.iter().map(Vec::len)) {
            tracing::debug!("one-hot {:<19} {} levels", name, width);
        }

        Ok(Self { scaler, encoder, model })
    }

    pub fn transform(&self, numeric: &[f64; 8], categorical: &[String; 5]) -> Vec<f64> {
        transform_with(&self.scaler, &self.encoder, numeric, categorical)
    }

    pub fn predict_row(&self, row: &PreparedRow) -> u8 {
        self.model.predict(&self.transform(&row.numeric, &row.categorical))
    }

    /// Score held-out rows against their true labels.
    pub fn evaluate(&self, rows: &[PreparedRow]) -> ClassificationReport {
        let truth:     Vec<u8> = rows.iter().map(|r| r.label).collect();
        let predicted: Vec<u8> = rows.iter().map(|r| self.predict_row(r)).collect();
        ClassificationReport::new(&truth, &predicted)
    }
}

fn transform_with(
    scaler:      &StandardScaler,
    encoder:     &OneHotEncoder,
    numeric:     &[f64; 8],
    categorical: &[String; 5],
) -> Vec<f64> {
    let mut features = scaler.transform(numeric);
    features.extend(encoder.transform(categorical));
    features
}

/// Score one applicant. Approved iff the decision value is positive,
/// i.e. the approval probability is above one half.
pub fn predict_loan(pipeline: &FittedPipeline, applicant: &ApplicantInput) -> LoanDecision {
    let (numeric, categorical) = applicant_features(applicant);
    let features = pipeline.transform(&numeric, &categorical);
    LoanDecision {
        approved:    pipeline.model.predict(&features) == 1,
        probability: pipeline.model.predict_proba(&features),
    }
}
