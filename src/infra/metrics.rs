// ============================================================
// Layer 6: Metrics Logger
// ============================================================
// Records image-training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:         the epoch number (1, 2, 3, ...)
//   - train_loss:    average binary cross-entropy on the training set
//   - val_loss:      average binary cross-entropy on the validation set
//   - val_accuracy:  fraction of validation images classified correctly
//   - val_precision: of the images predicted "dog", fraction that are dogs
//
// Output file: <model_dir>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,val_accuracy,val_precision
//   1,0.689100,0.671200,0.581000,0.562000
//   2,0.640300,0.622900,0.655000,0.640000
//
// Reading the numbers:
//   - val_loss rising while train_loss falls → overfitting; early
//     stopping will end the run after `patience` such epochs
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

const HEADER: &str = "epoch,train_loss,val_loss,val_accuracy,val_precision";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    /// Average BCE loss over all training batches.
    /// A freshly initialised network sits near ln 2 ≈ 0.693.
    pub train_loss: f64,

    pub val_loss: f64,

    /// Range [0.0, 1.0]
    pub val_accuracy: f64,

    /// Range [0.0, 1.0]; 0.0 when nothing was predicted "dog"
    pub val_precision: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:         usize,
        train_loss:    f64,
        val_loss:      f64,
        val_accuracy:  f64,
        val_precision: f64,
    ) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy, val_precision }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a fresh CSV at `csv_path`, replacing any previous run's log.
    pub fn create(csv_path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = csv_path.as_ref().to_path_buf();
        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create metrics CSV '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.val_accuracy,
            m.val_precision,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
