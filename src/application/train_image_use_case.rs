// ============================================================
// Layer 2: Train Image Use Case
// ============================================================
// Orchestrates training of the cat/dog classifier:
//
//   Step 1: Scan the training folder (with augmentation)  (Layer 4 - data)
//   Step 2: Scan the validation folder                    (Layer 4 - data)
//   Step 3: Save the architecture config                  (Layer 6 - infra)
//   Step 4: Start a fresh metrics CSV                     (Layer 6 - infra)
//   Step 5: Run the training loop                         (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{augment::Augmentation, dataset::ImageFolderDataset};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    model::CatDogNetConfig,
    trainer::{run_training, TrainingSummary},
};

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTrainConfig {
    pub train_dir:   PathBuf,
    pub val_dir:     PathBuf,
    pub model_dir:   PathBuf,
    pub model_name:  String,
    pub image_size:  usize,
    pub batch_size:  usize,
    pub epochs:      usize,
    pub lr:          f64,
    pub lr_factor:   f64,
    pub lr_patience: usize,
    pub patience:    usize,
    pub seed:        u64,
    pub num_workers: usize,
}

impl Default for ImageTrainConfig {
    fn default() -> Self {
        Self {
            train_dir:   PathBuf::from("training_set"),
            val_dir:     PathBuf::from("test_set"),
            model_dir:   PathBuf::from("."),
            model_name:  "cat_dog_model".to_string(),
            image_size:  224,
            batch_size:  32,
            epochs:      10,
            lr:          1e-3,
            lr_factor:   0.2,
            lr_patience: 2,
            patience:    3,
            seed:        42,
            num_workers: 2,
        }
    }
}

// ─── TrainImageUseCase ────────────────────────────────────────────────────────
pub struct TrainImageUseCase {
    config: ImageTrainConfig,
}

impl TrainImageUseCase {
    pub fn new(config: ImageTrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        if cfg.batch_size == 0 || cfg.image_size == 0 {
            bail!("batch size and image size must be positive");
        }

        // ── Steps 1-2: datasets ───────────────────────────────────────────────
        tracing::info!("Scanning training images in '{}'", cfg.train_dir.display());
        let train_dataset = ImageFolderDataset::scan(&cfg.train_dir, cfg.image_size)?
            .with_augmentation(Augmentation::default(), cfg.seed);

        tracing::info!("Scanning validation images in '{}'", cfg.val_dir.display());
        let val_dataset = ImageFolderDataset::scan(&cfg.val_dir, cfg.image_size)?;

        if train_dataset.class_names() != val_dataset.class_names() {
            bail!(
                "Class folders differ: training has {:?}, validation has {:?}",
                train_dataset.class_names(),
                val_dataset.class_names()
            );
        }
        tracing::info!(
            "{} training images, {} validation images",
            train_dataset.sample_count(),
            val_dataset.sample_count()
        );

        // ── Step 3: architecture config ───────────────────────────────────────
        let model_cfg    = CatDogNetConfig::new().with_image_size(cfg.image_size);
        let ckpt_manager = CheckpointManager::new(&cfg.model_dir, &cfg.model_name);
        if ckpt_manager.exists() {
            tracing::warn!("Overwriting the model in '{}'", ckpt_manager.weights_path().display());
        }
        ckpt_manager.save_config(&model_cfg)?;

        // ── Step 4: metrics ───────────────────────────────────────────────────
        let metrics = MetricsLogger::create(cfg.model_dir.join("metrics.csv"))?;

        // ── Step 5: train ─────────────────────────────────────────────────────
        let summary = run_training(cfg, &model_cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)?;

        tracing::info!(
            "Best epoch {} (val_loss={:.4}); model saved to '{}', metrics in '{}'",
            summary.best_epoch,
            summary.best_val_loss,
            ckpt_manager.weights_path().display(),
            metrics.csv_path().display()
        );
        Ok(summary)
    }
}
