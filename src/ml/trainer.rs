// ============================================================
// Layer 5: Image Training Loop
// ============================================================
// Train + validation loop for CatDogNet using Burn's DataLoader
// and Adam.
//
//   - Training runs on TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InnerBackend (NdArray),
//     with dropout disabled
//   - The validation batcher must therefore use InnerBackend too
//
// Early stopping:
//   Every epoch whose validation loss beats the best so far is
//   written to disk (overwriting the previous best). After
//   `patience` epochs without improvement the loop stops. The
//   artifact left on disk is always the best epoch.
//
// Learning rate:
//   After `lr_patience` epochs without improvement the rate is
//   multiplied by `lr_factor` and the stale count starts over.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_image_use_case::ImageTrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageFolderDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::{binary_cross_entropy_with_logits, CatDogNet, CatDogNetConfig};

type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
type InnerBackend = burn::backend::NdArray;

/// What happened during a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub epochs_run:    usize,
    pub best_epoch:    usize,
    pub best_val_loss: f64,
    pub stopped_early: bool,
}

// ─── Validation tally ─────────────────────────────────────────────────────────
// Accumulates loss and a 2x2 confusion matrix over validation batches.
// "Positive" means dog (label 1).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationTally {
    loss_sum:        f64,
    batches:         usize,
    true_positives:  usize,
    false_positives: usize,
    true_negatives:  usize,
    false_negatives: usize,
}

impl ValidationTally {
    pub fn add_batch(&mut self, loss: f64, probabilities: &[f32], targets: &[f32]) {
        self.loss_sum += loss;
        self.batches  += 1;

        for (&p, &t) in probabilities.iter().zip(targets) {
            let predicted_dog = p > 0.5;
            let actual_dog    = t > 0.5;
            match (predicted_dog, actual_dog) {
                (true,  true)  => self.true_positives  += 1,
                (true,  false) => self.false_positives += 1,
                (false, false) => self.true_negatives  += 1,
                (false, true)  => self.false_negatives += 1,
            }
        }
    }

    pub fn samples(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn mean_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    pub fn accuracy(&self) -> f64 {
        let n = self.samples();
        if n > 0 { (self.true_positives + self.true_negatives) as f64 / n as f64 } else { 0.0 }
    }

    /// 0.0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        let predicted = self.true_positives + self.false_positives;
        if predicted > 0 { self.true_positives as f64 / predicted as f64 } else { 0.0 }
    }
}

// ─── Early stopping ───────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:       usize,
    best_val_loss:  f64,
    best_epoch:     usize,
    stale_epochs:   usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best_val_loss: f64::INFINITY, best_epoch: 0, stale_epochs: 0 }
    }

    /// Record an epoch. Returns true if it is the new best.
    pub fn observe(&mut self, metrics: &EpochMetrics) -> bool {
        if metrics.is_improvement(self.best_val_loss) {
            self.best_val_loss = metrics.val_loss;
            self.best_epoch    = metrics.epoch;
            self.stale_epochs  = 0;
            true
        } else {
            self.stale_epochs += 1;
            false
        }
    }

    pub fn should_stop(&self) -> bool {
        self.stale_epochs >= self.patience
    }
}

// ─── Plateau learning-rate schedule ──────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct PlateauScheduler {
    lr:           f64,
    factor:       f64,
    patience:     usize,
    stale_epochs: usize,
}

impl PlateauScheduler {
    pub fn new(lr: f64, factor: f64, patience: usize) -> Self {
        Self { lr, factor, patience, stale_epochs: 0 }
    }

    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Feed one epoch's outcome; returns the rate for the next epoch.
    pub fn observe(&mut self, improved: bool) -> f64 {
        if improved {
            self.stale_epochs = 0;
        } else {
            self.stale_epochs += 1;
            if self.stale_epochs >= self.patience {
                self.lr *= self.factor;
                self.stale_epochs = 0;
                tracing::info!("Validation loss plateaued, learning rate now {:.2e}", self.lr);
            }
        }
        self.lr
    }
}

// ─── Training loop ────────────────────────────────────────────────────────────
pub fn run_training(
    cfg:           &ImageTrainConfig,
    model_cfg:     &CatDogNetConfig,
    train_dataset: ImageFolderDataset,
    val_dataset:   ImageFolderDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainingSummary> {
    if train_dataset.is_empty() {
        bail!("Training set is empty");
    }
    if val_dataset.is_empty() {
        bail!("Validation set is empty");
    }

    let device = burn::backend::ndarray::NdArrayDevice::default();
    TrainBackend::seed(cfg.seed);
    tracing::info!("Using NdArray device: {:?}", device);

    let mut model: CatDogNet<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: input {}x{}, hidden {}",
        model_cfg.image_size, model_cfg.image_size, model_cfg.hidden
    );

    // m = β1*m + (1-β1)*g
    // v = β2*v + (1-β2)*g²
    // θ = θ - lr * m / (√v + ε)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let train_loader = DataLoaderBuilder::new(ImageBatcher::<TrainBackend>::new(device.clone(), cfg.image_size))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(ImageBatcher::<InnerBackend>::new(device.clone(), cfg.image_size))
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(val_dataset);

    let mut stopper    = EarlyStopping::new(cfg.patience);
    let mut scheduler  = PlateauScheduler::new(cfg.lr, cfg.lr_factor, cfg.lr_patience);
    let mut epochs_run = 0usize;

    for epoch in 1..=cfg.epochs {
        epochs_run = epoch;

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.images, batch.targets);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(scheduler.lr(), model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut tally   = ValidationTally::default();

        for batch in val_loader.iter() {
            let logits = model_valid.forward(batch.images);
            let loss: f64 = binary_cross_entropy_with_logits(logits.clone(), batch.targets.clone())
                .into_scalar()
                .elem::<f64>();

            let probabilities = burn::tensor::activation::sigmoid(logits)
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow::anyhow!("Cannot read validation output: {e:?}"))?;
            let targets = batch.targets
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow::anyhow!("Cannot read validation targets: {e:?}"))?;

            tally.add_batch(loss, &probabilities, &targets);
        }

        let m = EpochMetrics::new(
            epoch,
            avg_train_loss,
            tally.mean_loss(),
            tally.accuracy(),
            tally.precision(),
        );
        metrics.log(&m)?;

        println!(
            "Epoch {:>3}/{} | lr={:.2e} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}% | val_precision={:.1}%",
            epoch, cfg.epochs, scheduler.lr(), m.train_loss, m.val_loss,
            m.val_accuracy * 100.0, m.val_precision * 100.0,
        );

        let improved = stopper.observe(&m);
        if improved {
            ckpt_manager.save_model(&model_valid)?;
            tracing::info!("New best model at epoch {} (val_loss={:.4})", epoch, m.val_loss);
        }
        scheduler.observe(improved);

        if stopper.should_stop() {
            tracing::info!(
                "No improvement for {} epochs, stopping early",
                cfg.patience
            );
            break;
        }
    }

    tracing::info!("Training complete!");
    Ok(TrainingSummary {
        epochs_run,
        best_epoch:    stopper.best_epoch,
        best_val_loss: stopper.best_val_loss,
        stopped_early: stopper.should_stop(),
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn epoch(n: usize, val_loss: f64) -> EpochMetrics {
        EpochMetrics::new(n, 0.5, val_loss, 0.5, 0.5)
    }

    #[test]
    fn test_tally_confusion_matrix() {
        let mut t = ValidationTally::default();
        // predictions: dog, dog, cat, cat ; truth: dog, cat, cat, dog
        t.add_batch(0.4, &[0.9, 0.7, 0.2, 0.5], &[1.0, 0.0, 0.0, 1.0]);
        t.add_batch(0.6, &[0.1], &[0.0]);

        assert_eq!(t.samples(), 5);
        assert!((t.mean_loss() - 0.5).abs() < 1e-12);
        assert!((t.accuracy() - 3.0 / 5.0).abs() < 1e-12);
        assert!((t.precision() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_precision_without_positive_predictions_is_zero() {
        let mut t = ValidationTally::default();
        t.add_batch(0.7, &[0.1, 0.2], &[1.0, 0.0]);
        assert_eq!(t.precision(), 0.0);
    }

    #[test]
    fn test_empty_tally() {
        let t = ValidationTally::default();
        assert!(t.mean_loss().is_nan());
        assert_eq!(t.accuracy(), 0.0);
    }

    #[test]
    fn test_early_stopping_after_patience() {
        let mut s = EarlyStopping::new(2);
        assert!(s.observe(&epoch(1, 0.70)));
        assert!(s.observe(&epoch(2, 0.60)));
        assert!(!s.observe(&epoch(3, 0.65)));
        assert!(!s.should_stop());
        assert!(!s.observe(&epoch(4, 0.61)));
        assert!(s.should_stop());
        assert_eq!(s.best_epoch, 2);
    }

    #[test]
    fn test_plateau_scales_lr_after_patience() {
        let mut s = PlateauScheduler::new(1e-3, 0.2, 2);
        assert_eq!(s.observe(true), 1e-3);
        assert_eq!(s.observe(false), 1e-3);
        assert!((s.observe(false) - 2e-4).abs() < 1e-15);

        // the stale count restarts after each reduction
        assert!((s.observe(false) - 2e-4).abs() < 1e-15);
        assert!((s.observe(false) - 4e-5).abs() < 1e-15);
    }

    #[test]
    fn test_plateau_improvement_resets_count() {
        let mut s = PlateauScheduler::new(0.01, 0.2, 2);
        s.observe(false);
        s.observe(true);
        s.observe(false);
        assert_eq!(s.lr(), 0.01);
    }

    #[test]
    fn test_improvement_resets_patience() {
        let mut s = EarlyStopping::new(2);
        s.observe(&epoch(1, 0.7));
        s.observe(&epoch(2, 0.8));
        s.observe(&epoch(3, 0.6));
        s.observe(&epoch(4, 0.9));
        assert!(!s.should_stop());
        assert_eq!(s.best_epoch, 3);
    }
}
