// ============================================================
// Layer 6: Model Artifact Store
// ============================================================
// Saves and restores the image classifier with Burn's gzipped
// named-MessagePack recorder at half precision.
//
// A model artifact is two files sharing one base name:
//
//   <model_dir>/
//     cat_dog_model.json     ← CatDogNetConfig (architecture)
//     cat_dog_model.mpk.gz   ← learned weights
//
// The config is needed to rebuild a network with the same shape
// before the weights can be loaded into it.
//
// Training writes the pair only when validation loss improves, so
// the artifact on disk is always the best epoch seen so far.
//
// Loading distinguishes two failures:
//   NotFound → nothing trained yet (or wrong --model-dir)
//   Corrupt  → the files exist but do not describe a usable model
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FileRecorder, HalfPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::{CatDogNet, CatDogNetConfig};

/// Writes `<base>.mpk.gz`; the extension comes from the recorder itself.
type WeightsRecorder = NamedMpkGzFileRecorder<HalfPrecisionSettings>;

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at '{0}'")]
    NotFound(PathBuf),

    #[error("model artifact at '{path}' is unusable: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Knows where the artifact pair for one model lives.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir:  PathBuf,
    name: String,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { dir: dir.into(), name: name.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.name))
    }

    /// Base path handed to the recorder (no extension).
    fn weights_base(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn weights_path(&self) -> PathBuf {
        let ext = <WeightsRecorder as FileRecorder<burn::backend::NdArray>>::file_extension();
        self.dir.join(format!("{}.{}", self.name, ext))
    }

    pub fn exists(&self) -> bool {
        self.config_path().is_file() && self.weights_path().is_file()
    }

    // ─── Saving ───────────────────────────────────────────────────────────────

    pub fn save_config(&self, cfg: &CatDogNetConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;

        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    /// Overwrites the weights file with `model`'s parameters.
    pub fn save_model<B: Backend>(&self, model: &CatDogNet<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        let base = self.weights_base();
        WeightsRecorder::new()
            .record(model.clone().into_record(), base.clone())
            .with_context(|| format!("Failed to save weights to '{}'", base.display()))?;

        tracing::debug!("Saved weights to '{}'", self.weights_path().display());
        Ok(())
    }

    // ─── Loading ──────────────────────────────────────────────────────────────

    pub fn load_config(&self) -> Result<CatDogNetConfig, ModelLoadError> {
        let path = self.config_path();
        let json = read_existing(&path)?;
        serde_json::from_str(&json).map_err(|e| ModelLoadError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }

    /// Rebuild the network described by the saved config and load the
    /// saved weights into it. Dropout is irrelevant at inference time.
    pub fn load_model<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<(CatDogNet<B>, CatDogNetConfig), ModelLoadError> {
        let cfg = self.load_config()?;

        let weights = self.weights_path();
        if !weights.is_file() {
            return Err(ModelLoadError::NotFound(weights));
        }

        let model: CatDogNet<B> = cfg.clone().with_dropout(0.0).init(device);
        let record = WeightsRecorder::new()
            .load(self.weights_base(), device)
            .map_err(|e| ModelLoadError::Corrupt {
                path:   weights.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!("Loaded model from '{}'", weights.display());
        Ok((model.load_record(record), cfg))
    }
}

fn read_existing(path: &Path) -> Result<String, ModelLoadError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ModelLoadError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(ModelLoadError::Corrupt {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    #[test]
    fn test_paths_share_base_name() {
        let ckpt = CheckpointManager::new("models", "cat_dog_model");
        assert_eq!(ckpt.config_path(),  PathBuf::from("models/cat_dog_model.json"));
        assert_eq!(ckpt.weights_path(), PathBuf::from("models/cat_dog_model.mpk.gz"));
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "absent");
        assert!(!ckpt.exists());
        let err = ckpt.load_model::<B>(&Default::default()).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }

    #[test]
    fn test_garbage_config_is_corrupt() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "broken");
        fs::write(ckpt.config_path(), "not json").unwrap();
        let err = ckpt.load_config().unwrap_err();
        assert!(matches!(err, ModelLoadError::Corrupt { .. }));
    }

    #[test]
    fn test_garbage_weights_are_corrupt() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "broken");
        ckpt.save_config(&CatDogNetConfig::new()).unwrap();
        fs::write(ckpt.weights_path(), b"definitely not gzip").unwrap();
        let err = ckpt.load_model::<B>(&Default::default()).unwrap_err();
        assert!(matches!(err, ModelLoadError::Corrupt { .. }));
    }

    #[test]
    fn test_written_files_match_reported_paths() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path(), "cat_dog_model");
        let cfg  = CatDogNetConfig::new().with_image_size(16).with_hidden(8);
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&cfg.init::<B>(&Default::default())).unwrap();

        let mut on_disk: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        on_disk.sort();
        assert_eq!(on_disk, vec![ckpt.config_path(), ckpt.weights_path()]);
        assert!(ckpt.load_model::<B>(&Default::default()).is_ok());
    }

    #[test]
    fn test_save_then_load_restores_weights() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path(), "model");
        let device = Default::default();
        let cfg    = CatDogNetConfig::new().with_image_size(16).with_hidden(8);
        let model: CatDogNet<B> = cfg.init(&device);

        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&model).unwrap();
        assert!(ckpt.exists());

        let (loaded, loaded_cfg) = ckpt.load_model::<B>(&device).unwrap();
        assert_eq!(loaded_cfg.image_size, 16);
        assert_eq!(loaded_cfg.hidden, 8);

        let input = Tensor::<B, 4>::ones([1, 3, 16, 16], &device);
        let a: Vec<f32> = model.forward_probability(input.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = loaded.forward_probability(input).into_data().to_vec().unwrap();
        // weights are stored at half precision
        assert!((a[0] - b[0]).abs() < 1e-2);
    }
}
