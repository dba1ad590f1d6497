// ============================================================
// Layer 4: Image Folder Dataset
// ============================================================
// Implements Burn's Dataset trait over a directory laid out as
//
//   training_set/
//     cats/  cat.1.jpg  cat.2.jpg ...
//     dogs/  dog.1.jpg  dog.2.jpg ...
//
// Class indices follow the sorted folder names, so with the usual
// layout "cats" = 0 and "dogs" = 1, which is exactly what the
// network's single sigmoid output means: P(dog).
//
// Every file is fully decoded once while scanning and skipped with a
// warning if that fails. Burn's batch iterator ends the epoch at the
// first `None`, so `get` must answer for every in-range index; the
// decoded pixels are not kept, only the path.
//
// Augmentation (training only) is seeded per item from the run seed,
// the index and how many times that index has been fetched, so a
// given seed replays the same jitter regardless of worker scheduling.
//
// Reference: Burn Book §4 (Datasets)

use anyhow::{bail, Context, Result};
use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, SeedableRng};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU32, Ordering},
};

use crate::data::{augment::Augmentation, preprocessor::Preprocessor};

/// One labelled file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    pub path:  PathBuf,
    pub label: u8,
}

/// One decoded and preprocessed training item, CHW pixels in [0, 1].
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub pixels: Vec<f32>,
    pub label:  u8,
}

pub struct ImageFolderDataset {
    samples:      Vec<ImageSample>,
    class_names:  Vec<String>,
    preprocessor: Preprocessor,
    augmentation: Option<Augmentation>,
    seed:         u64,
    visits:       Vec<AtomicU32>,
}

impl ImageFolderDataset {
    /// Scan `root` for exactly two class folders and their images.
    pub fn scan(root: impl AsRef<Path>, image_size: usize) -> Result<Self> {
        let root = root.as_ref();

        let mut class_dirs: Vec<PathBuf> = fs::read_dir(root)
            .with_context(|| format!("Cannot read image folder '{}'", root.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        class_dirs.sort();

        if class_dirs.len() != 2 {
            bail!(
                "Expected 2 class folders in '{}', found {}",
                root.display(),
                class_dirs.len()
            );
        }

        let mut samples     = Vec::new();
        let mut class_names = Vec::new();

        for (label, dir) in class_dirs.iter().enumerate() {
            let name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();

            let mut files: Vec<PathBuf> = fs::read_dir(dir)
                .with_context(|| format!("Cannot read class folder '{}'", dir.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            files.sort();

            let mut kept = 0usize;
            for path in files {
                match image::open(&path) {
                    Ok(_) => {
                        samples.push(ImageSample { path, label: label as u8 });
                        kept += 1;
                    }
                    Err(e) => tracing::warn!("Skipping '{}': {}", path.display(), e),
                }
            }

            tracing::info!("Class {} = '{}' ({} images)", label, name, kept);
            class_names.push(name);
        }

        let visits = samples.iter().map(|_| AtomicU32::new(0)).collect();
        Ok(Self {
            samples,
            class_names,
            preprocessor: Preprocessor::new(image_size),
            augmentation: None,
            seed:         0,
            visits,
        })
    }

    /// Turn on random augmentation, reproducible for a given `seed`.
    pub fn with_augmentation(mut self, augmentation: Augmentation, seed: u64) -> Self {
        self.augmentation = Some(augmentation);
        self.seed         = seed;
        self
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn item_rng(&self, index: usize) -> StdRng {
        let visit = self.visits[index].fetch_add(1, Ordering::Relaxed);
        let mixed = self.seed
            ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (visit as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        StdRng::seed_from_u64(mixed)
    }

    fn load(&self, index: usize) -> Result<ImageItem> {
        let sample = &self.samples[index];
        let img = image::open(&sample.path)
            .with_context(|| format!("Cannot decode '{}'", sample.path.display()))?;

        let mut resized = self.preprocessor.resize(&img.to_rgb8());
        if let Some(aug) = &self.augmentation {
            resized = aug.apply(&resized, &mut self.item_rng(index));
        }

        let tensor = self.preprocessor.to_tensor(&resized);
        Ok(ImageItem { pixels: tensor.data, label: sample.label })
    }
}

impl Dataset<ImageItem> for ImageFolderDataset {
    /// A file that stopped decoding after the scan is replaced by the
    /// next readable sample rather than ending the epoch.
    fn get(&self, index: usize) -> Option<ImageItem> {
        let n = self.samples.len();
        if index >= n {
            return None;
        }
        for offset in 0..n {
            let i = (index + offset) % n;
            match self.load(i) {
                Ok(item) => return Some(item),
                Err(e) => tracing::warn!("{e:#}"),
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
