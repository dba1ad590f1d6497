// ============================================================
// Layer 2: Classify Use Case
// ============================================================
// One image in, one Prediction out:
//
//   Step 1: Decode the bytes (JPEG/PNG only)   (Layer 4 - data)
//   Step 2: Resize + normalise                 (Layer 4 - data)
//   Step 3: P(dog) from the classifier         (Layer 5 - ml)
//   Step 4: Format cat/dog probabilities       (Layer 3 - domain)
//
// Used by both the HTTP handler and the `classify` command, so the
// two always agree on the answer for the same image.
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::Path, sync::Arc};
use thiserror::Error;

use crate::data::{
    decoder::{decode_image, DecodeError},
    preprocessor::Preprocessor,
};
use crate::domain::{
    image::ImageSource,
    prediction::Prediction,
    traits::{ImageClassifier, InferenceError},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::BurnClassifier;

#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The request itself is bad: client error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The model failed on a well-formed image: server error.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Run steps 1-4 against any classifier.
pub fn classify(
    classifier: &dyn ImageClassifier,
    source:     &ImageSource,
) -> Result<Prediction, ClassifyError> {
    let image  = decode_image(source)?;
    let tensor = Preprocessor::new(classifier.input_size()).process(&image);
    let dog    = classifier.dog_probability(&tensor)?;

    let prediction = Prediction::from_dog_probability(dog);
    tracing::debug!(
        "Classified {} image {}x{} as {} ({:.4})",
        source.kind(),
        image.width(),
        image.height(),
        prediction.predicted_class,
        prediction.confidence,
    );
    Ok(prediction)
}

// ─── ClassifyUseCase ──────────────────────────────────────────────────────────
// Owns a loaded classifier for the `classify` command.
pub struct ClassifyUseCase {
    classifier: Arc<dyn ImageClassifier>,
}

impl ClassifyUseCase {
    pub fn new(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self { classifier }
    }

    pub fn from_checkpoint(model_dir: &Path, model_name: &str) -> Result<Self> {
        let ckpt       = CheckpointManager::new(model_dir, model_name);
        let classifier = BurnClassifier::from_checkpoint(&ckpt)
            .context("Cannot load the image model. Have you run 'train-image' first?")?;
        Ok(Self::new(Arc::new(classifier)))
    }

    pub fn classify_file(&self, path: &Path) -> Result<Prediction> {
        let bytes = fs::read(path)
            .with_context(|| format!("Cannot read image '{}'", path.display()))?;

        let source = ImageSource::Multipart {
            filename: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            bytes,
        };
        classify(self.classifier.as_ref(), &source)
            .with_context(|| format!("Cannot classify '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::decoder::tests::encoded_image;
    use crate::domain::{image::ImageTensor, prediction::Label};

    /// Returns a fixed probability; records nothing.
    pub(crate) struct FixedClassifier {
        pub dog:  f32,
        pub size: usize,
    }

    impl ImageClassifier for FixedClassifier {
        fn dog_probability(&self, image: &ImageTensor) -> Result<f32, InferenceError> {
            assert_eq!(image.shape(), [1, 3, self.size, self.size]);
            Ok(self.dog)
        }

        fn input_size(&self) -> usize {
            self.size
        }
    }

    struct BrokenClassifier;

    impl ImageClassifier for BrokenClassifier {
        fn dog_probability(&self, _: &ImageTensor) -> Result<f32, InferenceError> {
            Err(InferenceError::InvalidOutput(f32::NAN))
        }

        fn input_size(&self) -> usize {
            8
        }
    }

    fn png_upload() -> ImageSource {
        ImageSource::Multipart {
            filename: Some("pet.png".to_string()),
            bytes:    encoded_image(image::ImageFormat::Png),
        }
    }

    #[test]
    fn test_classify_uses_model_input_size() {
        let c = FixedClassifier { dog: 0.8, size: 12 };
        let p = classify(&c, &png_upload()).unwrap();
        assert_eq!(p.predicted_class, Label::Dog);
        assert!((p.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_decode_failure_is_client_error() {
        let c   = FixedClassifier { dog: 0.8, size: 8 };
        let src = ImageSource::Multipart { filename: Some("a.txt".to_string()), bytes: b"hello".to_vec() };
        assert!(matches!(classify(&c, &src), Err(ClassifyError::Decode(_))));
    }

    #[test]
    fn test_model_failure_is_inference_error() {
        assert!(matches!(
            classify(&BrokenClassifier, &png_upload()),
            Err(ClassifyError::Inference(_))
        ));
    }

    #[test]
    fn test_classify_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.jpg");
        fs::write(&path, encoded_image(image::ImageFormat::Jpeg)).unwrap();

        let uc = ClassifyUseCase::new(Arc::new(FixedClassifier { dog: 0.13, size: 8 }));
        let p  = uc.classify_file(&path).unwrap();
        assert_eq!(p.predicted_class, Label::Cat);
        assert!((p.confidence - 0.87).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file() {
        let uc = ClassifyUseCase::new(Arc::new(FixedClassifier { dog: 0.5, size: 8 }));
        assert!(uc.classify_file(Path::new("/no/such/file.png")).is_err());
    }
}
