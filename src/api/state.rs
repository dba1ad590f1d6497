use std::sync::Arc;

use crate::domain::traits::ImageClassifier;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// The loaded image model. `None` when the server was started
    /// with --allow-missing-model and no artifact could be loaded.
    pub classifier: Option<Arc<dyn ImageClassifier>>,
}

impl AppState {
    pub fn new(classifier: Option<Arc<dyn ImageClassifier>>) -> Self {
        Self { classifier }
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }
}
