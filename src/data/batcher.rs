// ============================================================
// Layer 4: Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack preprocessed images
// into one tensor per mini-batch.
//
// How batching works here:
//   Input:  Vec of N ImageItems, each with 3 * S * S pixels (CHW)
//   Output: ImageBatch with images [N, 3, S, S] and targets [N, 1]
//
//   All pixel vectors are flattened into one long Vec, then reshaped.
//   Every item has the same length because the dataset resizes
//   each image to the same square size.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ImageItem;

/// A batch of images ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Pixels, shape [batch_size, 3, size, size]
    pub images: Tensor<B, 4>,

    /// 0.0 = cat, 1.0 = dog, shape [batch_size, 1]
    pub targets: Tensor<B, 2>,
}

/// Holds the target device so tensors are created on the right CPU/GPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device:     B::Device,
    pub image_size: usize,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }
}

impl<B: Backend> Batcher<ImageItem, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageItem>) -> ImageBatch<B> {
        let batch_size = items.len();
        let side       = self.image_size;

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.pixels.iter().copied())
            .collect();

        let labels: Vec<f32> = items.iter().map(|item| item.label as f32).collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, 3, side, side]);

        let targets = Tensor::<B, 1>::from_floats(labels.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        ImageBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device  = Default::default();
        let batcher = ImageBatcher::<NdArray>::new(device, 4);
        let items = vec![
            ImageItem { pixels: vec![0.0; 48], label: 0 },
            ImageItem { pixels: vec![1.0; 48], label: 1 },
        ];
        let batch = batcher.batch(items);
        assert_eq!(batch.images.dims(), [2, 3, 4, 4]);
        assert_eq!(batch.targets.dims(), [2, 1]);

        let targets: Vec<f32> = batch.targets.into_data().to_vec::<f32>().unwrap();
        assert_eq!(targets, vec![0.0, 1.0]);
    }
}
