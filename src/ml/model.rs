use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
        PaddingConfig2d,
        Relu,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CatDogNetConfig {
    /// Side length of the square RGB input
    #[config(default = 224)]
    pub image_size: usize,
    /// Width of the dense layer before the output logit
    #[config(default = 128)]
    pub hidden: usize,
    #[config(default = 0.3)]
    pub dropout: f64,
}

impl CatDogNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> CatDogNet<B> {
        let blocks = [(3, 16), (16, 32), (32, 64)]
            .into_iter()
            .map(|(c_in, c_out)| ConvBlock {
                conv: Conv2dConfig::new([c_in, c_out], [3, 3])
                    .with_padding(PaddingConfig2d::Same)
                    .init(device),
                pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
                activation: Relu::new(),
            })
            .collect();

        CatDogNet {
            blocks,
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dense:       LinearConfig::new(64, self.hidden).init(device),
            output:      LinearConfig::new(self.hidden, 1).init(device),
            dropout:     DropoutConfig::new(self.dropout).init(),
            activation:  Relu::new(),
        }
    }
}

/// conv 3x3 (same padding) → ReLU → 2x2 max-pool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv:       Conv2d<B>,
    pub pool:       MaxPool2d,
    pub activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.pool.forward(self.activation.forward(self.conv.forward(x)))
    }
}

/// Binary cat/dog classifier. A single output logit; sigmoid(logit) = P(dog).
#[derive(Module, Debug)]
pub struct CatDogNet<B: Backend> {
    pub blocks:      Vec<ConvBlock<B>>,
    pub global_pool: AdaptiveAvgPool2d,
    pub dense:       Linear<B>,
    pub output:      Linear<B>,
    pub dropout:     Dropout,
    pub activation:  Relu,
}

impl<B: Backend> CatDogNet<B> {
    /// images: [batch, 3, size, size] → logits: [batch, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for block in &self.blocks {
            x = block.forward(x);
        }

        // Global average pooling makes the head independent of input size.
        let x = self.global_pool.forward(x).flatten::<2>(1, 3); // [batch, 64]
        let x = self.activation.forward(self.dense.forward(x));
        self.output.forward(self.dropout.forward(x))
    }

    /// images → P(dog), shape [batch, 1]
    pub fn forward_probability(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::sigmoid(self.forward(images))
    }

    pub fn forward_loss(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss   = binary_cross_entropy_with_logits(logits.clone(), targets);
        (loss, logits)
    }
}

/// Mean binary cross entropy computed on logits.
///
///   loss = max(z, 0) - z * y + ln(1 + e^(-|z|))
///
/// Algebraically equal to -[y ln σ(z) + (1 - y) ln(1 - σ(z))] but never
/// takes the log of a value that underflowed to zero.
pub fn binary_cross_entropy_with_logits<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let positive_part = logits.clone().clamp_min(0.0);
    let linear_part   = logits.clone() * targets;
    let log_part      = logits.abs().neg().exp().add_scalar(1.0).log();
    (positive_part - linear_part + log_part).mean()
}
