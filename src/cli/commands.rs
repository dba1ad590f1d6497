// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their flags:
//
//   serve        run the HTTP prediction service
//   classify     classify one image file
//   train-image  train the cat/dog model from image folders
//   loan         fit and evaluate the loan approval model
//
// Defaults reproduce the fixed paths the service has always used;
// most flags can also be set through CATDOG_* environment variables.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    loan_use_case::LoanConfig,
    serve_use_case::{ServeConfig, DEFAULT_MAX_BODY_BYTES},
    train_image_use_case::ImageTrainConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve /predict and /health over HTTP
    Serve(ServeArgs),

    /// Classify a single image file as cat or dog
    Classify(ClassifyArgs),

    /// Train the cat/dog model on class-per-folder image directories
    TrainImage(TrainImageArgs),

    /// Fit the loan approval model, print its report and score an example applicant
    Loan(LoanArgs),
}

// ─── serve ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory holding the model artifact
    #[arg(long, env = "CATDOG_MODEL_DIR", default_value = ".")]
    pub model_dir: PathBuf,

    /// Artifact base name (<name>.json + <name>.mpk.gz)
    #[arg(long, env = "CATDOG_MODEL_NAME", default_value = "cat_dog_model")]
    pub model_name: String,

    #[arg(long, env = "CATDOG_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "CATDOG_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Largest accepted request body
    #[arg(long, env = "CATDOG_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Start even if the model cannot be loaded (/predict then answers 500)
    #[arg(long)]
    pub allow_missing_model: bool,
}

impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig {
            model_dir:           a.model_dir,
            model_name:          a.model_name,
            host:                a.host,
            port:                a.port,
            max_body_bytes:      a.max_body_bytes,
            allow_missing_model: a.allow_missing_model,
        }
    }
}

// ─── classify ─────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// JPEG or PNG file to classify
    #[arg(long)]
    pub image: PathBuf,

    #[arg(long, env = "CATDOG_MODEL_DIR", default_value = ".")]
    pub model_dir: PathBuf,

    #[arg(long, env = "CATDOG_MODEL_NAME", default_value = "cat_dog_model")]
    pub model_name: String,
}

// ─── train-image ──────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TrainImageArgs {
    /// One sub-folder per class, e.g. training_set/cats and training_set/dogs
    #[arg(long, default_value = "training_set")]
    pub train_dir: PathBuf,

    /// Same layout as --train-dir
    #[arg(long, default_value = "test_set")]
    pub val_dir: PathBuf,

    #[arg(long, env = "CATDOG_MODEL_DIR", default_value = ".")]
    pub model_dir: PathBuf,

    #[arg(long, env = "CATDOG_MODEL_NAME", default_value = "cat_dog_model")]
    pub model_name: String,

    /// Square input side in pixels
    #[arg(long, default_value_t = 224)]
    pub image_size: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Upper bound; early stopping may end the run sooner
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Learning-rate multiplier applied when validation loss plateaus
    #[arg(long, default_value_t = 0.2)]
    pub lr_factor: f64,

    /// Epochs without improvement before the learning rate is reduced
    #[arg(long, default_value_t = 2)]
    pub lr_patience: usize,

    /// Epochs without validation-loss improvement before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data loader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,
}

impl From<TrainImageArgs> for ImageTrainConfig {
    fn from(a: TrainImageArgs) -> Self {
        ImageTrainConfig {
            train_dir:   a.train_dir,
            val_dir:     a.val_dir,
            model_dir:   a.model_dir,
            model_name:  a.model_name,
            image_size:  a.image_size,
            batch_size:  a.batch_size,
            epochs:      a.epochs,
            lr:          a.lr,
            lr_factor:   a.lr_factor,
            lr_patience: a.lr_patience,
            patience:    a.patience,
            seed:        a.seed,
            num_workers: a.num_workers,
        }
    }
}

// ─── loan ─────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct LoanArgs {
    /// Loan CSV with a Loan_Status column
    #[arg(long = "data", env = "CATDOG_LOAN_DATA", default_value = "loan_data.csv")]
    pub data_path: PathBuf,

    /// Share of rows held out for the report
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<LoanArgs> for LoanConfig {
    fn from(a: LoanArgs) -> Self {
        LoanConfig {
            data_path:     a.data_path,
            test_fraction: a.test_fraction,
            seed:          a.seed,
        }
    }
}
