// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. clap parses the
// arguments; everything else is delegated to Layer 2.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, LoanArgs, ServeArgs, TrainImageArgs};

use crate::domain::prediction::Prediction;

#[derive(Parser, Debug)]
#[command(
    name = "catdog-loan",
    version,
    about = "Cat/dog image classification service and loan approval model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routes only, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args)      => run_serve(args),
            Commands::Classify(args)   => run_classify(args),
            Commands::TrainImage(args) => run_train_image(args),
            Commands::Loan(args)       => run_loan(args),
        }
    }
}

fn run_serve(args: ServeArgs) -> Result<()> {
    use crate::application::serve_use_case::ServeUseCase;

    ServeUseCase::new(args.into()).execute()
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;

    let use_case   = ClassifyUseCase::from_checkpoint(&args.model_dir, &args.model_name)?;
    let prediction = use_case.classify_file(&args.image)?;
    println!("{}", prediction_line(&prediction));
    Ok(())
}

fn run_train_image(args: TrainImageArgs) -> Result<()> {
    use crate::application::train_image_use_case::TrainImageUseCase;

    tracing::info!("Training on '{}', validating on '{}'", args.train_dir.display(), args.val_dir.display());
    let summary = TrainImageUseCase::new(args.into()).execute()?;

    println!(
        "Training complete: {} epoch(s){}, best epoch {} with val_loss {:.4}.",
        summary.epochs_run,
        if summary.stopped_early { " (stopped early)" } else { "" },
        summary.best_epoch,
        summary.best_val_loss,
    );
    Ok(())
}

fn run_loan(args: LoanArgs) -> Result<()> {
    use crate::application::loan_use_case::LoanUseCase;

    let outcome = LoanUseCase::new(args.into()).execute()?;

    println!(
        "Rows: {} of {} usable ({} dropped); train {}, test {}",
        outcome.stats.input_rows - outcome.stats.dropped_rows,
        outcome.stats.input_rows,
        outcome.stats.dropped_rows,
        outcome.train_rows,
        outcome.test_rows,
    );
    println!("Accuracy: {:.4}", outcome.report.accuracy);
    println!("Classification Report:\n{}", outcome.report);
    println!(
        "Loan Status: {}",
        if outcome.decision.approved { "Approved" } else { "Rejected" }
    );
    println!("Approval Probability: {:.4} %", outcome.decision.probability * 100.0);
    Ok(())
}

/// "Prediction: DOG (0.87)"
fn prediction_line(prediction: &Prediction) -> String {
    format!(
        "Prediction: {} ({:.2})",
        prediction.predicted_class.as_str().to_uppercase(),
        prediction.confidence
    )
}
