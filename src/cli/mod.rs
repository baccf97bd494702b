// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `train`    — downloads MNIST if needed, trains, saves
//   2. `evaluate` — scores the saved model on the test split
//   3. `predict`  — classifies one image
//   4. `serve`    — drawing page + prediction API
//
// The backend is picked here, once, and threaded through as a
// type parameter.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BackendKind, Commands, EvaluateArgs, PredictArgs, ServeArgs, TrainArgs};

use crate::application::{
    evaluate_use_case::EvaluateUseCase,
    predict_use_case::PredictUseCase,
    serve_use_case::ServeUseCase,
    train_use_case::TrainUseCase,
};
use crate::ml::{CpuAutodiff, CpuBackend, GpuAutodiff, GpuBackend};

#[derive(Parser, Debug)]
#[command(
    name = "mnist-digits",
    version,
    about = "Train a dense network on MNIST and recognise hand-drawn digits."
)]
pub struct Cli {
    /// Compute backend
    #[arg(long, value_enum, global = true, default_value_t = BackendKind::Ndarray)]
    pub backend: BackendKind,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the use case. This layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        tracing::debug!("Using {:?} backend", self.backend);
        match self.command {
            Commands::Train(args)    => run_train(self.backend, args),
            Commands::Evaluate(args) => run_evaluate(self.backend, args),
            Commands::Predict(args)  => run_predict(self.backend, args),
            Commands::Serve(args)    => run_serve(self.backend, args),
        }
    }
}

fn run_train(backend: BackendKind, args: TrainArgs) -> Result<()> {
    let use_case = TrainUseCase::new(args.into());

    let evaluation = match backend {
        BackendKind::Ndarray => use_case.execute::<CpuAutodiff>(Default::default())?.1,
        BackendKind::Wgpu    => use_case.execute::<GpuAutodiff>(Default::default())?.1,
    };

    println!(
        "Training complete. Accuracy {:.2}%. Checkpoint saved.",
        evaluation.accuracy() * 100.0
    );
    Ok(())
}

fn run_evaluate(backend: BackendKind, args: EvaluateArgs) -> Result<()> {
    let use_case = EvaluateUseCase::new(args.into());

    match backend {
        BackendKind::Ndarray => use_case.execute::<CpuBackend>(Default::default())?,
        BackendKind::Wgpu    => use_case.execute::<GpuBackend>(Default::default())?,
    };
    Ok(())
}

fn run_predict(backend: BackendKind, args: PredictArgs) -> Result<()> {
    let use_case = PredictUseCase::new(args.data.into(), args.image);

    let outcome = match backend {
        BackendKind::Ndarray => use_case.execute::<CpuBackend>(Default::default())?,
        BackendKind::Wgpu    => use_case.execute::<GpuBackend>(Default::default())?,
    };

    println!("Image:      {}", outcome.path.display());
    if let Some(label) = outcome.label {
        println!("Label:      {label}");
    }
    println!(
        "Prediction: {} (p={:.4})",
        outcome.prediction.digit,
        outcome.prediction.confidence()
    );
    println!("Output:     {:?}", outcome.prediction.probabilities);
    Ok(())
}

fn run_serve(backend: BackendKind, args: ServeArgs) -> Result<()> {
    let use_case = ServeUseCase::new(args.into());

    match backend {
        BackendKind::Ndarray => use_case.execute::<CpuAutodiff>(Default::default()),
        BackendKind::Wgpu    => use_case.execute::<GpuAutodiff>(Default::default()),
    }
}
