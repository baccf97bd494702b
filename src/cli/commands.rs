// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `evaluate`, `predict` and
// `serve` and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{builder::RangedU64ValueParser, Args, Subcommand, ValueEnum};

use crate::application::{serve_use_case::ServeConfig, train_use_case::TrainConfig};
use crate::data::fetcher::MNIST_URL;

/// A count that must be at least one
fn positive() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}

/// Which Burn backend runs the network
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU, pure Rust
    #[default]
    Ndarray,
    /// GPU through WebGPU
    Wgpu,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download MNIST if needed and train a new model
    Train(TrainArgs),

    /// Report accuracy, precision, recall and F1 of the saved model
    Evaluate(EvaluateArgs),

    /// Classify one PNG, or a random test image
    Predict(PredictArgs),

    /// Start the drawing page and prediction API
    Serve(ServeArgs),
}

/// Where the dataset and the checkpoint live
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory the MNIST archive is extracted into
    #[arg(long, default_value = "mnist")]
    pub data_dir: String,

    /// Directory holding the weights, config and metrics CSV
    #[arg(long, default_value = "model")]
    pub model_dir: String,

    /// Where to download the PNG archive from
    #[arg(long, default_value = MNIST_URL)]
    pub dataset_url: String,

    /// Give up on the download after this many seconds
    #[arg(long, default_value_t = 600)]
    pub download_timeout_secs: u64,
}

/// Network size and SGD settings
#[derive(Args, Debug, Clone)]
pub struct HyperArgs {
    /// Number of full passes through the training data
    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    /// Images per mini-batch
    #[arg(long, default_value_t = 10, value_parser = positive())]
    pub batch_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.006)]
    pub lr: f64,

    /// Nesterov momentum coefficient
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// L2 weight decay
    #[arg(long, default_value_t = 1e-4)]
    pub l2: f64,

    /// Width of the hidden layer
    #[arg(long, default_value_t = 1000)]
    pub hidden: usize,

    /// Seed for weight init and shuffling
    #[arg(long, default_value_t = 123)]
    pub seed: u64,

    /// Log the batch loss every N iterations (0 disables)
    #[arg(long, default_value_t = 500)]
    pub log_every: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub hyper: HyperArgs,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Images per evaluation batch
    #[arg(long, default_value_t = 100, value_parser = positive())]
    pub batch_size: usize,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// PNG to classify; a random test image when omitted
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub hyper: HyperArgs,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// URL prefix for every route
    #[arg(long, default_value = "/mnist")]
    pub context_root: String,

    /// Train a fresh model even if one is saved
    #[arg(long)]
    pub retrain: bool,
}

/// Build a TrainConfig from the two flag groups.
/// The application layer never sees clap types.
fn train_config(data: DataArgs, hyper: Option<HyperArgs>) -> TrainConfig {
    let base = TrainConfig {
        data_dir:              data.data_dir,
        model_dir:             data.model_dir,
        dataset_url:           data.dataset_url,
        download_timeout_secs: data.download_timeout_secs,
        ..TrainConfig::default()
    };

    match hyper {
        None => base,
        Some(h) => TrainConfig {
            epochs:      h.epochs,
            batch_size:  h.batch_size,
            lr:          h.lr,
            momentum:    h.momentum,
            l2:          h.l2,
            hidden:      h.hidden,
            seed:        h.seed,
            log_every:   h.log_every,
            num_workers: h.num_workers,
            ..base
        },
    }
}

impl From<DataArgs> for TrainConfig {
    fn from(a: DataArgs) -> Self {
        train_config(a, None)
    }
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        train_config(a.data, Some(a.hyper))
    }
}

impl From<EvaluateArgs> for TrainConfig {
    fn from(a: EvaluateArgs) -> Self {
        TrainConfig {
            batch_size: a.batch_size,
            ..train_config(a.data, None)
        }
    }
}

impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig {
            train:        train_config(a.data, Some(a.hyper)),
            host:         a.host,
            port:         a.port,
            context_root: a.context_root,
            retrain:      a.retrain,
        }
    }
}
