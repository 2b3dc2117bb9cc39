// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands — `train`, `coverage`, `embed` —
// and all their configurable flags. clap's derive macros
// generate the help text, error messages, and type conversions.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::decoder::DEFAULT_SPLIT_THRESHOLD;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the span chunker on annotated .jsonl sentences
    Train(TrainArgs),

    /// Measure exact-match span coverage with a trained checkpoint
    Coverage(CoverageArgs),

    /// Print span embeddings for one sentence
    Embed(EmbedArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing annotated .jsonl sentence files
    #[arg(long, default_value = "data/sentences")]
    pub data_dir: String,

    /// Directory to save checkpoints, tokenizer, and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Maximum number of tokens per input sequence
    /// Format: [CLS] sentence tokens [SEP] + padding
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 2e-4)]
    pub lr: f64,

    /// Hidden dimension of the transformer (d_model in the paper)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads; d_model must be divisible by it
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Total number of unique tokens the vocabulary may hold
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Stop after this many epochs without a validation F1
    /// improvement (omit to disable early stopping)
    #[arg(long)]
    pub patience: Option<usize>,

    /// Shuffle and split seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            max_seq_len:    a.max_seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
            patience:       a.patience,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `coverage` command
#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// Directory with annotated .jsonl files to evaluate against
    #[arg(long, default_value = "data/sentences")]
    pub data_dir: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Split-probability threshold for the decoder
    #[arg(long, default_value_t = DEFAULT_SPLIT_THRESHOLD)]
    pub threshold: f32,
}

/// All arguments for the `embed` command
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// The sentence to embed
    #[arg(long)]
    pub text: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Aggregation strategy: 'mean' or 'rnn'
    #[arg(long, default_value = "mean")]
    pub aggregator: String,
}
