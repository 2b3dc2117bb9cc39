// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction; parses arguments with
// clap and delegates every piece of business logic to Layer 2.
//
// Three commands are supported:
//   1. `train`    — trains the chunker on annotated sentences
//   2. `coverage` — measures exact-match span coverage
//   3. `embed`    — prints span embeddings for one sentence

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, CoverageArgs, EmbedArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "aste-chunker",
    version = "0.1.0",
    about = "Train a token-split chunker for aspect/opinion span extraction, then measure span coverage."
)]
pub struct Cli {
    /// The subcommand to run (train, coverage, or embed)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Coverage(args) => Self::run_coverage(args),
            Commands::Embed(args)    => Self::run_embed(args),
        }
    }

    /// Handles the `train` subcommand.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on sentences in: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `coverage` subcommand.
    fn run_coverage(args: CoverageArgs) -> Result<()> {
        use crate::application::coverage_use_case::CoverageUseCase;

        let use_case = CoverageUseCase::new(
            args.checkpoint_dir.clone(),
            args.data_dir.clone(),
            args.threshold,
        )?;

        let coverage = use_case.evaluate()?;
        println!(
            "\nCoverage: {:.4} ({} of {} reference spans matched, {} spans extracted)",
            coverage.ratio,
            coverage.matched,
            coverage.reference_total,
            coverage.predicted_total,
        );
        Ok(())
    }

    /// Handles the `embed` subcommand.
    fn run_embed(args: EmbedArgs) -> Result<()> {
        use crate::application::embed_use_case::EmbedUseCase;

        let choice   = args.aggregator.parse()?;
        let use_case = EmbedUseCase::new(args.checkpoint_dir.clone())?;
        let rows     = use_case.embed(&args.text, choice)?;

        println!("\n{} span embeddings:", rows.len());
        for row in rows {
            let preview: Vec<String> = row
                .vector
                .iter()
                .take(4)
                .map(|v| format!("{v:+.4}"))
                .collect();
            println!(
                "  ({:>3}, {:>3})  dim={}  [{}, ...]",
                row.span.start,
                row.span.end,
                row.vector.len(),
                preview.join(", "),
            );
        }
        Ok(())
    }
}
