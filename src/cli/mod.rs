//! Command-line parsing for the compartment tree fitter.
//!
//! Argument parsing stays separate from the fitting code; `app` does the dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ctfit", version, about = "Compartment tree RC parameter fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a fresh tree to the exact impedances of a random reference tree and compare.
    Fit(FitArgs),
    /// Print a saved parameter snapshot and its conductance matrix.
    Show(ShowArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Number of compartments in the reference tree.
    #[arg(short = 'n', long, default_value_t = 6)]
    pub nodes: usize,

    /// Random seed for the reference tree (defaults to CTFIT_SEED or 42).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability that a node extends the most recent branch.
    #[arg(long, default_value_t = 0.6)]
    pub chain_prob: f64,

    /// Number of non-zero imaginary frequencies.
    #[arg(long, default_value_t = 8)]
    pub freqs: usize,

    /// Smallest angular frequency (log-spaced grid).
    #[arg(long, default_value_t = 1e-3)]
    pub min_freq: f64,

    /// Largest angular frequency (log-spaced grid).
    #[arg(long, default_value_t = 10.0)]
    pub max_freq: f64,

    /// Also run the experimental single-solve fit and report it.
    #[arg(long)]
    pub joint: bool,

    /// Write the fitted parameters to a JSON snapshot.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Snapshot JSON file produced by `ctfit fit --export`.
    #[arg(long, value_name = "JSON")]
    pub params: PathBuf,
}
