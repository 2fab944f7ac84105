//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module parses the
//! CLI, sets up logging and runs the requested command.

use clap::Parser;
use log::info;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

use crate::cli::{Cli, Command, FitArgs, ShowArgs};
use crate::config::AppConfig;
use crate::data::{SyntheticSpec, imaginary_frequencies, random_tree};
use crate::error::AppError;
use crate::io::{read_snapshot_json, write_snapshot_json};
use crate::models::relative_error;
use crate::report::{
    compare_params, format_comparison, format_diagnostics, format_run_summary, format_tree, two_stage_labels,
};
use crate::tree::CompartmentTree;

/// Entry point for the `ctfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    init_logging(&config)?;

    match cli.command {
        Command::Fit(args) => handle_fit(args, &config),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(config: &AppConfig) -> Result<(), AppError> {
    CombinedLogger::init(vec![TermLogger::new(
        config.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )])
    .map_err(|e| AppError::new(2, format!("Failed to initialise logging: {e}")))
}

fn handle_fit(args: FitArgs, config: &AppConfig) -> Result<(), AppError> {
    let seed = args.seed.unwrap_or(config.seed);
    let spec = SyntheticSpec {
        n_nodes: args.nodes,
        chain_prob: args.chain_prob,
        ..SyntheticSpec::default()
    };
    let reference = random_tree(&spec, seed)?;
    let freqs = imaginary_frequencies(args.min_freq, args.max_freq, args.freqs)?;
    let zf_mat = reference.impedance_matrices(&freqs)?;
    info!("reference tree: {} nodes, seed {seed}, {} frequencies", reference.len(), freqs.len());

    let mut fitted = reference.with_same_topology();
    let diagnostics = fitted.compute_gc(&freqs, &zf_mat, None)?;
    let err = relative_error(&fitted.impedance_matrices(&freqs)?, &zf_mat)?;
    println!(
        "{}",
        format_run_summary(&reference, &fitted, &two_stage_labels(&diagnostics), err)?
    );

    if args.joint {
        let mut joint = reference.with_same_topology();
        let diag = joint.compute_gc_joint(&freqs, &zf_mat)?;
        let err = relative_error(&joint.impedance_matrices(&freqs)?, &zf_mat)?;
        println!("Experimental joint fit:");
        print!("{}", format_diagnostics("joint", &diag));
        println!("{}", format_comparison(&compare_params(&reference, &joint)?));
        println!("Impedance rel. error    : {err:.3e}");
    }

    if let Some(path) = &args.export {
        write_snapshot_json(path, &fitted.snapshot())?;
        info!("wrote fitted parameters to {}", path.display());
    }
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let snapshot = read_snapshot_json(&args.params)?;
    let tree = CompartmentTree::from_snapshot(&snapshot)?;
    println!("{}", format_tree(&tree));
    Ok(())
}
