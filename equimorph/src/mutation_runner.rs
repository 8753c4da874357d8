//! The `mutation_runner` module turns the `mutate` subcommand's arguments into a
//! mutation run and reports the outcome on stdout.

use crate::MutateCLArgs;
use equimorph_lib::bug_report::BugReport;
use equimorph_lib::engine::MutationEngine;
use equimorph_lib::error::EquimorphError;
use equimorph_lib::transform::TransformRegistry;
use std::path::{Path, PathBuf};

/// Run one mutation request.
///
/// # Arguments
///
/// * `args` - The [`MutateCLArgs`] object.
pub fn generate_mutants(args: MutateCLArgs) -> Result<(), EquimorphError> {
    let registry = TransformRegistry::with_builtins();
    let engine = MutationEngine::new(&registry);

    let input = PathBuf::from(&args.file_name);
    let output_directory = PathBuf::from(&args.output_directory);
    let seed = if args.rng_seed < 0 {
        None
    } else {
        Some(args.rng_seed as u64)
    };
    let transform = args.transform.as_deref();

    log::info!(
        "Mutating {} into {}",
        args.file_name,
        args.output_directory
    );

    let result = if let Some(report_path) = &args.bug_report {
        let report = BugReport::from_file(Path::new(report_path))?;
        engine.run_guided(&input, &output_directory, &report, transform)?
    } else if !args.lines.is_empty() {
        engine.run_target(&input, &output_directory, &args.lines, transform)?
    } else {
        let count = args.count.unwrap_or(0);
        engine.run_random(&input, &output_directory, count, seed, transform)?
    };

    for mutant in &result.mutants {
        if let Some(path) = &mutant.output_path {
            println!(
                "{} used to create mutant written to {}",
                mutant.transform,
                path.display()
            );
        }
    }

    if result.success {
        println!(
            "Generated {} mutant(s) from {} candidate(s) in {} attempt(s)",
            result.mutants.len(),
            result.metadata.candidate_count,
            result.metadata.attempt_count
        );
    } else {
        for message in &result.error_messages {
            println!("{}", message);
        }
    }

    Ok(())
}
