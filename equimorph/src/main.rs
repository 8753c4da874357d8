//! The main module contains the code to process the command line for the equimorph
//! program and run the mutation engine.

mod mutation_runner;
mod pretty_printing;
mod transforms_info;

use crate::mutation_runner::generate_mutants;
use crate::pretty_printing::pretty_print_files;
use crate::transforms_info::display_transforms_info;
use chrono::Local;
use clap::{ArgGroup, Args, Parser, Subcommand};
use env_logger::TimestampPrecision;
use std::io::Write;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "Generator of semantically-equivalent program mutants for stress-testing static analyzers.")]
#[command(propagate_version = true)]
struct EquimorphCommand {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    Transforms(TransformsCLArgs),
    Mutate(MutateCLArgs),
    PrettyPrint(PrettyPrintCLArgs),
}

/// Arguments for listing details about the rewrite transforms
#[derive(Args, Debug, Clone)]
#[command(group(
ArgGroup::new("info")
.required(true)
.args(["list", "describe"]),
))]
pub struct TransformsCLArgs {
    /// List the available transforms
    #[arg(short, long)]
    pub list: bool,

    /// Describe the available transforms
    #[arg(short, long)]
    pub describe: bool,
}

/// Arguments for generating mutants from a source file.
#[derive(Args, Debug, Clone)]
#[command(group(
ArgGroup::new("strategy")
.required(true)
.args(["count", "lines", "bug_report"]),
))]
pub struct MutateCLArgs {
    /// Directory to store mutants
    #[arg(short, long, default_value = "out")]
    pub output_directory: String,

    /// Input file to mutate
    #[arg(short, long, required = true)]
    pub file_name: String,

    /// Random number generator seed; a negative value seeds from the clock.
    #[arg(long, default_value_t = -1)]
    pub rng_seed: i64,

    /// Number of randomly selected candidate nodes (random strategy)
    #[arg(long)]
    pub count: Option<i64>,

    /// Source lines to mutate (target strategy)
    #[arg(long)]
    pub lines: Vec<i64>,

    /// Analyzer bug report in JSON form (guided strategy)
    #[arg(long)]
    pub bug_report: Option<String>,

    /// Only use the named transform instead of every registered transform.
    #[arg(long)]
    pub transform: Option<String>,
}

/// Arguments for pretty-printing source input.
#[derive(Args, Debug, Clone)]
pub struct PrettyPrintCLArgs {
    /// Directory to store pretty-printed copy of source
    #[arg(short, long, default_value = "out")]
    pub output_directory: String,

    /// Input file(s) to pretty-print
    #[arg(short, long, required = true)]
    pub file_names: Vec<String>,

    /// Write output to stdout instead of the directory given in `output_directory`.
    #[arg(long)]
    pub stdout: bool,
}

fn main() {
    let _ = env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .format_timestamp(Some(TimestampPrecision::Seconds))
        .try_init();

    let equimorph_command = EquimorphCommand::parse();
    match &equimorph_command.command {
        Commands::Transforms(transforms_args) => {
            display_transforms_info(transforms_args.clone());
        }
        Commands::Mutate(mutate_args) => {
            if let Err(e) = generate_mutants(mutate_args.clone()) {
                println!("Unable to generate mutations: {}", e);
            }
        }
        Commands::PrettyPrint(pretty_print_args) => {
            pretty_print_files(pretty_print_args.clone());
        }
    }
}
