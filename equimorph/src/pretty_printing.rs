//! The `pretty_printing` module provides services for pretty-printing input source
//! using the tool's canonical format.  Use these services to change the input file into
//! a form that you can easily compare with the generated mutants using a diff tool.

use crate::PrettyPrintCLArgs;
use equimorph_lib::error::EquimorphError;
use equimorph_lib::parser::parse;
use equimorph_lib::pretty_printer::PrettyPrinter;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Iterate through the files in the args.file_names vector and pretty-print each file.
///
/// # Arguments
///
/// * `args` - The [`PrettyPrintCLArgs`] object.
pub fn pretty_print_files(args: PrettyPrintCLArgs) {
    for file_name in &args.file_names {
        if args.stdout {
            let mut stdout = std::io::stdout();
            match pretty_print_file_to_stream(file_name, &mut stdout) {
                Ok(_) => continue,
                Err(e) => println!("Unable to pretty-print {}: {}", file_name, e),
            }
        } else {
            let original_file = PathBuf::from(file_name);
            let original_file_str = original_file.file_name().unwrap_or_default();
            match pretty_print_file(file_name, &args.output_directory) {
                Ok(path) => log::info!(
                    "Pretty-printing original file {:?} to {}",
                    original_file_str,
                    path.display()
                ),
                Err(e) => println!("Unable to pretty-print {:?}: {}", original_file_str, e),
            }
        }
    }
}

/// Pretty-print an individual file into `output_directory`.
///
/// # Arguments
///
/// * `file_name` - The path to the file to pretty-print in the file system.
/// * `output_directory` - The path to the location to save the pretty-printed file.
pub fn pretty_print_file(
    file_name: &str,
    output_directory: &str,
) -> Result<PathBuf, EquimorphError> {
    let text = canonical_text(file_name)?;

    let out_dir = PathBuf::from(output_directory);
    fs::create_dir_all(&out_dir)?;

    let base_file_name = Path::new(file_name)
        .file_name()
        .map(|n| PathBuf::from(n))
        .unwrap_or_else(|| PathBuf::from("input"));
    let out_path = out_dir.join(base_file_name);
    fs::write(&out_path, text)?;
    Ok(out_path)
}

/// Pretty-print an individual file to `stream`.
pub fn pretty_print_file_to_stream<W: Write>(
    file_name: &str,
    stream: &mut W,
) -> Result<(), EquimorphError> {
    let text = canonical_text(file_name)?;
    stream.write_all(text.as_bytes())?;
    Ok(())
}

fn canonical_text(file_name: &str) -> Result<String, EquimorphError> {
    let source = fs::read_to_string(file_name)?;
    let tree = parse(&source)?;
    Ok(PrettyPrinter::new(4).print_tree(&tree))
}
