//! The `writer` module contains [`MutantWriter`], which gives every mutant a unique
//! file name and a provenance header.

use crate::error::EquimorphError;
use crate::mutant::Mutant;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Writes mutants into one output directory, numbering them with a sequence counter
/// shared across the whole run.
pub struct MutantWriter {
    output_directory: PathBuf,
    sequence: AtomicU64,
}

impl MutantWriter {
    /// Create a writer for `output_directory`.  The directory is created on first
    /// write, not here.
    pub fn new(output_directory: &Path) -> MutantWriter {
        MutantWriter {
            output_directory: PathBuf::from(output_directory),
            sequence: AtomicU64::new(1),
        }
    }

    /// Write `mutant` to a collision-free file, stamping the provenance header as the
    /// first line and recording the output path on the mutant.
    ///
    /// # Arguments
    ///
    /// * `mutant` - The mutant to write.
    /// * `input_path` - The original input file, named in the provenance header.
    pub fn write(&self, mutant: &mut Mutant, input_path: &Path) -> Result<PathBuf, EquimorphError> {
        fs::create_dir_all(&self.output_directory)?;

        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("input"));
        let extension = input_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        let output_path = loop {
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
            let file_name = match &extension {
                Some(extension) => format!(
                    "{}_mutant_{}_{}.{}",
                    stem, mutant.transform, sequence, extension
                ),
                None => format!("{}_mutant_{}_{}", stem, mutant.transform, sequence),
            };
            let candidate = self.output_directory.join(file_name);
            if !candidate.exists() {
                break candidate;
            }
        };

        let header_path = input_path.to_string_lossy().replace('\\', "\\\\");
        let contents = format!(
            "// mutant by transform {} from {}\n{}",
            mutant.transform, header_path, mutant.text
        );
        fs::write(&output_path, contents)?;

        mutant.output_path = Some(output_path.clone());
        Ok(output_path)
    }
}
