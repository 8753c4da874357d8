//! # Equimorph
//!
//! The `equimorph_lib` crate generates semantically-equivalent mutants of a source
//! program in order to stress-test static analyzers.  Given an input file, a mutation
//! run parses it into a syntax tree, selects candidate nodes with one of three
//! strategies (random sampling, explicit line targeting, or bug-report-guided
//! selection with data-flow back-tracing), tries every applicable rewrite transform
//! against every candidate with each attempt isolated in its own tree clone, and
//! writes each success to a provenance-stamped mutant file.
//!
//! The library separates node selection from rewrite application: strategies know
//! nothing about transforms, and transforms see candidates only through the
//! [`transform::Transform`] trait.  [`engine::MutationEngine`] ties the phases
//! together and tolerates partial failure, so one refused rewrite never aborts a
//! batch.

pub mod ast;
pub mod bug_report;
pub mod engine;
pub mod error;
pub mod index;
pub mod lexer;
pub mod mutant;
pub mod parser;
pub mod pretty_printer;
pub mod selection;
pub mod transform;
pub mod transforms;
pub mod writer;

pub use ast::{Edit, NodeKind, NodeTag, Position, SyntaxNode, SyntaxTree};
pub use bug_report::BugReport;
pub use engine::MutationEngine;
pub use error::EquimorphError;
pub use index::SyntaxIndex;
pub use mutant::{Mutant, MutationResult, NodeDescriptor, RunMetadata};
pub use parser::parse;
pub use pretty_printer::PrettyPrinter;
pub use selection::{Candidate, GuidedStrategy, RandomStrategy, SelectionStrategy, TargetStrategy};
pub use transform::{Transform, TransformRegistry};
pub use writer::MutantWriter;
