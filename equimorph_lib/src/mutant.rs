//! The `mutant` module contains the result types produced by a mutation run.

use crate::ast::SyntaxNode;
use serde::Serialize;
use std::path::PathBuf;

/// Compact description of the node a transform rewrote, kept for provenance and
/// diagnostics after the tree clone is gone.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDescriptor {
    /// The node kind name.
    pub kind: String,
    /// 1-based start line.
    pub line: u32,
    /// 1-based start column.
    pub column: u32,
}

impl From<&SyntaxNode> for NodeDescriptor {
    fn from(node: &SyntaxNode) -> NodeDescriptor {
        NodeDescriptor {
            kind: node.tag().to_string(),
            line: node.pos.line,
            column: node.pos.column,
        }
    }
}

/// One successful rewrite: the transform that produced it, the node it rewrote, the
/// rewritten source text, and where the writer placed it.
#[derive(Debug, Clone, Serialize)]
pub struct Mutant {
    /// Name of the transform that produced this mutant.
    pub transform: String,

    /// The rewritten node.
    pub target: NodeDescriptor,

    /// The full rewritten source text, without the provenance header.
    #[serde(skip)]
    pub text: String,

    /// Where the writer placed the mutant, once written.
    pub output_path: Option<PathBuf>,
}

impl Mutant {
    pub fn new(transform: &str, target: &SyntaxNode, text: String) -> Mutant {
        Mutant {
            transform: String::from(transform),
            target: NodeDescriptor::from(target),
            text,
            output_path: None,
        }
    }
}

/// Counters describing how much work a run did, kept so a zero-mutant outcome can be
/// diagnosed without re-running.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetadata {
    /// Number of candidates the strategy selected.
    pub candidate_count: usize,
    /// Number of (candidate, transform) apply attempts made.
    pub attempt_count: usize,
}

/// Aggregate outcome of one mutation run.
#[derive(Debug, Serialize)]
pub struct MutationResult {
    /// True when at least one mutant was produced.
    pub success: bool,
    /// The mutants produced, in candidate-then-transform order.
    pub mutants: Vec<Mutant>,
    /// Per-attempt failure messages, plus the overall zero-mutant message when no
    /// mutant was produced.
    pub error_messages: Vec<String>,
    pub metadata: RunMetadata,
}
