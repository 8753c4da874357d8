//! The `selection` module contains the candidate-selection strategies.  A strategy
//! chooses which syntax nodes are eligible for rewriting; it knows nothing about which
//! transforms exist.  Selection and transform application are strictly separate phases
//! so that the mutation engine can try many transforms per candidate.

pub mod guided;
pub mod random;
pub mod target;

pub use guided::GuidedStrategy;
pub use random::RandomStrategy;
pub use random::DEFAULT_CANDIDATE_COUNT;
pub use target::TargetStrategy;

use crate::ast::SyntaxNode;
use crate::index::SyntaxIndex;

/// A node chosen by a strategy, together with the context the mutation engine needs to
/// re-locate it in a tree clone.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The selected node, cloned out of the indexed tree.
    pub node: SyntaxNode,
    /// The nearest enclosing non-block statement, when one exists.
    pub enclosing: Option<SyntaxNode>,
}

impl Candidate {
    /// Create a candidate for `node`, capturing its enclosing statement from `index`.
    pub fn new(index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Candidate {
        Candidate {
            node: node.clone(),
            enclosing: index.enclosing_statement(node.id).cloned(),
        }
    }
}

/// Behavior shared by all selection strategies.  Each strategy additionally provides
/// its own `select` function with strategy-specific parameters.
pub trait SelectionStrategy {
    /// The strategy name used in log output and result metadata.
    fn name(&self) -> &'static str;
}
