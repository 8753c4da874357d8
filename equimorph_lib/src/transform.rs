//! The `transform` module contains the trait implemented by every rewrite transform
//! and the registry that the mutation engine resolves transform names against.

use crate::ast::{SyntaxNode, SyntaxTree};
use crate::index::SyntaxIndex;

/// Behavior of a single rewrite transform.
///
/// A transform is consulted in two phases.  `check` inspects a candidate node and
/// returns the nodes the transform can concretely rewrite; the result may be empty, may
/// be the candidate itself, or may expand to several of the candidate's descendants.
/// `apply` then performs the rewrite on a disposable tree clone and reports success.
pub trait Transform {
    /// The transform name used in mutant filenames and provenance headers.
    fn name(&self) -> &'static str;

    /// One-line description for the transform listing.
    fn description(&self) -> &'static str;

    /// Return the nodes under `node` this transform can rewrite.
    ///
    /// # Arguments
    ///
    /// * `index` - The index over the tree `node` belongs to.
    /// * `node` - The candidate node.
    fn check(&self, index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode>;

    /// Rewrite `target` inside `tree`, returning false when the rewrite does not apply
    /// after all.  `tree` is a disposable clone; a failed apply may leave it in any
    /// state.
    ///
    /// # Arguments
    ///
    /// * `target` - The node to rewrite, correlated into `tree`.
    /// * `tree` - The tree clone to edit in place.
    /// * `sibling` - The statement following the source context, when one exists.
    /// * `source` - The originally selected candidate, correlated into `tree`.
    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        sibling: Option<&SyntaxNode>,
        source: &SyntaxNode,
    ) -> bool;
}

/// The set of registered transforms, enumerable in registration order and queryable by
/// name.
pub struct TransformRegistry {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformRegistry {
    /// Create an empty registry.
    pub fn new() -> TransformRegistry {
        TransformRegistry {
            transforms: Vec::new(),
        }
    }

    /// Create a registry holding every built-in transform.
    pub fn with_builtins() -> TransformRegistry {
        let mut registry = TransformRegistry::new();
        for transform in crate::transforms::builtin_transforms() {
            registry.register(transform);
        }
        registry
    }

    /// Add `transform` to the registry.
    pub fn register(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Look up a transform by name.
    pub fn get(&self, name: &str) -> Option<&dyn Transform> {
        self.transforms
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// All registered transforms, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Transform> {
        self.transforms.iter().map(|t| t.as_ref())
    }

    /// The registered transform names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Default for TransformRegistry {
    fn default() -> TransformRegistry {
        TransformRegistry::with_builtins()
    }
}
