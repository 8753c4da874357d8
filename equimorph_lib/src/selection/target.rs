//! Explicit line-number targeting.

use crate::error::EquimorphError;
use crate::index::SyntaxIndex;
use crate::selection::{Candidate, SelectionStrategy};
use std::collections::HashSet;

/// Strategy that selects every node starting on one of the caller's target lines.
pub struct TargetStrategy;

impl TargetStrategy {
    /// Select every node whose starting line is in `target_lines`, preserving the
    /// index's node ordering.  Lines with no matching node are silently ignored; an
    /// empty line list yields an empty candidate list.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to draw candidates from.
    /// * `target_lines` - The 1-based lines to select nodes from.
    pub fn select(
        &self,
        index: &SyntaxIndex<'_>,
        target_lines: &[i64],
    ) -> Result<Vec<Candidate>, EquimorphError> {
        for line in target_lines {
            if *line <= 0 {
                return Err(EquimorphError::InvalidArgument(format!(
                    "target lines must be positive, found {}",
                    line
                )));
            }
        }

        let wanted: HashSet<i64> = target_lines.iter().copied().collect();
        Ok(index
            .primary_nodes()
            .iter()
            .filter(|node| wanted.contains(&(node.pos.line as i64)))
            .map(|node| Candidate::new(index, node))
            .collect())
    }
}

impl SelectionStrategy for TargetStrategy {
    fn name(&self) -> &'static str {
        "target"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    static SAMPLE: &str = "class C {\n\
        int a = 1;\n\
        void m() {\n\
            a = a + 1; b();\n\
        }\n\
    }\n";

    #[test]
    fn test_select_returns_all_nodes_on_a_line() {
        let tree = parse(SAMPLE).unwrap();
        let index = SyntaxIndex::build(&tree);
        let candidates = TargetStrategy.select(&index, &[4]).unwrap();
        assert_eq!(candidates.len(), 2);
        for candidate in &candidates {
            assert_eq!(candidate.node.pos.line, 4);
        }
    }

    #[test]
    fn test_select_ignores_lines_with_no_nodes() {
        let tree = parse(SAMPLE).unwrap();
        let index = SyntaxIndex::build(&tree);
        let candidates = TargetStrategy.select(&index, &[2, 500]).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].node.pos.line, 2);
    }

    #[test]
    fn test_empty_line_list_is_valid() {
        let tree = parse(SAMPLE).unwrap();
        let index = SyntaxIndex::build(&tree);
        assert!(TargetStrategy.select(&index, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_non_positive_lines_are_rejected() {
        let tree = parse(SAMPLE).unwrap();
        let index = SyntaxIndex::build(&tree);
        assert!(TargetStrategy.select(&index, &[3, 0]).is_err());
        assert!(TargetStrategy.select(&index, &[-2]).is_err());
    }
}
