//! Bug-report-guided selection with data-flow back-tracing.
//!
//! Starting from the lines an analyzer flagged, the strategy widens the candidate set
//! in a fixed order: exact line matches, expansion of nodes marked by an earlier
//! transformation pass, hoisting of literal `if` conditions around a match, and a
//! back-trace that follows the values flowing into a flagged assignment or declaration.

use crate::ast::{NodeKind, SyntaxNode};
use crate::bug_report::BugReport;
use crate::error::EquimorphError;
use crate::index::SyntaxIndex;
use crate::selection::{Candidate, SelectionStrategy};
use std::collections::HashSet;

/// Strategy that turns an analyzer bug report into candidates.
pub struct GuidedStrategy;

impl GuidedStrategy {
    /// Select candidates for the lines flagged in `report`.  The result is
    /// deterministic for the same tree and report.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to draw candidates from.
    /// * `report` - The analyzer's bug report.
    pub fn select<'a>(
        &self,
        index: &SyntaxIndex<'a>,
        report: &BugReport,
    ) -> Result<Vec<Candidate>, EquimorphError> {
        report.validate()?;
        if !report.has_bugs || report.lines.is_empty() {
            return Err(EquimorphError::InvalidArgument(String::from(
                "guided selection requires a bug report with flagged lines",
            )));
        }

        let flagged: HashSet<i64> = report.lines.iter().copied().collect();
        let mut collected: Vec<&'a SyntaxNode> = Vec::new();

        for node in index.primary_nodes() {
            if flagged.contains(&(node.pos.line as i64)) {
                Self::push_unique(&mut collected, node);
            }
        }

        // Nodes marked by an earlier transformation pass widen the set even when their
        // own line was not flagged.
        for node in index.tree().root.preorder() {
            if !node.prior {
                continue;
            }
            match &node.kind {
                NodeKind::If { condition, .. } | NodeKind::While { condition, .. } => {
                    Self::push_unique(&mut collected, condition);
                }
                NodeKind::For {
                    condition: Some(condition),
                    ..
                } => {
                    Self::push_unique(&mut collected, condition);
                }
                NodeKind::FieldDecl {
                    initializer: Some(initializer),
                    ..
                } => {
                    Self::push_unique(&mut collected, initializer);
                }
                _ => {}
            }
        }

        if collected.is_empty() {
            return Ok(Vec::new());
        }

        // Hoist the literal test of an `if` that directly wraps a collected node.
        let mut hoisted: Vec<&'a SyntaxNode> = Vec::new();
        for node in &collected {
            if let Some(path) = index.tree().path_to(node.id) {
                for i in (0..path.len().saturating_sub(1)).rev() {
                    if matches!(path[i].kind, NodeKind::Block { .. }) {
                        if i > 0 {
                            if let NodeKind::If { condition, .. } = &path[i - 1].kind {
                                if condition.is_literal() {
                                    Self::push_unique(&mut hoisted, condition);
                                }
                            }
                        }
                        break;
                    }
                }
            }
        }
        for node in hoisted {
            Self::push_unique(&mut collected, node);
        }

        // Back-trace: flagged field declarations pull in every statement assigning to
        // the field; flagged local declarations and assignments seed a source-name set
        // that pulls in the statements feeding them within the same declaration body.
        let mut sources: HashSet<String> = HashSet::new();
        let mut field_assignments: Vec<&'a SyntaxNode> = Vec::new();
        for node in &collected {
            match &node.kind {
                NodeKind::FieldDecl { name, .. } => {
                    for statements in index.statements().values() {
                        for statement in statements {
                            if Self::assignment_target_name(statement) == Some(name.as_str()) {
                                Self::push_unique(&mut field_assignments, statement);
                            }
                        }
                    }
                }
                NodeKind::LocalDecl {
                    initializer: Some(initializer),
                    ..
                } => {
                    Self::collect_source_names(initializer, &mut sources, 0);
                }
                NodeKind::ExprStmt { expression } => {
                    if let NodeKind::Assign { value, .. } = &expression.kind {
                        Self::collect_source_names(value, &mut sources, 0);
                    }
                }
                NodeKind::Assign { value, .. } => {
                    Self::collect_source_names(value, &mut sources, 0);
                }
                _ => {}
            }
        }
        if !sources.is_empty() {
            if let Some(signature) = index.declaration_signature_of(collected[0].id) {
                if let Some(statements) = index.statements_for(&signature) {
                    for statement in statements {
                        match &statement.kind {
                            NodeKind::LocalDecl { name, .. } if sources.contains(name) => {
                                Self::push_unique(&mut collected, statement);
                            }
                            _ => {
                                if let Some(target) = Self::assignment_target_name(statement) {
                                    if sources.contains(target) {
                                        Self::push_unique(&mut collected, statement);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        // Type and initializer declarations are not rewrite targets.
        collected.retain(|node| {
            !node.is_type_declaration() && !matches!(node.kind, NodeKind::InitializerDecl { .. })
        });

        for statement in field_assignments {
            Self::push_unique(&mut collected, statement);
        }

        Ok(collected
            .into_iter()
            .map(|node| Candidate::new(index, node))
            .collect())
    }

    fn push_unique<'a>(collected: &mut Vec<&'a SyntaxNode>, node: &'a SyntaxNode) {
        if !collected.iter().any(|n| n.id == node.id) {
            collected.push(node);
        }
    }

    /// The simple name assigned to by `statement`, when it is an assignment statement.
    fn assignment_target_name(statement: &SyntaxNode) -> Option<&str> {
        let expression = match &statement.kind {
            NodeKind::ExprStmt { expression } => expression,
            _ => return None,
        };
        let target = match &expression.kind {
            NodeKind::Assign { target, .. } => target,
            _ => return None,
        };
        match &target.kind {
            NodeKind::Name { identifier } => Some(identifier),
            NodeKind::FieldAccess { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Collect the identifier names referenced in `expr`.  Call arguments are followed
    /// one level deep only.
    fn collect_source_names(expr: &SyntaxNode, out: &mut HashSet<String>, call_depth: u32) {
        match &expr.kind {
            NodeKind::Name { identifier } => {
                out.insert(identifier.clone());
            }
            NodeKind::FieldAccess { object, name } => {
                out.insert(name.clone());
                Self::collect_source_names(object, out, call_depth);
            }
            NodeKind::Call {
                receiver,
                arguments,
                ..
            } => {
                if call_depth == 0 {
                    for argument in arguments {
                        Self::collect_source_names(argument, out, call_depth + 1);
                    }
                }
                if let Some(receiver) = receiver {
                    Self::collect_source_names(receiver, out, call_depth);
                }
            }
            NodeKind::Binary { left, right, .. } => {
                Self::collect_source_names(left, out, call_depth);
                Self::collect_source_names(right, out, call_depth);
            }
            NodeKind::Unary { operand, .. } => {
                Self::collect_source_names(operand, out, call_depth);
            }
            NodeKind::Assign { target, value, .. } => {
                Self::collect_source_names(target, out, call_depth);
                Self::collect_source_names(value, out, call_depth);
            }
            _ => {}
        }
    }
}

impl SelectionStrategy for GuidedStrategy {
    fn name(&self) -> &'static str {
        "guided"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeTag;
    use crate::parser::parse;

    #[test]
    fn test_invalid_report_is_rejected() {
        let tree = parse("class C { int a = 1; }").unwrap();
        let index = SyntaxIndex::build(&tree);
        let report = BugReport {
            has_bugs: false,
            lines: vec![],
        };
        assert!(GuidedStrategy.select(&index, &report).is_err());
    }

    #[test]
    fn test_exact_line_match_is_selected() {
        let source = "class C {\n\
            void m() {\n\
                int x = 1;\n\
                x = x + 1;\n\
            }\n\
        }\n";
        let tree = parse(source).unwrap();
        let index = SyntaxIndex::build(&tree);
        let report = BugReport::new(true, vec![4]).unwrap();
        let candidates = GuidedStrategy.select(&index, &report).unwrap();
        assert!(candidates
            .iter()
            .any(|c| c.node.pos.line == 4 && c.node.tag() == NodeTag::ExprStmt));
    }

    #[test]
    fn test_no_match_returns_empty_not_error() {
        let source = "class C {\n    void m() {\n        int x = 1;\n    }\n}\n";
        let tree = parse(source).unwrap();
        let index = SyntaxIndex::build(&tree);
        let report = BugReport::new(true, vec![200]).unwrap();
        assert!(GuidedStrategy.select(&index, &report).unwrap().is_empty());
    }

    #[test]
    fn test_back_trace_pulls_in_feeding_statements() {
        let source = "class C {\n\
            void m() {\n\
                int a = 1;\n\
                int b = a + 2;\n\
                int c = b;\n\
            }\n\
        }\n";
        let tree = parse(source).unwrap();
        let index = SyntaxIndex::build(&tree);
        // Flag the declaration of c; its source b should pull in line 4.
        let report = BugReport::new(true, vec![5]).unwrap();
        let candidates = GuidedStrategy.select(&index, &report).unwrap();
        let lines: Vec<u32> = candidates.iter().map(|c| c.node.pos.line).collect();
        assert!(lines.contains(&5));
        assert!(lines.contains(&4));
        assert!(!lines.contains(&3));
    }

    #[test]
    fn test_field_declaration_pulls_in_assignments() {
        let source = "class C {\n\
            int total = 0;\n\
            void m() {\n\
                total = total + 1;\n\
            }\n\
            void n() {\n\
                total = 0;\n\
            }\n\
        }\n";
        let tree = parse(source).unwrap();
        let index = SyntaxIndex::build(&tree);
        let report = BugReport::new(true, vec![2]).unwrap();
        let candidates = GuidedStrategy.select(&index, &report).unwrap();
        let lines: Vec<u32> = candidates.iter().map(|c| c.node.pos.line).collect();
        assert!(lines.contains(&4));
        assert!(lines.contains(&7));
    }

    #[test]
    fn test_literal_condition_hoist() {
        let source = "class C {\n\
            void m() {\n\
                if (true) {\n\
                    log(1);\n\
                }\n\
            }\n\
        }\n";
        let tree = parse(source).unwrap();
        let index = SyntaxIndex::build(&tree);
        let report = BugReport::new(true, vec![4]).unwrap();
        let candidates = GuidedStrategy.select(&index, &report).unwrap();
        assert!(candidates
            .iter()
            .any(|c| c.node.tag() == NodeTag::BoolLiteral));
    }

    #[test]
    fn test_prior_marked_condition_is_expanded() {
        let source = "class C {\n\
            void m() {\n\
                while (go()) {\n\
                    step();\n\
                }\n\
            }\n\
        }\n";
        let mut tree = parse(source).unwrap();
        for node in tree.root.preorder() {
            assert!(!node.prior);
        }
        let while_id = tree
            .root
            .preorder()
            .into_iter()
            .find(|n| n.tag() == NodeTag::While)
            .unwrap()
            .id;
        tree.root
            .find_mut(while_id)
            .unwrap()
            .mark_prior();

        let index = SyntaxIndex::build(&tree);
        let report = BugReport::new(true, vec![4]).unwrap();
        let candidates = GuidedStrategy.select(&index, &report).unwrap();
        assert!(candidates.iter().any(|c| c.node.tag() == NodeTag::Call
            && matches!(&c.node.kind, NodeKind::Call { name, .. } if name == "go")));
    }

    #[test]
    fn test_type_declarations_are_filtered_out() {
        let source = "class C {\n    void m() {\n        int x = 1;\n    }\n}\n";
        let tree = parse(source).unwrap();
        let index = SyntaxIndex::build(&tree);
        let report = BugReport::new(true, vec![1, 3]).unwrap();
        let candidates = GuidedStrategy.select(&index, &report).unwrap();
        assert!(!candidates.iter().any(|c| c.node.is_type_declaration()));
        assert!(candidates
            .iter()
            .any(|c| c.node.tag() == NodeTag::LocalDecl));
    }
}
