//! The `transforms` module contains the built-in rewrite transforms.  Every transform
//! produces a mutant that is behaviorally equivalent to the input by construction: the
//! rewrites wrap, pad, or reorder code without changing what it computes.
//!
//! Constructed nodes carry the synthetic id [`SYNTHETIC_NODE_ID`] and are marked as
//! prior rewrite sites so a later guided pass over the same tree can widen its
//! selection around them.

use crate::ast::{Edit, NodeKind, NodeTag, Position, SyntaxNode, SyntaxTree};
use crate::index::SyntaxIndex;
use crate::transform::Transform;

/// Id assigned to nodes constructed by a transform rather than by the parser.
pub const SYNTHETIC_NODE_ID: u64 = 9_999_999;

/// Every built-in transform, in registration order.
pub fn builtin_transforms() -> Vec<Box<dyn Transform>> {
    vec![
        Box::new(IfTrueWrap {}),
        Box::new(DoubleNegation {}),
        Box::new(TrueConjunction {}),
        Box::new(AddZero {}),
        Box::new(MulOne {}),
        Box::new(DeadStore {}),
        Box::new(SelfAssign {}),
        Box::new(FlipComparison {}),
    ]
}

fn synthetic(kind: NodeKind, pos: Position) -> SyntaxNode {
    let mut node = SyntaxNode::new(SYNTHETIC_NODE_ID, pos, 0, kind);
    node.mark_prior();
    node
}

fn bool_literal(value: bool, pos: Position) -> SyntaxNode {
    synthetic(NodeKind::BoolLiteral { value }, pos)
}

fn int_literal(value: i64, pos: Position) -> SyntaxNode {
    synthetic(
        NodeKind::IntLiteral {
            value,
            text: value.to_string(),
        },
        pos,
    )
}

fn name(identifier: &str, pos: Position) -> SyntaxNode {
    synthetic(
        NodeKind::Name {
            identifier: String::from(identifier),
        },
        pos,
    )
}

/// The condition expression of a conditional or loop node.
fn condition_of(node: &SyntaxNode) -> Option<&SyntaxNode> {
    match &node.kind {
        NodeKind::If { condition, .. } | NodeKind::While { condition, .. } => Some(condition),
        NodeKind::For {
            condition: Some(condition),
            ..
        } => Some(condition),
        _ => None,
    }
}

/// True when `node` is itself the condition expression of its parent.
fn is_condition_node(index: &SyntaxIndex<'_>, node: &SyntaxNode) -> bool {
    if let Some(path) = index.tree().path_to(node.id) {
        if path.len() >= 2 {
            if let Some(condition) = condition_of(path[path.len() - 2]) {
                return condition.id == node.id;
            }
        }
    }
    false
}

/// The condition targets under a candidate: the candidate's own condition when it is a
/// conditional or loop, or the candidate itself when it is a condition expression.
fn condition_targets(index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
    if let Some(condition) = condition_of(node) {
        return vec![condition.clone()];
    }
    if is_condition_node(index, node) {
        return vec![node.clone()];
    }
    Vec::new()
}

/// Wraps a statement in `if (true) { ... }`.
pub struct IfTrueWrap {}

impl Transform for IfTrueWrap {
    fn name(&self) -> &'static str {
        "if_true_wrap"
    }

    fn description(&self) -> &'static str {
        "Wraps a statement in an if statement whose condition is the literal true."
    }

    fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        // Wrapping a declaration would move the declared name into a narrower scope.
        if node.is_statement()
            && node.tag() != NodeTag::Block
            && node.tag() != NodeTag::LocalDecl
        {
            vec![node.clone()]
        } else {
            Vec::new()
        }
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        let pos = target.pos;
        let block = synthetic(
            NodeKind::Block {
                statements: vec![target.clone()],
            },
            pos,
        );
        let wrapped = synthetic(
            NodeKind::If {
                condition: Box::new(bool_literal(true, pos)),
                then_branch: Box::new(block),
                else_branch: None,
            },
            pos,
        );
        tree.apply_edit(Edit::Replace {
            id: target.id,
            node: wrapped,
        })
        .is_ok()
    }
}

/// Replaces a condition `c` with `!(!c)`.
pub struct DoubleNegation {}

impl Transform for DoubleNegation {
    fn name(&self) -> &'static str {
        "double_negation"
    }

    fn description(&self) -> &'static str {
        "Replaces the condition of an if or loop with its double negation."
    }

    fn check(&self, index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        condition_targets(index, node)
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        let pos = target.pos;
        let inner = synthetic(
            NodeKind::Unary {
                operator: String::from("!"),
                operand: Box::new(target.clone()),
                prefix: true,
            },
            pos,
        );
        let outer = synthetic(
            NodeKind::Unary {
                operator: String::from("!"),
                operand: Box::new(inner),
                prefix: true,
            },
            pos,
        );
        tree.apply_edit(Edit::Replace {
            id: target.id,
            node: outer,
        })
        .is_ok()
    }
}

/// Replaces a condition `c` with `true && c`.
pub struct TrueConjunction {}

impl Transform for TrueConjunction {
    fn name(&self) -> &'static str {
        "true_conjunction"
    }

    fn description(&self) -> &'static str {
        "Conjoins the literal true onto the condition of an if or loop."
    }

    fn check(&self, index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        condition_targets(index, node)
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        let pos = target.pos;
        let conjoined = synthetic(
            NodeKind::Binary {
                operator: String::from("&&"),
                left: Box::new(bool_literal(true, pos)),
                right: Box::new(target.clone()),
            },
            pos,
        );
        tree.apply_edit(Edit::Replace {
            id: target.id,
            node: conjoined,
        })
        .is_ok()
    }
}

/// Replaces an integer literal `n` with `n + 0`.
pub struct AddZero {}

impl Transform for AddZero {
    fn name(&self) -> &'static str {
        "add_zero"
    }

    fn description(&self) -> &'static str {
        "Replaces an integer literal with the literal plus zero."
    }

    fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        int_literal_targets(node)
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        replace_with_binary(tree, target, "+", 0)
    }
}

/// Replaces an integer literal `n` with `n * 1`.
pub struct MulOne {}

impl Transform for MulOne {
    fn name(&self) -> &'static str {
        "mul_one"
    }

    fn description(&self) -> &'static str {
        "Replaces an integer literal with the literal times one."
    }

    fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        int_literal_targets(node)
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        replace_with_binary(tree, target, "*", 1)
    }
}

fn int_literal_targets(node: &SyntaxNode) -> Vec<SyntaxNode> {
    if node.tag() == NodeTag::IntLiteral {
        return vec![node.clone()];
    }
    node.preorder()
        .into_iter()
        .filter(|n| n.tag() == NodeTag::IntLiteral)
        .cloned()
        .collect()
}

fn replace_with_binary(
    tree: &mut SyntaxTree,
    target: &SyntaxNode,
    operator: &str,
    right: i64,
) -> bool {
    let pos = target.pos;
    let combined = synthetic(
        NodeKind::Binary {
            operator: String::from(operator),
            left: Box::new(target.clone()),
            right: Box::new(int_literal(right, pos)),
        },
        pos,
    );
    tree.apply_edit(Edit::Replace {
        id: target.id,
        node: combined,
    })
    .is_ok()
}

/// Inserts an unused local declaration before a statement.
pub struct DeadStore {}

impl Transform for DeadStore {
    fn name(&self) -> &'static str {
        "dead_store"
    }

    fn description(&self) -> &'static str {
        "Inserts a declaration of an unused local variable before a statement."
    }

    fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        if node.is_statement() && node.tag() != NodeTag::Block {
            vec![node.clone()]
        } else {
            Vec::new()
        }
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        let pos = target.pos;
        let declaration = synthetic(
            NodeKind::LocalDecl {
                type_name: String::from("int"),
                // The anchor id keeps generated names unique within one mutant.
                name: format!("unused{}", target.id),
                initializer: Some(Box::new(int_literal(0, pos))),
            },
            pos,
        );
        tree.apply_edit(Edit::InsertBefore {
            id: target.id,
            node: declaration,
        })
        .is_ok()
    }
}

/// Inserts `x = x;` after an assignment to `x`.
pub struct SelfAssign {}

impl Transform for SelfAssign {
    fn name(&self) -> &'static str {
        "self_assign"
    }

    fn description(&self) -> &'static str {
        "Inserts a self-assignment of a variable after an assignment to it."
    }

    fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        if Self::assigned_name(node).is_some() {
            vec![node.clone()]
        } else {
            Vec::new()
        }
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        let assigned = match Self::assigned_name(target) {
            Some(assigned) => String::from(assigned),
            None => return false,
        };
        let pos = target.pos;
        let statement = synthetic(
            NodeKind::ExprStmt {
                expression: Box::new(synthetic(
                    NodeKind::Assign {
                        target: Box::new(name(&assigned, pos)),
                        operator: String::from("="),
                        value: Box::new(name(&assigned, pos)),
                    },
                    pos,
                )),
            },
            pos,
        );
        tree.apply_edit(Edit::InsertAfter {
            id: target.id,
            node: statement,
        })
        .is_ok()
    }
}

impl SelfAssign {
    /// The simple name assigned by `node`, when it is an assignment statement to a
    /// plain variable.
    fn assigned_name(node: &SyntaxNode) -> Option<&str> {
        let expression = match &node.kind {
            NodeKind::ExprStmt { expression } => expression,
            _ => return None,
        };
        let target = match &expression.kind {
            NodeKind::Assign { target, .. } => target,
            _ => return None,
        };
        match &target.kind {
            NodeKind::Name { identifier } => Some(identifier),
            _ => None,
        }
    }
}

/// Swaps the operands of an equality comparison.
pub struct FlipComparison {}

impl Transform for FlipComparison {
    fn name(&self) -> &'static str {
        "flip_comparison"
    }

    fn description(&self) -> &'static str {
        "Swaps the operands of an equality or inequality comparison."
    }

    fn check(&self, _index: &SyntaxIndex<'_>, node: &SyntaxNode) -> Vec<SyntaxNode> {
        if Self::is_flippable(node) {
            return vec![node.clone()];
        }
        node.preorder()
            .into_iter()
            .filter(|n| Self::is_flippable(n))
            .cloned()
            .collect()
    }

    fn apply(
        &self,
        target: &SyntaxNode,
        tree: &mut SyntaxTree,
        _sibling: Option<&SyntaxNode>,
        _source: &SyntaxNode,
    ) -> bool {
        let (operator, left, right) = match &target.kind {
            NodeKind::Binary {
                operator,
                left,
                right,
            } if operator == "==" || operator == "!=" => {
                (operator.clone(), left.clone(), right.clone())
            }
            _ => return false,
        };
        let flipped = synthetic(
            NodeKind::Binary {
                operator,
                left: right,
                right: left,
            },
            target.pos,
        );
        tree.apply_edit(Edit::Replace {
            id: target.id,
            node: flipped,
        })
        .is_ok()
    }
}

impl FlipComparison {
    fn is_flippable(node: &SyntaxNode) -> bool {
        matches!(
            &node.kind,
            NodeKind::Binary { operator, .. } if operator == "==" || operator == "!="
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::pretty_printer::PrettyPrinter;

    fn apply_to_first_target(
        source: &str,
        transform: &dyn Transform,
        candidate_tag: NodeTag,
    ) -> Option<String> {
        let mut tree = parse(source).unwrap();
        let targets = {
            let index = SyntaxIndex::build(&tree);
            let candidate = index
                .primary_nodes()
                .iter()
                .find(|n| n.tag() == candidate_tag)?;
            transform.check(&index, candidate)
        };
        let target = targets.first()?.clone();
        if !transform.apply(&target, &mut tree, None, &target) {
            return None;
        }
        Some(PrettyPrinter::new(4).print_tree(&tree))
    }

    #[test]
    fn test_if_true_wrap() {
        let source = "class C {\n    void m() {\n        log(1);\n    }\n}\n";
        let text = apply_to_first_target(source, &IfTrueWrap {}, NodeTag::ExprStmt).unwrap();
        assert!(text.contains("if (true) {"));
        assert!(text.contains("log(1);"));
    }

    #[test]
    fn test_if_true_wrap_skips_local_declarations() {
        let tree = parse("class C {\n    void m() {\n        int x = 1;\n    }\n}\n").unwrap();
        let index = SyntaxIndex::build(&tree);
        let declaration = index
            .primary_nodes()
            .iter()
            .find(|n| n.tag() == NodeTag::LocalDecl)
            .unwrap();
        assert!(IfTrueWrap {}.check(&index, declaration).is_empty());
    }

    #[test]
    fn test_double_negation() {
        let source = "class C {\n    void m() {\n        if (a > b) {\n            log(1);\n        }\n    }\n}\n";
        let text = apply_to_first_target(source, &DoubleNegation {}, NodeTag::If).unwrap();
        assert!(text.contains("if (!(!(a > b))) {"));
    }

    #[test]
    fn test_true_conjunction_on_while() {
        let source =
            "class C {\n    void m() {\n        while (go()) {\n            step();\n        }\n    }\n}\n";
        let text = apply_to_first_target(source, &TrueConjunction {}, NodeTag::While).unwrap();
        assert!(text.contains("while (true && go()) {"));
    }

    #[test]
    fn test_add_zero_parenthesizes_inside_products() {
        let source = "class C {\n    void m() {\n        x = 3 * y;\n    }\n}\n";
        let text = apply_to_first_target(source, &AddZero {}, NodeTag::ExprStmt).unwrap();
        assert!(text.contains("x = (3 + 0) * y;"));
    }

    #[test]
    fn test_mul_one() {
        let source = "class C {\n    void m() {\n        x = y + 7;\n    }\n}\n";
        let text = apply_to_first_target(source, &MulOne {}, NodeTag::ExprStmt).unwrap();
        assert!(text.contains("x = y + 7 * 1;"));
    }

    #[test]
    fn test_dead_store_inserts_before() {
        let source = "class C {\n    void m() {\n        log(1);\n    }\n}\n";
        let text = apply_to_first_target(source, &DeadStore {}, NodeTag::ExprStmt).unwrap();
        let declaration_at = text.find("int unused").unwrap();
        let statement_at = text.find("log(1);").unwrap();
        assert!(declaration_at < statement_at);
    }

    #[test]
    fn test_self_assign_inserts_after() {
        let source = "class C {\n    void m() {\n        x = compute();\n        log(x);\n    }\n}\n";
        let text = apply_to_first_target(source, &SelfAssign {}, NodeTag::ExprStmt).unwrap();
        let assignment_at = text.find("x = compute();").unwrap();
        let self_assignment_at = text.find("x = x;").unwrap();
        let log_at = text.find("log(x);").unwrap();
        assert!(assignment_at < self_assignment_at);
        assert!(self_assignment_at < log_at);
    }

    #[test]
    fn test_flip_comparison() {
        let source = "class C {\n    void m() {\n        if (x == limit()) {\n            stop();\n        }\n    }\n}\n";
        let text = apply_to_first_target(source, &FlipComparison {}, NodeTag::If).unwrap();
        assert!(text.contains("if (limit() == x) {"));
    }

    #[test]
    fn test_constructed_nodes_are_marked_prior() {
        let source = "class C {\n    void m() {\n        if (a > b) {\n            log(1);\n        }\n    }\n}\n";
        let mut tree = parse(source).unwrap();
        let targets = {
            let index = SyntaxIndex::build(&tree);
            let conditional = index
                .primary_nodes()
                .iter()
                .find(|n| n.tag() == NodeTag::If)
                .unwrap();
            DoubleNegation {}.check(&index, conditional)
        };
        let target = targets[0].clone();
        assert!(DoubleNegation {}.apply(&target, &mut tree, None, &target));
        assert!(tree.root.preorder().iter().any(|n| n.prior));
    }
}
