//! The `ast` module contains the syntax tree types shared by the front end, the index,
//! the selection strategies, and the transforms.
//!
//! Node kinds form a closed enumeration so that code operating on the tree can use
//! exhaustive pattern matching instead of open-ended type tests.  Each node carries a
//! structural id assigned by the parser, a 1-based source position, and the byte length
//! of its source extent.  Trees are never mutated in place by callers; the only mutation
//! pathway is [`SyntaxTree::apply_edit`], which locates its anchor node by id.

use crate::error::EquimorphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;

/// A 1-based line/column source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Position {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The fieldless discriminant of [`NodeKind`], used for kind comparison and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    CompilationUnit,
    ClassDecl,
    EnumDecl,
    AnnotationDecl,
    InitializerDecl,
    FieldDecl,
    MethodDecl,
    Block,
    If,
    While,
    For,
    Try,
    CatchClause,
    Return,
    LocalDecl,
    ExprStmt,
    Assign,
    Binary,
    Unary,
    Call,
    FieldAccess,
    Name,
    IntLiteral,
    BoolLiteral,
    StringLiteral,
    CharLiteral,
    NullLiteral,
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A method or constructor parameter.  Parameters are not full syntax nodes; nothing in
/// the system selects or rewrites them individually.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
}

/// The closed set of node kinds the front end produces.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    CompilationUnit {
        types: Vec<SyntaxNode>,
    },
    ClassDecl {
        modifiers: Vec<String>,
        name: String,
        members: Vec<SyntaxNode>,
    },
    EnumDecl {
        modifiers: Vec<String>,
        name: String,
        constants: Vec<String>,
        members: Vec<SyntaxNode>,
    },
    AnnotationDecl {
        modifiers: Vec<String>,
        name: String,
        members: Vec<SyntaxNode>,
    },
    InitializerDecl {
        is_static: bool,
        body: Box<SyntaxNode>,
    },
    FieldDecl {
        modifiers: Vec<String>,
        type_name: String,
        name: String,
        initializer: Option<Box<SyntaxNode>>,
    },
    MethodDecl {
        modifiers: Vec<String>,
        return_type: String,
        name: String,
        parameters: Vec<Parameter>,
        body: Option<Box<SyntaxNode>>,
    },
    Block {
        statements: Vec<SyntaxNode>,
    },
    If {
        condition: Box<SyntaxNode>,
        then_branch: Box<SyntaxNode>,
        else_branch: Option<Box<SyntaxNode>>,
    },
    While {
        condition: Box<SyntaxNode>,
        body: Box<SyntaxNode>,
    },
    For {
        init: Option<Box<SyntaxNode>>,
        condition: Option<Box<SyntaxNode>>,
        update: Option<Box<SyntaxNode>>,
        body: Box<SyntaxNode>,
    },
    Try {
        body: Box<SyntaxNode>,
        catches: Vec<SyntaxNode>,
        finally: Option<Box<SyntaxNode>>,
    },
    CatchClause {
        type_name: String,
        name: String,
        body: Box<SyntaxNode>,
    },
    Return {
        value: Option<Box<SyntaxNode>>,
    },
    LocalDecl {
        type_name: String,
        name: String,
        initializer: Option<Box<SyntaxNode>>,
    },
    ExprStmt {
        expression: Box<SyntaxNode>,
    },
    Assign {
        target: Box<SyntaxNode>,
        operator: String,
        value: Box<SyntaxNode>,
    },
    Binary {
        operator: String,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    Unary {
        operator: String,
        operand: Box<SyntaxNode>,
        prefix: bool,
    },
    Call {
        receiver: Option<Box<SyntaxNode>>,
        name: String,
        arguments: Vec<SyntaxNode>,
    },
    FieldAccess {
        object: Box<SyntaxNode>,
        name: String,
    },
    Name {
        identifier: String,
    },
    IntLiteral {
        value: i64,
        text: String,
    },
    BoolLiteral {
        value: bool,
    },
    StringLiteral {
        value: String,
    },
    CharLiteral {
        value: String,
    },
    NullLiteral,
}

/// One node in a syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    /// Structural id.  The parser assigns ids deterministically, so two parses of the
    /// same text assign the same id to the same node.
    pub id: u64,

    /// Start position of the node's source extent.
    pub pos: Position,

    /// Byte length of the node's source extent.
    pub span: usize,

    /// True if an earlier transformation pass marked this node as a prior rewrite site.
    pub prior: bool,

    pub kind: NodeKind,
}

impl SyntaxNode {
    pub fn new(id: u64, pos: Position, span: usize, kind: NodeKind) -> SyntaxNode {
        SyntaxNode {
            id,
            pos,
            span,
            prior: false,
            kind,
        }
    }

    /// Return the fieldless discriminant for this node's kind.
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            NodeKind::CompilationUnit { .. } => NodeTag::CompilationUnit,
            NodeKind::ClassDecl { .. } => NodeTag::ClassDecl,
            NodeKind::EnumDecl { .. } => NodeTag::EnumDecl,
            NodeKind::AnnotationDecl { .. } => NodeTag::AnnotationDecl,
            NodeKind::InitializerDecl { .. } => NodeTag::InitializerDecl,
            NodeKind::FieldDecl { .. } => NodeTag::FieldDecl,
            NodeKind::MethodDecl { .. } => NodeTag::MethodDecl,
            NodeKind::Block { .. } => NodeTag::Block,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::While { .. } => NodeTag::While,
            NodeKind::For { .. } => NodeTag::For,
            NodeKind::Try { .. } => NodeTag::Try,
            NodeKind::CatchClause { .. } => NodeTag::CatchClause,
            NodeKind::Return { .. } => NodeTag::Return,
            NodeKind::LocalDecl { .. } => NodeTag::LocalDecl,
            NodeKind::ExprStmt { .. } => NodeTag::ExprStmt,
            NodeKind::Assign { .. } => NodeTag::Assign,
            NodeKind::Binary { .. } => NodeTag::Binary,
            NodeKind::Unary { .. } => NodeTag::Unary,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::FieldAccess { .. } => NodeTag::FieldAccess,
            NodeKind::Name { .. } => NodeTag::Name,
            NodeKind::IntLiteral { .. } => NodeTag::IntLiteral,
            NodeKind::BoolLiteral { .. } => NodeTag::BoolLiteral,
            NodeKind::StringLiteral { .. } => NodeTag::StringLiteral,
            NodeKind::CharLiteral { .. } => NodeTag::CharLiteral,
            NodeKind::NullLiteral => NodeTag::NullLiteral,
        }
    }

    /// Return true if the node is a statement-level construct.
    pub fn is_statement(&self) -> bool {
        matches!(
            self.tag(),
            NodeTag::Block
                | NodeTag::If
                | NodeTag::While
                | NodeTag::For
                | NodeTag::Try
                | NodeTag::Return
                | NodeTag::LocalDecl
                | NodeTag::ExprStmt
        )
    }

    /// Return true if the node is a type-level declaration: class, enum, annotation
    /// type, or initializer block.  These are not valid rewrite targets.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self.tag(),
            NodeTag::ClassDecl
                | NodeTag::EnumDecl
                | NodeTag::AnnotationDecl
                | NodeTag::InitializerDecl
        )
    }

    /// Return true if the node is a literal expression.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.tag(),
            NodeTag::IntLiteral
                | NodeTag::BoolLiteral
                | NodeTag::StringLiteral
                | NodeTag::CharLiteral
                | NodeTag::NullLiteral
        )
    }

    /// Mark the node as a prior rewrite site.  The guided selection strategy expands
    /// marked conditionals, loops, and fields into extra candidates.
    pub fn mark_prior(&mut self) {
        self.prior = true;
    }

    /// Return the node's structural children in source order.
    pub fn children(&self) -> Vec<&SyntaxNode> {
        let mut children: Vec<&SyntaxNode> = Vec::new();
        match &self.kind {
            NodeKind::CompilationUnit { types } => children.extend(types.iter()),
            NodeKind::ClassDecl { members, .. }
            | NodeKind::EnumDecl { members, .. }
            | NodeKind::AnnotationDecl { members, .. } => children.extend(members.iter()),
            NodeKind::InitializerDecl { body, .. } => children.push(body),
            NodeKind::FieldDecl { initializer, .. } => {
                if let Some(init) = initializer {
                    children.push(init);
                }
            }
            NodeKind::MethodDecl { body, .. } => {
                if let Some(body) = body {
                    children.push(body);
                }
            }
            NodeKind::Block { statements } => children.extend(statements.iter()),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                children.push(condition);
                children.push(then_branch);
                if let Some(else_branch) = else_branch {
                    children.push(else_branch);
                }
            }
            NodeKind::While { condition, body } => {
                children.push(condition);
                children.push(body);
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    children.push(init);
                }
                if let Some(condition) = condition {
                    children.push(condition);
                }
                if let Some(update) = update {
                    children.push(update);
                }
                children.push(body);
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                children.push(body);
                children.extend(catches.iter());
                if let Some(finally) = finally {
                    children.push(finally);
                }
            }
            NodeKind::CatchClause { body, .. } => children.push(body),
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    children.push(value);
                }
            }
            NodeKind::LocalDecl { initializer, .. } => {
                if let Some(init) = initializer {
                    children.push(init);
                }
            }
            NodeKind::ExprStmt { expression } => children.push(expression),
            NodeKind::Assign { target, value, .. } => {
                children.push(target);
                children.push(value);
            }
            NodeKind::Binary { left, right, .. } => {
                children.push(left);
                children.push(right);
            }
            NodeKind::Unary { operand, .. } => children.push(operand),
            NodeKind::Call {
                receiver,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    children.push(receiver);
                }
                children.extend(arguments.iter());
            }
            NodeKind::FieldAccess { object, .. } => children.push(object),
            NodeKind::Name { .. }
            | NodeKind::IntLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::CharLiteral { .. }
            | NodeKind::NullLiteral => {}
        }
        children
    }

    /// Return mutable references to the node's structural children in source order.
    pub fn children_mut(&mut self) -> Vec<&mut SyntaxNode> {
        let mut children: Vec<&mut SyntaxNode> = Vec::new();
        match &mut self.kind {
            NodeKind::CompilationUnit { types } => children.extend(types.iter_mut()),
            NodeKind::ClassDecl { members, .. }
            | NodeKind::EnumDecl { members, .. }
            | NodeKind::AnnotationDecl { members, .. } => children.extend(members.iter_mut()),
            NodeKind::InitializerDecl { body, .. } => children.push(body),
            NodeKind::FieldDecl { initializer, .. } => {
                if let Some(init) = initializer {
                    children.push(init);
                }
            }
            NodeKind::MethodDecl { body, .. } => {
                if let Some(body) = body {
                    children.push(body);
                }
            }
            NodeKind::Block { statements } => children.extend(statements.iter_mut()),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                children.push(condition);
                children.push(then_branch);
                if let Some(else_branch) = else_branch {
                    children.push(else_branch);
                }
            }
            NodeKind::While { condition, body } => {
                children.push(condition);
                children.push(body);
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    children.push(init);
                }
                if let Some(condition) = condition {
                    children.push(condition);
                }
                if let Some(update) = update {
                    children.push(update);
                }
                children.push(body);
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                children.push(body);
                children.extend(catches.iter_mut());
                if let Some(finally) = finally {
                    children.push(finally);
                }
            }
            NodeKind::CatchClause { body, .. } => children.push(body),
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    children.push(value);
                }
            }
            NodeKind::LocalDecl { initializer, .. } => {
                if let Some(init) = initializer {
                    children.push(init);
                }
            }
            NodeKind::ExprStmt { expression } => children.push(expression),
            NodeKind::Assign { target, value, .. } => {
                children.push(target);
                children.push(value);
            }
            NodeKind::Binary { left, right, .. } => {
                children.push(left);
                children.push(right);
            }
            NodeKind::Unary { operand, .. } => children.push(operand),
            NodeKind::Call {
                receiver,
                arguments,
                ..
            } => {
                if let Some(receiver) = receiver {
                    children.push(receiver);
                }
                children.extend(arguments.iter_mut());
            }
            NodeKind::FieldAccess { object, .. } => children.push(object),
            NodeKind::Name { .. }
            | NodeKind::IntLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::CharLiteral { .. }
            | NodeKind::NullLiteral => {}
        }
        children
    }

    /// Return the node and all of its descendants in pre-order.
    pub fn preorder(&self) -> Vec<&SyntaxNode> {
        let mut nodes: Vec<&SyntaxNode> = Vec::new();
        self.collect_preorder(&mut nodes);
        nodes
    }

    fn collect_preorder<'a>(&'a self, nodes: &mut Vec<&'a SyntaxNode>) {
        nodes.push(self);
        for child in self.children() {
            child.collect_preorder(nodes);
        }
    }

    /// Find the node with `id` in this subtree.
    pub fn find(&self, id: u64) -> Option<&SyntaxNode> {
        if self.id == id {
            return Some(self);
        }
        for child in self.children() {
            if let Some(found) = child.find(id) {
                return Some(found);
            }
        }
        None
    }

    /// Find the node with `id` in this subtree and return a mutable reference to it.
    pub fn find_mut(&mut self, id: u64) -> Option<&mut SyntaxNode> {
        if self.id == id {
            return Some(self);
        }
        for child in self.children_mut() {
            if let Some(found) = child.find_mut(id) {
                return Some(found);
            }
        }
        None
    }
}

/// One edit to apply to a syntax tree, keyed by the id of an existing anchor node.
#[derive(Debug, Clone)]
pub enum Edit {
    /// Replace the node with `id` by `node`.
    Replace { id: u64, node: SyntaxNode },

    /// Insert `node` immediately before the statement with `id` in its enclosing block.
    InsertBefore { id: u64, node: SyntaxNode },

    /// Insert `node` immediately after the statement with `id` in its enclosing block.
    InsertAfter { id: u64, node: SyntaxNode },
}

/// The immutable result of parsing source text: the root node plus the source text the
/// tree was parsed from.  Retaining the source lets the engine clone the tree by
/// re-parsing, which guarantees total isolation between mutation attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
    pub source: String,
}

impl SyntaxTree {
    pub fn new(root: SyntaxNode, source: String) -> SyntaxTree {
        SyntaxTree { root, source }
    }

    /// Find the node with `id` anywhere in the tree.
    pub fn find_node(&self, id: u64) -> Option<&SyntaxNode> {
        self.root.find(id)
    }

    /// Return the path from the root to the node with `id`, inclusive of both ends.
    pub fn path_to(&self, id: u64) -> Option<Vec<&SyntaxNode>> {
        let mut path: Vec<&SyntaxNode> = Vec::new();
        if Self::path_helper(&self.root, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn path_helper<'a>(node: &'a SyntaxNode, id: u64, path: &mut Vec<&'a SyntaxNode>) -> bool {
        path.push(node);
        if node.id == id {
            return true;
        }
        for child in node.children() {
            if Self::path_helper(child, id, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Return the statement that follows the statement with `id` in its enclosing
    /// statement list, if any.
    pub fn next_sibling(&self, id: u64) -> Option<&SyntaxNode> {
        Self::sibling_helper(&self.root, id)
    }

    fn sibling_helper(node: &SyntaxNode, id: u64) -> Option<&SyntaxNode> {
        if let NodeKind::Block { statements } = &node.kind {
            if let Some(index) = statements.iter().position(|s| s.id == id) {
                return statements.get(index + 1);
            }
        }
        for child in node.children() {
            if let Some(found) = Self::sibling_helper(child, id) {
                return Some(found);
            }
        }
        None
    }

    /// Apply one edit to the tree.
    ///
    /// # Arguments
    ///
    /// * `edit` - The edit to apply.  The edit's anchor id must name a node currently in
    ///   the tree; insertion anchors must additionally sit in a block's statement list.
    pub fn apply_edit(&mut self, edit: Edit) -> Result<(), EquimorphError> {
        match edit {
            Edit::Replace { id, node } => {
                if let Some(slot) = self.root.find_mut(id) {
                    *slot = node;
                    Ok(())
                } else {
                    Err(EquimorphError::Edit(format!(
                        "no node with id {} to replace",
                        id
                    )))
                }
            }
            Edit::InsertBefore { id, node } => {
                let mut pending = Some(node);
                if Self::insert_helper(&mut self.root, id, &mut pending, false) {
                    Ok(())
                } else {
                    Err(EquimorphError::Edit(format!(
                        "no statement with id {} to insert before",
                        id
                    )))
                }
            }
            Edit::InsertAfter { id, node } => {
                let mut pending = Some(node);
                if Self::insert_helper(&mut self.root, id, &mut pending, true) {
                    Ok(())
                } else {
                    Err(EquimorphError::Edit(format!(
                        "no statement with id {} to insert after",
                        id
                    )))
                }
            }
        }
    }

    fn insert_helper(
        node: &mut SyntaxNode,
        id: u64,
        pending: &mut Option<SyntaxNode>,
        after: bool,
    ) -> bool {
        if let NodeKind::Block { statements } = &mut node.kind {
            if let Some(index) = statements.iter().position(|s| s.id == id) {
                if let Some(new_node) = pending.take() {
                    let insert_at = if after { index + 1 } else { index };
                    statements.insert(insert_at, new_node);
                    return true;
                }
                return false;
            }
        }
        for child in node.children_mut() {
            if Self::insert_helper(child, id, pending, after) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_node(id: u64, value: i64) -> SyntaxNode {
        SyntaxNode::new(
            id,
            Position::new(1, 1),
            1,
            NodeKind::IntLiteral {
                value,
                text: value.to_string(),
            },
        )
    }

    fn stmt_node(id: u64, value: i64) -> SyntaxNode {
        SyntaxNode::new(
            id,
            Position::new(1, 1),
            2,
            NodeKind::ExprStmt {
                expression: Box::new(int_node(id + 100, value)),
            },
        )
    }

    fn block_tree() -> SyntaxTree {
        let block = SyntaxNode::new(
            1,
            Position::new(1, 1),
            10,
            NodeKind::Block {
                statements: vec![stmt_node(2, 10), stmt_node(3, 20)],
            },
        );
        SyntaxTree::new(block, String::from("{ 10; 20; }"))
    }

    #[test]
    fn test_find_node_by_id() {
        let tree = block_tree();
        assert!(tree.find_node(2).is_some());
        assert!(tree.find_node(102).is_some());
        assert!(tree.find_node(999).is_none());
    }

    #[test]
    fn test_path_to_contains_ancestors() {
        let tree = block_tree();
        let path = tree.path_to(102).unwrap();
        let tags: Vec<NodeTag> = path.iter().map(|n| n.tag()).collect();
        assert_eq!(
            tags,
            vec![NodeTag::Block, NodeTag::ExprStmt, NodeTag::IntLiteral]
        );
    }

    #[test]
    fn test_next_sibling() {
        let tree = block_tree();
        let sibling = tree.next_sibling(2).unwrap();
        assert_eq!(sibling.id, 3);
        assert!(tree.next_sibling(3).is_none());
    }

    #[test]
    fn test_apply_replace_edit() {
        let mut tree = block_tree();
        let replacement = stmt_node(50, 99);
        tree.apply_edit(Edit::Replace {
            id: 3,
            node: replacement,
        })
        .unwrap();
        assert!(tree.find_node(3).is_none());
        assert!(tree.find_node(50).is_some());
    }

    #[test]
    fn test_apply_insert_edits() {
        let mut tree = block_tree();
        tree.apply_edit(Edit::InsertBefore {
            id: 2,
            node: stmt_node(60, 1),
        })
        .unwrap();
        tree.apply_edit(Edit::InsertAfter {
            id: 3,
            node: stmt_node(61, 2),
        })
        .unwrap();
        if let NodeKind::Block { statements } = &tree.root.kind {
            let ids: Vec<u64> = statements.iter().map(|s| s.id).collect();
            assert_eq!(ids, vec![60, 2, 3, 61]);
        } else {
            panic!("root is not a block");
        }
    }

    #[test]
    fn test_apply_edit_with_unknown_anchor_fails() {
        let mut tree = block_tree();
        let result = tree.apply_edit(Edit::Replace {
            id: 999,
            node: stmt_node(70, 1),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_preorder_counts_every_node() {
        let tree = block_tree();
        // Block, two ExprStmt, two IntLiteral.
        assert_eq!(tree.root.preorder().len(), 5);
    }
}
