//! The `index` module contains [`SyntaxIndex`], the derived, read-only view of one
//! syntax tree that every selection strategy and the mutation engine query.
//!
//! The index holds a flat ordered list of "primary" nodes (type declarations, their
//! members, and every statement reachable by recursively unwrapping `if`/`try`/loop
//! bodies), a per-declaration statement map, a per-declaration identifier set, and a
//! field-name usage map.  It also provides cross-tree node correlation: re-locating a
//! node from one tree inside an independently parsed copy of the same source.

use crate::ast::{NodeKind, SyntaxNode, SyntaxTree};
use crate::error::EquimorphError;
use crate::pretty_printer::PrettyPrinter;
use std::collections::{HashMap, HashSet};

/// Derived view over one [`SyntaxTree`].
pub struct SyntaxIndex<'a> {
    tree: &'a SyntaxTree,
    primary: Vec<&'a SyntaxNode>,
    statements: HashMap<String, Vec<&'a SyntaxNode>>,
    identifiers: HashMap<String, HashSet<String>>,
    fields: HashMap<String, Vec<&'a SyntaxNode>>,
    printer: PrettyPrinter,
}

impl<'a> SyntaxIndex<'a> {
    /// Build an index over `tree`.  Building never fails on a well-formed tree.
    pub fn build(tree: &'a SyntaxTree) -> SyntaxIndex<'a> {
        let mut primary: Vec<&'a SyntaxNode> = Vec::new();
        let mut statements: HashMap<String, Vec<&'a SyntaxNode>> = HashMap::new();
        let mut identifiers: HashMap<String, HashSet<String>> = HashMap::new();
        let mut fields: HashMap<String, Vec<&'a SyntaxNode>> = HashMap::new();

        for type_decl in tree.root.children() {
            primary.push(type_decl);
            let type_name = Self::type_name_of(type_decl);
            for member in type_decl.children() {
                primary.push(member);
                match &member.kind {
                    NodeKind::FieldDecl { name, .. } => {
                        let signature = format!("{}.{}", type_name, name);
                        fields.entry(name.clone()).or_default().push(member);
                        // A field has no body; it still owns an (empty) statement list.
                        statements.insert(signature.clone(), Vec::new());
                        identifiers.insert(signature, Self::collect_identifiers(member));
                    }
                    NodeKind::MethodDecl { name, body, .. } => {
                        let signature = format!("{}.{}", type_name, name);
                        let mut flat: Vec<&'a SyntaxNode> = Vec::new();
                        if let Some(body) = body {
                            Self::flatten_block(body, &mut flat);
                        }
                        primary.extend(flat.iter().copied());
                        statements.insert(signature.clone(), flat);
                        identifiers.insert(signature, Self::collect_identifiers(member));
                    }
                    NodeKind::InitializerDecl { body, .. } => {
                        let signature = format!("{}.<initializer#{}>", type_name, member.id);
                        let mut flat: Vec<&'a SyntaxNode> = Vec::new();
                        Self::flatten_block(body, &mut flat);
                        primary.extend(flat.iter().copied());
                        statements.insert(signature.clone(), flat);
                        identifiers.insert(signature, Self::collect_identifiers(member));
                    }
                    _ => {}
                }
            }
        }

        SyntaxIndex {
            tree,
            primary,
            statements,
            identifiers,
            fields,
            printer: PrettyPrinter::new(4),
        }
    }

    fn type_name_of(type_decl: &SyntaxNode) -> String {
        match &type_decl.kind {
            NodeKind::ClassDecl { name, .. }
            | NodeKind::EnumDecl { name, .. }
            | NodeKind::AnnotationDecl { name, .. } => name.clone(),
            _ => String::from("<anonymous>"),
        }
    }

    /// Flatten the statements of `block` into `out`, unwrapping `if` branches, loop
    /// bodies, and `try` bodies so that every nested statement appears exactly once.
    fn flatten_block(block: &'a SyntaxNode, out: &mut Vec<&'a SyntaxNode>) {
        if let NodeKind::Block { statements } = &block.kind {
            for statement in statements {
                Self::flatten_statement(statement, out);
            }
        }
    }

    fn flatten_statement(statement: &'a SyntaxNode, out: &mut Vec<&'a SyntaxNode>) {
        if let NodeKind::Block { .. } = &statement.kind {
            // A bare nested block contributes its contents, not itself.
            Self::flatten_block(statement, out);
            return;
        }
        out.push(statement);
        match &statement.kind {
            NodeKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                Self::flatten_branch(then_branch, out);
                if let Some(else_branch) = else_branch {
                    Self::flatten_branch(else_branch, out);
                }
            }
            NodeKind::While { body, .. } => Self::flatten_branch(body, out),
            NodeKind::For { body, .. } => Self::flatten_branch(body, out),
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                Self::flatten_branch(body, out);
                for catch in catches {
                    if let NodeKind::CatchClause { body, .. } = &catch.kind {
                        Self::flatten_branch(body, out);
                    }
                }
                if let Some(finally) = finally {
                    Self::flatten_branch(finally, out);
                }
            }
            _ => {}
        }
    }

    fn flatten_branch(branch: &'a SyntaxNode, out: &mut Vec<&'a SyntaxNode>) {
        if let NodeKind::Block { .. } = &branch.kind {
            Self::flatten_block(branch, out);
        } else {
            Self::flatten_statement(branch, out);
        }
    }

    fn collect_identifiers(node: &SyntaxNode) -> HashSet<String> {
        let mut names: HashSet<String> = HashSet::new();
        for descendant in node.preorder() {
            match &descendant.kind {
                NodeKind::Name { identifier } => {
                    names.insert(identifier.clone());
                }
                NodeKind::FieldAccess { name, .. } => {
                    names.insert(name.clone());
                }
                NodeKind::Call { name, .. } => {
                    names.insert(name.clone());
                }
                _ => {}
            }
        }
        names
    }

    /// The tree this index was built from.
    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// The flat ordered list of primary nodes.
    pub fn primary_nodes(&self) -> &[&'a SyntaxNode] {
        &self.primary
    }

    /// The per-declaration statement map, keyed by declaration signature.
    pub fn statements(&self) -> &HashMap<String, Vec<&'a SyntaxNode>> {
        &self.statements
    }

    /// The flattened statement list for one declaration signature.
    pub fn statements_for(&self, signature: &str) -> Option<&Vec<&'a SyntaxNode>> {
        self.statements.get(signature)
    }

    /// The identifier names referenced inside one declaration.
    pub fn identifiers_for(&self, signature: &str) -> Option<&HashSet<String>> {
        self.identifiers.get(signature)
    }

    /// The nodes declaring the field named `name`.
    pub fn field_declarations(&self, name: &str) -> Option<&Vec<&'a SyntaxNode>> {
        self.fields.get(name)
    }

    /// Return the signature of the declaration whose body contains the node with `id`,
    /// or the declaration itself when `id` names a member.
    pub fn declaration_signature_of(&self, id: u64) -> Option<String> {
        let path = self.tree.path_to(id)?;
        let mut type_name: Option<String> = None;
        let mut signature: Option<String> = None;
        for node in &path {
            match &node.kind {
                NodeKind::ClassDecl { name, .. }
                | NodeKind::EnumDecl { name, .. }
                | NodeKind::AnnotationDecl { name, .. } => type_name = Some(name.clone()),
                NodeKind::FieldDecl { name, .. } | NodeKind::MethodDecl { name, .. } => {
                    if let Some(type_name) = &type_name {
                        signature = Some(format!("{}.{}", type_name, name));
                    }
                }
                NodeKind::InitializerDecl { .. } => {
                    if let Some(type_name) = &type_name {
                        signature = Some(format!("{}.<initializer#{}>", type_name, node.id));
                    }
                }
                _ => {}
            }
        }
        signature
    }

    /// Return the nearest enclosing non-block statement of the node with `id`, or the
    /// node itself when it is a statement.
    pub fn enclosing_statement(&self, id: u64) -> Option<&'a SyntaxNode> {
        let path = self.tree.path_to(id)?;
        for node in path.iter().rev() {
            if node.is_statement() && !matches!(node.kind, NodeKind::Block { .. }) {
                return Some(node);
            }
        }
        None
    }

    /// Re-locate `reference`, a node from a different tree built from the same (or
    /// edited) source, inside this index's tree.
    ///
    /// The structural-id fast path applies when the reference's id resolves to a node
    /// with the same kind, position, and printed text — always true when both trees
    /// were parsed from identical source.  Otherwise the positional heuristic scans
    /// primary nodes first and their structural descendants second; more than one
    /// distinct structural match is reported as an ambiguity, never resolved by
    /// picking the first.
    ///
    /// # Arguments
    ///
    /// * `reference` - The node to re-locate.
    /// * `line` - The reference node's 1-based start line.
    /// * `column` - The reference node's 1-based start column.
    pub fn find_node_by_position(
        &self,
        reference: &SyntaxNode,
        line: u32,
        column: u32,
    ) -> Result<&'a SyntaxNode, EquimorphError> {
        let reference_text = self.printer.print_node(reference);

        if let Some(node) = self.tree.find_node(reference.id) {
            if node.tag() == reference.tag()
                && node.pos.line == line
                && node.pos.column == column
                && self.printer.print_node(node) == reference_text
            {
                return Ok(node);
            }
        }

        let matches_reference = |node: &SyntaxNode| {
            node.pos.line == line
                && node.pos.column == column
                && node.tag() == reference.tag()
                && self.printer.print_node(node) == reference_text
        };

        let mut found: Vec<&'a SyntaxNode> = Vec::new();
        for node in self.primary.iter().copied() {
            if matches_reference(node) && !found.iter().any(|f| f.id == node.id) {
                found.push(node);
            }
        }
        if found.is_empty() {
            for node in &self.primary {
                for descendant in node.preorder() {
                    if matches_reference(descendant)
                        && !found.iter().any(|f| f.id == descendant.id)
                    {
                        found.push(descendant);
                    }
                }
            }
        }

        match found.len() {
            1 => Ok(found[0]),
            0 => Err(EquimorphError::NodeNotFound {
                kind: reference.tag().to_string(),
                line,
                column,
            }),
            _ => Err(EquimorphError::AmbiguousNode {
                kind: reference.tag().to_string(),
                line,
                column,
            }),
        }
    }
}
