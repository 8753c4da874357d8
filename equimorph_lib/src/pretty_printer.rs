//! The `pretty_printer` module renders syntax trees and individual nodes back to source
//! text.
//!
//! The printer produces a canonical form: indentation is normalized, statement bodies
//! print with braces, and grouping parentheses are re-inserted from operator precedence.
//! Printing is pure and deterministic, so the printed text of a node doubles as part of
//! the node-identity triple used for cross-tree correlation.

use crate::ast::{NodeKind, SyntaxNode, SyntaxTree};

/// Precedence used when a subexpression must never be parenthesized.
const EXPR_TOP: u8 = 0;
const ASSIGN_PREC: u8 = 0;
const UNARY_PREC: u8 = 11;
const POSTFIX_PREC: u8 = 12;
const PRIMARY_PREC: u8 = 13;

fn binary_print_precedence(op: &str) -> u8 {
    match op {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | ">" | "<=" | ">=" => 7,
        "<<" | ">>" => 8,
        "+" | "-" => 9,
        _ => 10,
    }
}

/// Renders syntax nodes to text with a configurable indentation width.
pub struct PrettyPrinter {
    indent_width: usize,
}

impl PrettyPrinter {
    pub fn new(indent_width: usize) -> PrettyPrinter {
        PrettyPrinter { indent_width }
    }

    /// Render a whole tree to source text.
    pub fn print_tree(&self, tree: &SyntaxTree) -> String {
        self.print_node(&tree.root)
    }

    /// Render one node to text.  Statements and declarations render with indentation
    /// starting at column zero and a trailing newline; expressions render inline.
    pub fn print_node(&self, node: &SyntaxNode) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out, 0);
        out
    }

    fn write_indent(&self, out: &mut String, indent: usize) {
        for _ in 0..indent * self.indent_width {
            out.push(' ');
        }
    }

    fn write_modifiers(&self, modifiers: &[String], out: &mut String) {
        for modifier in modifiers {
            out.push_str(modifier);
            out.push(' ');
        }
    }

    fn write_node(&self, node: &SyntaxNode, out: &mut String, indent: usize) {
        match &node.kind {
            NodeKind::CompilationUnit { types } => {
                for (index, type_decl) in types.iter().enumerate() {
                    if index > 0 {
                        out.push('\n');
                    }
                    self.write_node(type_decl, out, indent);
                }
            }
            NodeKind::ClassDecl {
                modifiers,
                name,
                members,
            } => {
                self.write_indent(out, indent);
                self.write_modifiers(modifiers, out);
                out.push_str("class ");
                out.push_str(name);
                out.push_str(" {\n");
                for member in members {
                    self.write_node(member, out, indent + 1);
                }
                self.write_indent(out, indent);
                out.push_str("}\n");
            }
            NodeKind::EnumDecl {
                modifiers,
                name,
                constants,
                members,
            } => {
                self.write_indent(out, indent);
                self.write_modifiers(modifiers, out);
                out.push_str("enum ");
                out.push_str(name);
                out.push_str(" {\n");
                if !constants.is_empty() {
                    self.write_indent(out, indent + 1);
                    out.push_str(&constants.join(", "));
                    out.push_str(";\n");
                }
                for member in members {
                    self.write_node(member, out, indent + 1);
                }
                self.write_indent(out, indent);
                out.push_str("}\n");
            }
            NodeKind::AnnotationDecl {
                modifiers,
                name,
                members,
            } => {
                self.write_indent(out, indent);
                self.write_modifiers(modifiers, out);
                out.push_str("@interface ");
                out.push_str(name);
                out.push_str(" {\n");
                for member in members {
                    self.write_node(member, out, indent + 1);
                }
                self.write_indent(out, indent);
                out.push_str("}\n");
            }
            NodeKind::InitializerDecl { is_static, body } => {
                self.write_indent(out, indent);
                if *is_static {
                    out.push_str("static ");
                }
                self.write_brace_block(body, out, indent);
                out.push('\n');
            }
            NodeKind::FieldDecl {
                modifiers,
                type_name,
                name,
                initializer,
            } => {
                self.write_indent(out, indent);
                self.write_modifiers(modifiers, out);
                out.push_str(type_name);
                out.push(' ');
                out.push_str(name);
                if let Some(init) = initializer {
                    out.push_str(" = ");
                    self.write_expr(init, out, EXPR_TOP);
                }
                out.push_str(";\n");
            }
            NodeKind::MethodDecl {
                modifiers,
                return_type,
                name,
                parameters,
                body,
            } => {
                self.write_indent(out, indent);
                self.write_modifiers(modifiers, out);
                if !return_type.is_empty() {
                    out.push_str(return_type);
                    out.push(' ');
                }
                out.push_str(name);
                out.push('(');
                for (index, parameter) in parameters.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&parameter.type_name);
                    out.push(' ');
                    out.push_str(&parameter.name);
                }
                out.push(')');
                match body {
                    Some(body) => {
                        out.push(' ');
                        self.write_brace_block(body, out, indent);
                        out.push('\n');
                    }
                    None => out.push_str(";\n"),
                }
            }
            NodeKind::Block { .. } => {
                self.write_indent(out, indent);
                self.write_brace_block(node, out, indent);
                out.push('\n');
            }
            NodeKind::If { .. } => {
                self.write_if(node, out, indent, true);
                out.push('\n');
            }
            NodeKind::While { condition, body } => {
                self.write_indent(out, indent);
                out.push_str("while (");
                self.write_expr(condition, out, EXPR_TOP);
                out.push_str(") ");
                self.write_brace_block(body, out, indent);
                out.push('\n');
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                self.write_indent(out, indent);
                out.push_str("for (");
                if let Some(init) = init {
                    self.write_for_init(init, out);
                }
                out.push(';');
                if let Some(condition) = condition {
                    out.push(' ');
                    self.write_expr(condition, out, EXPR_TOP);
                }
                out.push(';');
                if let Some(update) = update {
                    out.push(' ');
                    self.write_expr(update, out, EXPR_TOP);
                }
                out.push_str(") ");
                self.write_brace_block(body, out, indent);
                out.push('\n');
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                self.write_indent(out, indent);
                out.push_str("try ");
                self.write_brace_block(body, out, indent);
                for catch in catches {
                    out.push(' ');
                    self.write_catch(catch, out, indent);
                }
                if let Some(finally) = finally {
                    out.push_str(" finally ");
                    self.write_brace_block(finally, out, indent);
                }
                out.push('\n');
            }
            NodeKind::CatchClause { .. } => {
                self.write_indent(out, indent);
                self.write_catch(node, out, indent);
                out.push('\n');
            }
            NodeKind::Return { value } => {
                self.write_indent(out, indent);
                out.push_str("return");
                if let Some(value) = value {
                    out.push(' ');
                    self.write_expr(value, out, EXPR_TOP);
                }
                out.push_str(";\n");
            }
            NodeKind::LocalDecl {
                type_name,
                name,
                initializer,
            } => {
                self.write_indent(out, indent);
                out.push_str(type_name);
                out.push(' ');
                out.push_str(name);
                if let Some(init) = initializer {
                    out.push_str(" = ");
                    self.write_expr(init, out, EXPR_TOP);
                }
                out.push_str(";\n");
            }
            NodeKind::ExprStmt { expression } => {
                self.write_indent(out, indent);
                self.write_expr(expression, out, EXPR_TOP);
                out.push_str(";\n");
            }
            _ => self.write_expr(node, out, EXPR_TOP),
        }
    }

    fn write_for_init(&self, init: &SyntaxNode, out: &mut String) {
        match &init.kind {
            NodeKind::LocalDecl {
                type_name,
                name,
                initializer,
            } => {
                out.push_str(type_name);
                out.push(' ');
                out.push_str(name);
                if let Some(init_expr) = initializer {
                    out.push_str(" = ");
                    self.write_expr(init_expr, out, EXPR_TOP);
                }
            }
            NodeKind::ExprStmt { expression } => self.write_expr(expression, out, EXPR_TOP),
            _ => self.write_expr(init, out, EXPR_TOP),
        }
    }

    /// Write `{ ... }` for a block without a leading indent or trailing newline, so the
    /// caller controls placement.
    fn write_brace_block(&self, block: &SyntaxNode, out: &mut String, indent: usize) {
        match &block.kind {
            NodeKind::Block { statements } => {
                out.push_str("{\n");
                for statement in statements {
                    self.write_node(statement, out, indent + 1);
                }
                self.write_indent(out, indent);
                out.push('}');
            }
            _ => {
                out.push_str("{\n");
                self.write_node(block, out, indent + 1);
                self.write_indent(out, indent);
                out.push('}');
            }
        }
    }

    fn write_if(&self, node: &SyntaxNode, out: &mut String, indent: usize, with_indent: bool) {
        if let NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } = &node.kind
        {
            if with_indent {
                self.write_indent(out, indent);
            }
            out.push_str("if (");
            self.write_expr(condition, out, EXPR_TOP);
            out.push_str(") ");
            self.write_brace_block(then_branch, out, indent);
            if let Some(else_branch) = else_branch {
                match &else_branch.kind {
                    NodeKind::If { .. } => {
                        out.push_str(" else ");
                        self.write_if(else_branch, out, indent, false);
                    }
                    _ => {
                        out.push_str(" else ");
                        self.write_brace_block(else_branch, out, indent);
                    }
                }
            }
        }
    }

    fn write_catch(&self, catch: &SyntaxNode, out: &mut String, indent: usize) {
        if let NodeKind::CatchClause {
            type_name,
            name,
            body,
        } = &catch.kind
        {
            out.push_str("catch (");
            out.push_str(type_name);
            out.push(' ');
            out.push_str(name);
            out.push_str(") ");
            self.write_brace_block(body, out, indent);
        }
    }

    fn expr_precedence(node: &SyntaxNode) -> u8 {
        match &node.kind {
            NodeKind::Assign { .. } => ASSIGN_PREC,
            NodeKind::Binary { operator, .. } => binary_print_precedence(operator),
            NodeKind::Unary { prefix, .. } => {
                if *prefix {
                    UNARY_PREC
                } else {
                    POSTFIX_PREC
                }
            }
            _ => PRIMARY_PREC,
        }
    }

    fn write_expr(&self, node: &SyntaxNode, out: &mut String, parent_precedence: u8) {
        let precedence = Self::expr_precedence(node);
        let parenthesize = precedence < parent_precedence;
        if parenthesize {
            out.push('(');
        }
        match &node.kind {
            NodeKind::Assign {
                target,
                operator,
                value,
            } => {
                self.write_expr(target, out, 1);
                out.push(' ');
                out.push_str(operator);
                out.push(' ');
                self.write_expr(value, out, ASSIGN_PREC);
            }
            NodeKind::Binary {
                operator,
                left,
                right,
            } => {
                self.write_expr(left, out, precedence);
                out.push(' ');
                out.push_str(operator);
                out.push(' ');
                self.write_expr(right, out, precedence + 1);
            }
            NodeKind::Unary {
                operator,
                operand,
                prefix,
            } => {
                if *prefix {
                    out.push_str(operator);
                    // Parenthesize a nested prefix expression so `-(-x)` never prints
                    // as the decrement token `--x`.
                    self.write_expr(operand, out, POSTFIX_PREC);
                } else {
                    self.write_expr(operand, out, POSTFIX_PREC);
                    out.push_str(operator);
                }
            }
            NodeKind::Call {
                receiver,
                name,
                arguments,
            } => {
                if let Some(receiver) = receiver {
                    self.write_expr(receiver, out, POSTFIX_PREC);
                    out.push('.');
                }
                out.push_str(name);
                out.push('(');
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_expr(argument, out, EXPR_TOP);
                }
                out.push(')');
            }
            NodeKind::FieldAccess { object, name } => {
                self.write_expr(object, out, POSTFIX_PREC);
                out.push('.');
                out.push_str(name);
            }
            NodeKind::Name { identifier } => out.push_str(identifier),
            NodeKind::IntLiteral { text, .. } => out.push_str(text),
            NodeKind::BoolLiteral { value } => {
                out.push_str(if *value { "true" } else { "false" })
            }
            NodeKind::StringLiteral { value } => {
                out.push('"');
                out.push_str(value);
                out.push('"');
            }
            NodeKind::CharLiteral { value } => {
                out.push('\'');
                out.push_str(value);
                out.push('\'');
            }
            NodeKind::NullLiteral => out.push_str("null"),
            _ => {
                // Statement-level node reached through an expression path; render it
                // through the statement writer.
                self.write_node(node, out, 0);
            }
        }
        if parenthesize {
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn reprint(source: &str) -> String {
        let printer = PrettyPrinter::new(4);
        printer.print_tree(&parse(source).unwrap())
    }

    #[test]
    fn test_print_simple_class() {
        let printed = reprint("class A { int x = 1; }");
        assert_eq!(printed, "class A {\n    int x = 1;\n}\n");
    }

    #[test]
    fn test_print_restores_grouping_parentheses() {
        let printed = reprint("class A { int x = (1 + 2) * 3; }");
        assert!(printed.contains("(1 + 2) * 3"));
    }

    #[test]
    fn test_print_drops_redundant_parentheses() {
        let printed = reprint("class A { int x = (1) + (2); }");
        assert!(printed.contains("1 + 2"));
    }

    #[test]
    fn test_print_if_else_chain() {
        let printed = reprint(
            "class A { void f(int x) { if (x > 0) g(); else if (x < 0) h(); else k(); } }",
        );
        assert!(printed.contains("if (x > 0) {"));
        assert!(printed.contains("} else if (x < 0) {"));
        assert!(printed.contains("} else {"));
    }

    #[test]
    fn test_print_is_a_fixpoint() {
        let sources = [
            "class A { int x = 1; void f() { while (x < 10) { x = x + 1; } } }",
            "enum Color { RED, GREEN; }",
            "class B { B(int v) { this.v = v; } int v; static { init(); } }",
            "class C { void g() { for (int i = 0; i < 3; i++) { sum += i; } } }",
            "class D { void h() { try { run(); } catch (Exception e) { log(e); } } }",
        ];
        let printer = PrettyPrinter::new(4);
        for source in sources.iter() {
            let once = printer.print_tree(&parse(source).unwrap());
            let twice = printer.print_tree(&parse(&once).unwrap());
            assert_eq!(once, twice, "printing is not stable for: {}", source);
        }
    }

    #[test]
    fn test_print_node_expression_is_inline() {
        let tree = parse("class A { int x = a + b * c; }").unwrap();
        let printer = PrettyPrinter::new(4);
        let field = &tree.root.children()[0].children()[0];
        let init = field.children()[0];
        assert_eq!(printer.print_node(init), "a + b * c");
    }

    #[test]
    fn test_print_prefix_unary_nesting() {
        let printed = reprint("class A { int x = -(-y); boolean b = !(!c); }");
        assert!(printed.contains("-(-y)"));
        assert!(printed.contains("!(!c)"));
    }
}
