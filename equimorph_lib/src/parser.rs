//! The `parser` module contains the recursive-descent parser that turns source text into
//! a [`SyntaxTree`].
//!
//! The parser is deterministic: parsing the same text twice produces structurally
//! identical trees with identical positions and identical node ids.  Node ids are
//! assigned from a counter in parse order, which makes an id a stable structural
//! identifier for any two trees built from the same text.
//!
//! Two canonicalizations happen at parse time:
//!
//! * Non-block bodies of `if`, `while`, and `for` are wrapped in a synthetic block so
//!   that every statement body is a block.  An `else if` chain stays a chain.
//! * Parentheses used purely for grouping are dropped; operator precedence is restored
//!   by the pretty printer when the tree is rendered.

use crate::ast::{NodeKind, Parameter, SyntaxNode, SyntaxTree};
use crate::error::EquimorphError;
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse `source` into a syntax tree.
///
/// # Arguments
///
/// * `source` - The source text to parse.
pub fn parse(source: &str) -> Result<SyntaxTree, EquimorphError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        next_id: 1,
    };
    let root = parser.parse_compilation_unit()?;
    Ok(SyntaxTree::new(root, String::from(source)))
}

static MODIFIERS: [&str; 10] = [
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "transient",
    "volatile",
    "synchronized",
    "native",
];

static ASSIGNMENT_OPERATORS: [&str; 11] = [
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];

static PREFIX_OPERATORS: [&str; 6] = ["!", "~", "+", "-", "++", "--"];

/// Binary operator precedence, higher binds tighter.  Returns `None` for tokens that are
/// not binary operators.
fn binary_precedence(op: &str) -> Option<u8> {
    match op {
        "||" => Some(1),
        "&&" => Some(2),
        "|" => Some(3),
        "^" => Some(4),
        "&" => Some(5),
        "==" | "!=" => Some(6),
        "<" | ">" | "<=" | ">=" => Some(7),
        "<<" | ">>" => Some(8),
        "+" | "-" => Some(9),
        "*" | "/" | "%" => Some(10),
        _ => None,
    }
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    next_id: u64,
}

impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek(&self, ahead: usize) -> &Token {
        let index = (self.position + ahead).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn at_text(&self, text: &str) -> bool {
        self.current().text == text && self.current().kind != TokenKind::Eof
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn expect_text(&mut self, text: &str) -> Result<Token, EquimorphError> {
        if self.at_text(text) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(&format!(
                "expected '{}' but found '{}'",
                text,
                self.describe_current()
            )))
        }
    }

    fn expect_identifier(&mut self) -> Result<Token, EquimorphError> {
        if self.current().kind == TokenKind::Ident {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(&format!(
                "expected identifier but found '{}'",
                self.describe_current()
            )))
        }
    }

    fn describe_current(&self) -> String {
        if self.at_eof() {
            String::from("end of input")
        } else {
            self.current().text.clone()
        }
    }

    fn error_at_current(&self, message: &str) -> EquimorphError {
        let pos = self.current().pos;
        EquimorphError::Parse {
            line: pos.line,
            column: pos.column,
            message: String::from(message),
        }
    }

    fn make_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build a node spanning from the token at `start_index` through the last consumed
    /// token.
    fn node_from(&mut self, start_index: usize, kind: NodeKind) -> SyntaxNode {
        let start = &self.tokens[start_index];
        let end = &self.tokens[self.position.saturating_sub(1).max(start_index)];
        let span = end.offset + end.length - start.offset;
        let pos = start.pos;
        let id = self.make_id();
        SyntaxNode::new(id, pos, span, kind)
    }

    fn parse_compilation_unit(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        let mut types: Vec<SyntaxNode> = Vec::new();
        while !self.at_eof() {
            types.push(self.parse_type_declaration()?);
        }
        Ok(self.node_from(start, NodeKind::CompilationUnit { types }))
    }

    /// Collect declaration modifiers and annotation uses into one text list.
    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers: Vec<String> = Vec::new();
        loop {
            if self.current().kind == TokenKind::Ident
                && MODIFIERS.contains(&self.current().text.as_str())
            {
                // `static` immediately followed by a block is an initializer, not a
                // modifier; leave it for the member parser.
                if self.current().text == "static" && self.peek(1).text == "{" {
                    break;
                }
                modifiers.push(self.advance().text);
                continue;
            }
            if self.at_text("@") && self.peek(1).text != "interface" {
                self.advance();
                if let Ok(name) = self.expect_identifier() {
                    modifiers.push(format!("@{}", name.text));
                }
                continue;
            }
            break;
        }
        modifiers
    }

    fn parse_type_declaration(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        let modifiers = self.parse_modifiers();

        if self.at_text("@") && self.peek(1).text == "interface" {
            self.advance();
            self.advance();
            let name = self.expect_identifier()?.text;
            self.expect_text("{")?;
            let mut members: Vec<SyntaxNode> = Vec::new();
            while !self.at_text("}") && !self.at_eof() {
                members.push(self.parse_member()?);
            }
            self.expect_text("}")?;
            return Ok(self.node_from(
                start,
                NodeKind::AnnotationDecl {
                    modifiers,
                    name,
                    members,
                },
            ));
        }

        if self.at_text("class") {
            self.advance();
            let name = self.expect_identifier()?.text;
            self.expect_text("{")?;
            let mut members: Vec<SyntaxNode> = Vec::new();
            while !self.at_text("}") && !self.at_eof() {
                members.push(self.parse_member()?);
            }
            self.expect_text("}")?;
            return Ok(self.node_from(
                start,
                NodeKind::ClassDecl {
                    modifiers,
                    name,
                    members,
                },
            ));
        }

        if self.at_text("enum") {
            self.advance();
            let name = self.expect_identifier()?.text;
            self.expect_text("{")?;
            let mut constants: Vec<String> = Vec::new();
            while self.current().kind == TokenKind::Ident {
                let next = self.peek(1).text.clone();
                if next == "," || next == ";" || next == "}" {
                    constants.push(self.advance().text);
                    if self.at_text(",") {
                        self.advance();
                    }
                } else {
                    break;
                }
            }
            if self.at_text(";") {
                self.advance();
            }
            let mut members: Vec<SyntaxNode> = Vec::new();
            while !self.at_text("}") && !self.at_eof() {
                members.push(self.parse_member()?);
            }
            self.expect_text("}")?;
            return Ok(self.node_from(
                start,
                NodeKind::EnumDecl {
                    modifiers,
                    name,
                    constants,
                    members,
                },
            ));
        }

        Err(self.error_at_current(&format!(
            "expected type declaration but found '{}'",
            self.describe_current()
        )))
    }

    fn parse_member(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;

        if self.at_text("static") && self.peek(1).text == "{" {
            self.advance();
            let body = self.parse_block()?;
            return Ok(self.node_from(
                start,
                NodeKind::InitializerDecl {
                    is_static: true,
                    body: Box::new(body),
                },
            ));
        }

        if self.at_text("{") {
            let body = self.parse_block()?;
            return Ok(self.node_from(
                start,
                NodeKind::InitializerDecl {
                    is_static: false,
                    body: Box::new(body),
                },
            ));
        }

        let modifiers = self.parse_modifiers();

        // Constructor: an identifier directly followed by a parameter list.
        if self.current().kind == TokenKind::Ident && self.peek(1).text == "(" {
            let name = self.advance().text;
            let parameters = self.parse_parameters()?;
            let body = if self.at_text("{") {
                Some(Box::new(self.parse_block()?))
            } else {
                self.expect_text(";")?;
                None
            };
            return Ok(self.node_from(
                start,
                NodeKind::MethodDecl {
                    modifiers,
                    return_type: String::new(),
                    name,
                    parameters,
                    body,
                },
            ));
        }

        let type_name = self.parse_type_name()?;
        let name = self.expect_identifier()?.text;

        if self.at_text("(") {
            let parameters = self.parse_parameters()?;
            let body = if self.at_text("{") {
                Some(Box::new(self.parse_block()?))
            } else {
                self.expect_text(";")?;
                None
            };
            return Ok(self.node_from(
                start,
                NodeKind::MethodDecl {
                    modifiers,
                    return_type: type_name,
                    name,
                    parameters,
                    body,
                },
            ));
        }

        let initializer = if self.at_text("=") {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect_text(";")?;
        Ok(self.node_from(
            start,
            NodeKind::FieldDecl {
                modifiers,
                type_name,
                name,
                initializer,
            },
        ))
    }

    /// Parse a (possibly qualified, possibly array) type name into its textual form.
    fn parse_type_name(&mut self) -> Result<String, EquimorphError> {
        let mut name = self.expect_identifier()?.text;
        while self.at_text(".") && self.peek(1).kind == TokenKind::Ident {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_identifier()?.text);
        }
        while self.at_text("[") && self.peek(1).text == "]" {
            self.advance();
            self.advance();
            name.push_str("[]");
        }
        Ok(name)
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, EquimorphError> {
        self.expect_text("(")?;
        let mut parameters: Vec<Parameter> = Vec::new();
        if !self.at_text(")") {
            loop {
                let type_name = self.parse_type_name()?;
                let name = self.expect_identifier()?.text;
                parameters.push(Parameter { type_name, name });
                if self.at_text(",") {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_text(")")?;
        Ok(parameters)
    }

    fn parse_block(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        self.expect_text("{")?;
        let mut statements: Vec<SyntaxNode> = Vec::new();
        while !self.at_text("}") && !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        self.expect_text("}")?;
        Ok(self.node_from(start, NodeKind::Block { statements }))
    }

    /// Parse a statement and wrap it in a synthetic block unless it already is one.
    fn parse_statement_as_block(&mut self) -> Result<SyntaxNode, EquimorphError> {
        if self.at_text("{") {
            return self.parse_block();
        }
        let statement = self.parse_statement()?;
        let pos = statement.pos;
        let span = statement.span;
        let id = self.make_id();
        Ok(SyntaxNode::new(
            id,
            pos,
            span,
            NodeKind::Block {
                statements: vec![statement],
            },
        ))
    }

    fn parse_statement(&mut self) -> Result<SyntaxNode, EquimorphError> {
        if self.at_text("{") {
            return self.parse_block();
        }
        if self.at_text("if") {
            return self.parse_if();
        }
        if self.at_text("while") {
            let start = self.position;
            self.advance();
            self.expect_text("(")?;
            let condition = self.parse_expression()?;
            self.expect_text(")")?;
            let body = self.parse_statement_as_block()?;
            return Ok(self.node_from(
                start,
                NodeKind::While {
                    condition: Box::new(condition),
                    body: Box::new(body),
                },
            ));
        }
        if self.at_text("for") {
            return self.parse_for();
        }
        if self.at_text("try") {
            return self.parse_try();
        }
        if self.at_text("return") {
            let start = self.position;
            self.advance();
            let value = if self.at_text(";") {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            self.expect_text(";")?;
            return Ok(self.node_from(start, NodeKind::Return { value }));
        }

        if self.looks_like_local_declaration() {
            let start = self.position;
            let (type_name, name, initializer) = self.parse_local_declaration_core()?;
            self.expect_text(";")?;
            return Ok(self.node_from(
                start,
                NodeKind::LocalDecl {
                    type_name,
                    name,
                    initializer,
                },
            ));
        }

        let start = self.position;
        let expression = self.parse_expression()?;
        self.expect_text(";")?;
        Ok(self.node_from(
            start,
            NodeKind::ExprStmt {
                expression: Box::new(expression),
            },
        ))
    }

    fn parse_if(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        self.expect_text("if")?;
        self.expect_text("(")?;
        let condition = self.parse_expression()?;
        self.expect_text(")")?;
        let then_branch = self.parse_statement_as_block()?;
        let else_branch = if self.at_text("else") {
            self.advance();
            if self.at_text("if") {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_statement_as_block()?))
            }
        } else {
            None
        };
        Ok(self.node_from(
            start,
            NodeKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch,
            },
        ))
    }

    fn parse_for(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        self.expect_text("for")?;
        self.expect_text("(")?;

        let init = if self.at_text(";") {
            None
        } else if self.looks_like_local_declaration() {
            let init_start = self.position;
            let (type_name, name, initializer) = self.parse_local_declaration_core()?;
            Some(Box::new(self.node_from(
                init_start,
                NodeKind::LocalDecl {
                    type_name,
                    name,
                    initializer,
                },
            )))
        } else {
            let init_start = self.position;
            let expression = self.parse_expression()?;
            Some(Box::new(self.node_from(
                init_start,
                NodeKind::ExprStmt {
                    expression: Box::new(expression),
                },
            )))
        };
        self.expect_text(";")?;

        let condition = if self.at_text(";") {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_text(";")?;

        let update = if self.at_text(")") {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_text(")")?;

        let body = self.parse_statement_as_block()?;
        Ok(self.node_from(
            start,
            NodeKind::For {
                init,
                condition,
                update,
                body: Box::new(body),
            },
        ))
    }

    fn parse_try(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        self.expect_text("try")?;
        let body = self.parse_block()?;
        let mut catches: Vec<SyntaxNode> = Vec::new();
        while self.at_text("catch") {
            let catch_start = self.position;
            self.advance();
            self.expect_text("(")?;
            let type_name = self.parse_type_name()?;
            let name = self.expect_identifier()?.text;
            self.expect_text(")")?;
            let catch_body = self.parse_block()?;
            catches.push(self.node_from(
                catch_start,
                NodeKind::CatchClause {
                    type_name,
                    name,
                    body: Box::new(catch_body),
                },
            ));
        }
        let finally = if self.at_text("finally") {
            self.advance();
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return Err(self.error_at_current("try statement requires a catch or finally clause"));
        }
        Ok(self.node_from(
            start,
            NodeKind::Try {
                body: Box::new(body),
                catches,
                finally,
            },
        ))
    }

    /// Lookahead test: `Type name ...` where `Type` is a possibly qualified, possibly
    /// array type name.
    fn looks_like_local_declaration(&self) -> bool {
        if self.current().kind != TokenKind::Ident {
            return false;
        }
        let mut index = 1;
        while self.peek(index).text == "." && self.peek(index + 1).kind == TokenKind::Ident {
            index += 2;
        }
        while self.peek(index).text == "[" && self.peek(index + 1).text == "]" {
            index += 2;
        }
        self.peek(index).kind == TokenKind::Ident
    }

    fn parse_local_declaration_core(
        &mut self,
    ) -> Result<(String, String, Option<Box<SyntaxNode>>), EquimorphError> {
        let type_name = self.parse_type_name()?;
        let name = self.expect_identifier()?.text;
        let initializer = if self.at_text("=") {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok((type_name, name, initializer))
    }

    fn parse_expression(&mut self) -> Result<SyntaxNode, EquimorphError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        let target = self.parse_binary(1)?;
        if self.current().kind == TokenKind::Sym
            && ASSIGNMENT_OPERATORS.contains(&self.current().text.as_str())
        {
            let operator = self.advance().text;
            let value = self.parse_assignment()?;
            return Ok(self.node_from(
                start,
                NodeKind::Assign {
                    target: Box::new(target),
                    operator,
                    value: Box::new(value),
                },
            ));
        }
        Ok(target)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        let mut left = self.parse_unary()?;
        loop {
            let operator = self.current().text.clone();
            let precedence = if self.current().kind == TokenKind::Sym {
                binary_precedence(&operator)
            } else {
                None
            };
            let precedence = match precedence {
                Some(p) if p >= min_precedence => p,
                _ => break,
            };
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = self.node_from(
                start,
                NodeKind::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        if self.current().kind == TokenKind::Sym
            && PREFIX_OPERATORS.contains(&self.current().text.as_str())
        {
            let operator = self.advance().text;
            let operand = self.parse_unary()?;
            return Ok(self.node_from(
                start,
                NodeKind::Unary {
                    operator,
                    operand: Box::new(operand),
                    prefix: true,
                },
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;
        let mut expression = self.parse_primary()?;
        loop {
            if self.at_text(".") && self.peek(1).kind == TokenKind::Ident {
                self.advance();
                let name = self.expect_identifier()?.text;
                if self.at_text("(") {
                    let arguments = self.parse_arguments()?;
                    expression = self.node_from(
                        start,
                        NodeKind::Call {
                            receiver: Some(Box::new(expression)),
                            name,
                            arguments,
                        },
                    );
                } else {
                    expression = self.node_from(
                        start,
                        NodeKind::FieldAccess {
                            object: Box::new(expression),
                            name,
                        },
                    );
                }
                continue;
            }
            if self.at_text("(") {
                if let NodeKind::Name { identifier } = &expression.kind {
                    let name = identifier.clone();
                    let arguments = self.parse_arguments()?;
                    expression = self.node_from(
                        start,
                        NodeKind::Call {
                            receiver: None,
                            name,
                            arguments,
                        },
                    );
                    continue;
                }
                break;
            }
            if self.current().kind == TokenKind::Sym
                && (self.at_text("++") || self.at_text("--"))
            {
                let operator = self.advance().text;
                expression = self.node_from(
                    start,
                    NodeKind::Unary {
                        operator,
                        operand: Box::new(expression),
                        prefix: false,
                    },
                );
                continue;
            }
            break;
        }
        Ok(expression)
    }

    fn parse_arguments(&mut self) -> Result<Vec<SyntaxNode>, EquimorphError> {
        self.expect_text("(")?;
        let mut arguments: Vec<SyntaxNode> = Vec::new();
        if !self.at_text(")") {
            loop {
                arguments.push(self.parse_expression()?);
                if self.at_text(",") {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_text(")")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<SyntaxNode, EquimorphError> {
        let start = self.position;

        if self.at_text("(") {
            self.advance();
            let expression = self.parse_expression()?;
            self.expect_text(")")?;
            return Ok(expression);
        }

        match self.current().kind {
            TokenKind::Int => {
                let token = self.advance();
                let parsed = if let Some(hex) = token.text.strip_prefix("0x") {
                    i64::from_str_radix(hex, 16)
                } else {
                    token.text.parse::<i64>()
                };
                let value = match parsed {
                    Ok(value) => value,
                    Err(_) => {
                        return Err(EquimorphError::Parse {
                            line: token.pos.line,
                            column: token.pos.column,
                            message: format!("integer literal '{}' out of range", token.text),
                        })
                    }
                };
                return Ok(self.node_from(
                    start,
                    NodeKind::IntLiteral {
                        value,
                        text: token.text,
                    },
                ));
            }
            TokenKind::Str => {
                let token = self.advance();
                return Ok(self.node_from(start, NodeKind::StringLiteral { value: token.text }));
            }
            TokenKind::Char => {
                let token = self.advance();
                return Ok(self.node_from(start, NodeKind::CharLiteral { value: token.text }));
            }
            _ => {}
        }

        if self.at_text("true") || self.at_text("false") {
            let token = self.advance();
            return Ok(self.node_from(
                start,
                NodeKind::BoolLiteral {
                    value: token.text == "true",
                },
            ));
        }
        if self.at_text("null") {
            self.advance();
            return Ok(self.node_from(start, NodeKind::NullLiteral));
        }
        if self.at_text("new") {
            self.advance();
            let type_name = self.parse_type_name()?;
            let arguments = self.parse_arguments()?;
            return Ok(self.node_from(
                start,
                NodeKind::Call {
                    receiver: None,
                    name: format!("new {}", type_name),
                    arguments,
                },
            ));
        }
        if self.current().kind == TokenKind::Ident {
            let token = self.advance();
            return Ok(self.node_from(
                start,
                NodeKind::Name {
                    identifier: token.text,
                },
            ));
        }

        Err(self.error_at_current(&format!(
            "expected expression but found '{}'",
            self.describe_current()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeTag;

    static SAMPLE: &str = "class Account {\n\
        int balance = 0;\n\
        void deposit(int amount) {\n\
            if (amount > 0) {\n\
                balance = balance + amount;\n\
            }\n\
        }\n\
    }\n";

    #[test]
    fn test_parse_simple_class() {
        let tree = parse(SAMPLE).unwrap();
        if let NodeKind::CompilationUnit { types } = &tree.root.kind {
            assert_eq!(types.len(), 1);
            if let NodeKind::ClassDecl { name, members, .. } = &types[0].kind {
                assert_eq!(name, "Account");
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].tag(), NodeTag::FieldDecl);
                assert_eq!(members[1].tag(), NodeTag::MethodDecl);
            } else {
                panic!("expected a class declaration");
            }
        } else {
            panic!("expected a compilation unit");
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse(SAMPLE).unwrap();
        let second = parse(SAMPLE).unwrap();
        assert_eq!(first.root, second.root);
    }

    #[test]
    fn test_parse_positions() {
        let tree = parse(SAMPLE).unwrap();
        let positions: Vec<u32> = tree
            .root
            .preorder()
            .iter()
            .filter(|n| n.tag() == NodeTag::FieldDecl)
            .map(|n| n.pos.line)
            .collect();
        assert_eq!(positions, vec![2]);
    }

    #[test]
    fn test_parse_wraps_non_block_bodies() {
        let tree = parse("class A { void f() { if (true) g(); } }").unwrap();
        let ifs: Vec<&SyntaxNode> = tree
            .root
            .preorder()
            .into_iter()
            .filter(|n| n.tag() == NodeTag::If)
            .collect();
        assert_eq!(ifs.len(), 1);
        if let NodeKind::If { then_branch, .. } = &ifs[0].kind {
            assert_eq!(then_branch.tag(), NodeTag::Block);
        } else {
            panic!("expected an if statement");
        }
    }

    #[test]
    fn test_parse_else_if_chain_stays_a_chain() {
        let tree =
            parse("class A { void f(int x) { if (x > 0) { g(); } else if (x < 0) { h(); } } }")
                .unwrap();
        let ifs: Vec<&SyntaxNode> = tree
            .root
            .preorder()
            .into_iter()
            .filter(|n| n.tag() == NodeTag::If)
            .collect();
        assert_eq!(ifs.len(), 2);
        if let NodeKind::If { else_branch, .. } = &ifs[0].kind {
            assert_eq!(else_branch.as_ref().unwrap().tag(), NodeTag::If);
        } else {
            panic!("expected an if statement");
        }
    }

    #[test]
    fn test_parse_operator_precedence() {
        let tree = parse("class A { int x = 1 + 2 * 3; }").unwrap();
        let binaries: Vec<&SyntaxNode> = tree
            .root
            .preorder()
            .into_iter()
            .filter(|n| n.tag() == NodeTag::Binary)
            .collect();
        if let NodeKind::Binary { operator, right, .. } = &binaries[0].kind {
            assert_eq!(operator, "+");
            assert_eq!(right.tag(), NodeTag::Binary);
        } else {
            panic!("expected a binary expression");
        }
    }

    #[test]
    fn test_parse_grouping_parentheses_are_dropped() {
        let grouped = parse("class A { int x = (1 + 2) * 3; }").unwrap();
        let binaries: Vec<NodeTag> = grouped
            .root
            .preorder()
            .into_iter()
            .filter(|n| n.tag() == NodeTag::Binary)
            .map(|n| n.tag())
            .collect();
        assert_eq!(binaries.len(), 2);
        if let Some(top) = grouped
            .root
            .preorder()
            .into_iter()
            .find(|n| n.tag() == NodeTag::Binary)
        {
            if let NodeKind::Binary { operator, .. } = &top.kind {
                assert_eq!(operator, "*");
            }
        }
    }

    #[test]
    fn test_parse_enum_and_initializer() {
        let tree = parse("enum Color { RED, GREEN; int code = 0; } class A { static { setup(); } }")
            .unwrap();
        let tags: Vec<NodeTag> = tree.root.children().iter().map(|n| n.tag()).collect();
        assert_eq!(tags, vec![NodeTag::EnumDecl, NodeTag::ClassDecl]);
        if let NodeKind::EnumDecl { constants, members, .. } = &tree.root.children()[0].kind {
            assert_eq!(constants, &vec![String::from("RED"), String::from("GREEN")]);
            assert_eq!(members.len(), 1);
        }
    }

    #[test]
    fn test_parse_try_catch_and_calls() {
        let tree = parse(
            "class A { void f() { try { obj.run(1, 2); } catch (Exception e) { log(e); } finally { done(); } } }",
        )
        .unwrap();
        let tags: Vec<NodeTag> = tree
            .root
            .preorder()
            .into_iter()
            .map(|n| n.tag())
            .filter(|t| matches!(t, NodeTag::Try | NodeTag::CatchClause | NodeTag::Call))
            .collect();
        assert_eq!(
            tags,
            vec![
                NodeTag::Try,
                NodeTag::Call,
                NodeTag::CatchClause,
                NodeTag::Call,
                NodeTag::Call
            ]
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range_integer_literal() {
        let result = parse("class A { int x = 99999999999999999999; }");
        match result {
            Err(EquimorphError::Parse { message, .. }) => {
                assert!(message.contains("out of range"));
            }
            _ => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_parse_error_reports_position() {
        let result = parse("class A { void f() { if } }");
        match result {
            Err(EquimorphError::Parse { line, .. }) => assert_eq!(line, 1),
            _ => panic!("expected a parse error"),
        }
    }
}
