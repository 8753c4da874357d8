//! The `lexer` module contains the scanner that turns source text into a token stream
//! for the parser.  Tokens carry 1-based line/column positions and byte offsets so the
//! parser can compute node positions and spans.

use crate::ast::Position;
use crate::error::EquimorphError;

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier or keyword.  The parser distinguishes keywords by text.
    Ident,
    /// An integer literal, decimal or `0x`-prefixed hexadecimal.
    Int,
    /// A string literal.  The token text is the raw inner text without the quotes.
    Str,
    /// A character literal.  The token text is the raw inner text without the quotes.
    Char,
    /// An operator or punctuation symbol.
    Sym,
    /// End of input.
    Eof,
}

/// One scanned token.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Position,
    /// Byte offset of the token's first character in the source text.
    pub offset: usize,
    /// Byte length of the token's source extent, including any quotes.
    pub length: usize,
}

/// Multi-character symbols, longest first so that maximal munch works by scanning the
/// table in order.
static MULTI_CHAR_SYMBOLS: [&str; 21] = [
    "<<=", ">>=", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "<<", ">>", "->",
];

static SINGLE_CHAR_SYMBOLS: &str = "+-*/%<>=!&|^~(){}[];,.@?:";

/// Scan `source` into a token vector terminated by an [`TokenKind::Eof`] token.
///
/// # Arguments
///
/// * `source` - The source text to scan.
pub fn tokenize(source: &str) -> Result<Vec<Token>, EquimorphError> {
    let bytes = source.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut offset: usize = 0;
    let mut line: u32 = 1;
    let mut column: u32 = 1;

    while offset < bytes.len() {
        let c = bytes[offset] as char;

        if c == '\n' {
            offset += 1;
            line += 1;
            column = 1;
            continue;
        }
        if c.is_whitespace() {
            offset += 1;
            column += 1;
            continue;
        }

        // Line comment.
        if c == '/' && offset + 1 < bytes.len() && bytes[offset + 1] as char == '/' {
            while offset < bytes.len() && bytes[offset] as char != '\n' {
                offset += 1;
            }
            continue;
        }

        // Block comment.
        if c == '/' && offset + 1 < bytes.len() && bytes[offset + 1] as char == '*' {
            let comment_pos = Position::new(line, column);
            offset += 2;
            column += 2;
            let mut closed = false;
            while offset + 1 < bytes.len() {
                if bytes[offset] as char == '*' && bytes[offset + 1] as char == '/' {
                    offset += 2;
                    column += 2;
                    closed = true;
                    break;
                }
                if bytes[offset] as char == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
                offset += 1;
            }
            if !closed {
                return Err(EquimorphError::Parse {
                    line: comment_pos.line,
                    column: comment_pos.column,
                    message: String::from("unterminated block comment"),
                });
            }
            continue;
        }

        let token_pos = Position::new(line, column);
        let start = offset;

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            while offset < bytes.len() {
                let c = bytes[offset] as char;
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    offset += 1;
                } else {
                    break;
                }
            }
            let text = String::from(&source[start..offset]);
            column += (offset - start) as u32;
            tokens.push(Token {
                kind: TokenKind::Ident,
                text,
                pos: token_pos,
                offset: start,
                length: offset - start,
            });
            continue;
        }

        if c.is_ascii_digit() {
            if c == '0' && offset + 1 < bytes.len() && (bytes[offset + 1] as char) == 'x' {
                offset += 2;
                while offset < bytes.len() && (bytes[offset] as char).is_ascii_hexdigit() {
                    offset += 1;
                }
            } else {
                while offset < bytes.len() && (bytes[offset] as char).is_ascii_digit() {
                    offset += 1;
                }
            }
            let text = String::from(&source[start..offset]);
            column += (offset - start) as u32;
            tokens.push(Token {
                kind: TokenKind::Int,
                text,
                pos: token_pos,
                offset: start,
                length: offset - start,
            });
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            offset += 1;
            let inner_start = offset;
            let mut closed = false;
            while offset < bytes.len() {
                let c = bytes[offset] as char;
                if c == '\\' && offset + 1 < bytes.len() {
                    offset += 2;
                    continue;
                }
                if c == quote {
                    closed = true;
                    break;
                }
                if c == '\n' {
                    break;
                }
                offset += 1;
            }
            if !closed {
                return Err(EquimorphError::Parse {
                    line: token_pos.line,
                    column: token_pos.column,
                    message: format!("unterminated {} literal", if quote == '"' { "string" } else { "character" }),
                });
            }
            let text = String::from(&source[inner_start..offset]);
            offset += 1;
            column += (offset - start) as u32;
            tokens.push(Token {
                kind: if quote == '"' {
                    TokenKind::Str
                } else {
                    TokenKind::Char
                },
                text,
                pos: token_pos,
                offset: start,
                length: offset - start,
            });
            continue;
        }

        let rest = &source[offset..];
        let mut matched: Option<&str> = None;
        for symbol in MULTI_CHAR_SYMBOLS.iter() {
            if rest.starts_with(symbol) {
                matched = Some(symbol);
                break;
            }
        }
        if let Some(symbol) = matched {
            offset += symbol.len();
            column += symbol.len() as u32;
            tokens.push(Token {
                kind: TokenKind::Sym,
                text: String::from(symbol),
                pos: token_pos,
                offset: start,
                length: symbol.len(),
            });
            continue;
        }

        if SINGLE_CHAR_SYMBOLS.contains(c) {
            offset += 1;
            column += 1;
            tokens.push(Token {
                kind: TokenKind::Sym,
                text: c.to_string(),
                pos: token_pos,
                offset: start,
                length: 1,
            });
            continue;
        }

        return Err(EquimorphError::Parse {
            line,
            column,
            message: format!("unexpected character '{}'", c),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        pos: Position::new(line, column),
        offset: bytes.len(),
        length: 0,
    });

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_identifiers_and_symbols() {
        let tokens = tokenize("int a = b + 1;").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["int", "a", "=", "b", "+", "1", ";", ""]);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[5].kind, TokenKind::Int);
        assert_eq!(tokens[7].kind, TokenKind::Eof);
    }

    #[test]
    fn test_tokenize_positions_are_one_based() {
        let tokens = tokenize("a\n  b").unwrap();
        assert_eq!(tokens[0].pos, Position::new(1, 1));
        assert_eq!(tokens[1].pos, Position::new(2, 3));
    }

    #[test]
    fn test_tokenize_multi_char_operators() {
        let tokens = tokenize("a <= b && c != d").unwrap();
        let symbols: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Sym)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(symbols, vec!["<=", "&&", "!="]);
    }

    #[test]
    fn test_tokenize_skips_comments() {
        let tokens = tokenize("a // comment\n/* block\ncomment */ b").unwrap();
        let texts: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(tokens[1].pos.line, 3);
    }

    #[test]
    fn test_tokenize_string_and_char_literals() {
        let tokens = tokenize("\"hi\\\"there\" 'x'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "hi\\\"there");
        assert_eq!(tokens[1].kind, TokenKind::Char);
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_tokenize_unterminated_string_fails() {
        assert!(tokenize("\"abc").is_err());
    }

    #[test]
    fn test_tokenize_offsets_and_lengths() {
        let tokens = tokenize("ab + cd").unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[0].length, 2);
        assert_eq!(tokens[2].offset, 5);
        assert_eq!(tokens[2].length, 2);
    }
}
