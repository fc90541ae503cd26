use std::fmt::{self, Display, Formatter};

use log::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Defun,
    Name,
    Arguments,
    Lambd,
    If,
    Else,

    Integer(i64),
    Boolean(bool),
    Identifier(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    AndAnd,
    OrOr,

    EqualEqual,
    BangEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    Bang,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Colon,
    Dot,

    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Defun => "'Defun'",
            TokenKind::Name => "'name'",
            TokenKind::Arguments => "'arguments'",
            TokenKind::Lambd => "'Lambd'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Integer(_) => "integer literal",
            TokenKind::Boolean(_) => "boolean literal",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::EqualEqual => "'=='",
            TokenKind::BangEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::LessEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Bang => "'!'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{}", name)
    }
}

/// Scans `source` into a token sequence terminated by exactly one `Eof`.
///
/// Rule order is load-bearing: two-character operators are tried before
/// one-character operators, reserved words before the identifier rule, and
/// a `-` glued to a following digit lexes as a negative integer literal
/// before the minus operator.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let n = chars.len();
    let mut cursor = 0;
    let mut line = 1;
    let mut line_start = 0;
    let mut tokens = Vec::new();

    while cursor < n {
        let c = chars[cursor];

        if c == ' ' || c == '\t' || c == '\r' {
            cursor += 1;
            continue;
        }

        if c == '\n' {
            cursor += 1;
            line += 1;
            line_start = cursor;
            continue;
        }

        if c == '#' {
            while cursor < n && chars[cursor] != '\n' {
                cursor += 1;
            }
            continue;
        }

        let column = cursor - line_start;

        if cursor + 1 < n {
            let kind = match (c, chars[cursor + 1]) {
                ('&', '&') => Some(TokenKind::AndAnd),
                ('|', '|') => Some(TokenKind::OrOr),
                ('=', '=') => Some(TokenKind::EqualEqual),
                ('!', '=') => Some(TokenKind::BangEqual),
                ('<', '=') => Some(TokenKind::LessEqual),
                ('>', '=') => Some(TokenKind::GreaterEqual),
                _ => None,
            };

            if let Some(kind) = kind {
                tokens.push(Token { kind, line, column });
                cursor += 2;
                continue;
            }
        }

        let negative = c == '-' && cursor + 1 < n && chars[cursor + 1].is_ascii_digit();
        if c.is_ascii_digit() || negative {
            let start = cursor;
            cursor += 1;
            while cursor < n && chars[cursor].is_ascii_digit() {
                cursor += 1;
            }

            let literal: String = chars[start..cursor].iter().collect();
            tokens.push(Token {
                kind: TokenKind::Integer(literal.parse()?),
                line,
                column,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = cursor;
            cursor += 1;
            while cursor < n && (chars[cursor].is_ascii_alphanumeric() || chars[cursor] == '_') {
                cursor += 1;
            }

            let word: String = chars[start..cursor].iter().collect();
            let kind = match word.as_str() {
                "Defun" => TokenKind::Defun,
                "name" => TokenKind::Name,
                "arguments" => TokenKind::Arguments,
                "Lambd" => TokenKind::Lambd,
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                "True" => TokenKind::Boolean(true),
                "False" => TokenKind::Boolean(false),
                _ => TokenKind::Identifier(word),
            };

            tokens.push(Token { kind, line, column });
            continue;
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            _ => {
                debug!("unexpected character {:?} on line {}", c, line);
                return Err(Error::Lex { character: c, line });
            }
        };

        tokens.push(Token { kind, line, column });
        cursor += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line,
        column: n - line_start,
    });

    Ok(tokens)
}
