use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    StyledText, ValidationResult, Validator,
};
use std::borrow::Cow;

use crate::tokenizer::{tokenize, TokenKind};

#[derive(Clone)]
pub struct REPLPrompt;

impl Prompt for REPLPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("rlambd")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("  ... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

pub struct REPLValidator;

impl Validator for REPLValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        if line.trim_end().is_empty() {
            return ValidationResult::Complete;
        }

        let mut delimiters = Vec::new();
        let mut in_comment = false;

        for c in line.chars() {
            match c {
                '\n' => in_comment = false,
                '#' => in_comment = true,
                _ if in_comment => continue,

                '{' | '(' => delimiters.push(c),
                '}' => {
                    if delimiters.pop() != Some('{') {
                        return ValidationResult::Complete;
                    }
                }
                ')' => {
                    if delimiters.pop() != Some('(') {
                        return ValidationResult::Complete;
                    }
                }

                _ => {}
            }
        }

        if delimiters.is_empty() {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}

pub static KEYWORD_COLOR: Color = Color::LightBlue;
pub static LITERAL_COLOR: Color = Color::Yellow;
pub static DEFAULT_COLOR: Color = Color::White;
pub static OPERATOR_COLOR: Color = Color::DarkGray;

pub struct SyntaxHighlighter;

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        let tokens = match tokenize(line) {
            Ok(t) => t,
            Err(_) => {
                styled_text.push((Style::new().fg(DEFAULT_COLOR), line.to_string()));
                return styled_text;
            }
        };

        let mut remaining = line;

        for token in tokens {
            if token.kind == TokenKind::Eof {
                break;
            }

            let token_str = match &token.kind {
                TokenKind::Defun => "Defun".to_string(),
                TokenKind::Name => "name".to_string(),
                TokenKind::Arguments => "arguments".to_string(),
                TokenKind::Lambd => "Lambd".to_string(),
                TokenKind::If => "if".to_string(),
                TokenKind::Else => "else".to_string(),
                TokenKind::Integer(n) => n.to_string(),
                TokenKind::Boolean(true) => "True".to_string(),
                TokenKind::Boolean(false) => "False".to_string(),
                TokenKind::Identifier(s) => s.clone(),
                TokenKind::Plus => "+".to_string(),
                TokenKind::Minus => "-".to_string(),
                TokenKind::Star => "*".to_string(),
                TokenKind::Slash => "/".to_string(),
                TokenKind::Percent => "%".to_string(),
                TokenKind::AndAnd => "&&".to_string(),
                TokenKind::OrOr => "||".to_string(),
                TokenKind::EqualEqual => "==".to_string(),
                TokenKind::BangEqual => "!=".to_string(),
                TokenKind::Less => "<".to_string(),
                TokenKind::Greater => ">".to_string(),
                TokenKind::LessEqual => "<=".to_string(),
                TokenKind::GreaterEqual => ">=".to_string(),
                TokenKind::Bang => "!".to_string(),
                TokenKind::LeftParen => "(".to_string(),
                TokenKind::RightParen => ")".to_string(),
                TokenKind::LeftBrace => "{".to_string(),
                TokenKind::RightBrace => "}".to_string(),
                TokenKind::Comma => ",".to_string(),
                TokenKind::Colon => ":".to_string(),
                TokenKind::Dot => ".".to_string(),
                TokenKind::Eof => "".to_string(),
            };

            if let Some(pos) = remaining.find(&token_str) {
                if pos > 0 {
                    styled_text
                        .push((Style::new().fg(DEFAULT_COLOR), remaining[..pos].to_string()));
                }

                let color = match &token.kind {
                    TokenKind::Defun
                    | TokenKind::Name
                    | TokenKind::Arguments
                    | TokenKind::Lambd
                    | TokenKind::If
                    | TokenKind::Else => KEYWORD_COLOR,
                    TokenKind::Integer(_) | TokenKind::Boolean(_) => LITERAL_COLOR,
                    TokenKind::Identifier(_) => DEFAULT_COLOR,
                    _ => OPERATOR_COLOR,
                };

                styled_text.push((Style::new().fg(color), token_str.clone()));
                remaining = &remaining[pos + token_str.len()..];
            }
        }

        if !remaining.is_empty() {
            styled_text.push((Style::new().fg(DEFAULT_COLOR), remaining.to_string()));
        }

        styled_text
    }
}
