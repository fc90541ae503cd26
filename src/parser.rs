use std::fmt::{self, Display, Formatter};

use crate::{
    error::{Error, Result},
    tokenizer::{Token, TokenKind},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Identifier(String),
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Lambda {
        parameter: String,
        body: Box<Expr>,
    },
    FuncDef {
        name: String,
        parameters: Vec<String>,
        body: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

fn syntax_error<T>(expected: &str, token: &Token) -> Result<T> {
    Err(Error::Syntax {
        line: token.line,
        column: token.column,
        expected: expected.to_string(),
        found: token.kind.to_string(),
    })
}

fn expect(token: &Token, kind: &TokenKind) -> Result<()> {
    if &token.kind == kind {
        Ok(())
    } else {
        syntax_error(&kind.to_string(), token)
    }
}

/// Parses the token sequence into an ordered list of top-level statements.
///
/// Fail-fast: the first unexpected token aborts the whole parse, there is
/// no recovery and no partial result.
pub fn parse(tokens: &[Token]) -> Result<Vec<Expr>> {
    assert!(
        tokens.last().map_or(false, |t| t.kind == TokenKind::Eof),
        "Token slice must be terminated by Eof"
    );

    let mut consumed = 0;
    let mut program = Vec::new();

    while tokens[consumed].kind != TokenKind::Eof {
        let (statement, statement_consumed) = parse_statement(&tokens[consumed..])?;
        program.push(statement);
        consumed += statement_consumed;
    }

    Ok(program)
}

fn parse_statement(tokens: &[Token]) -> Result<(Expr, usize)> {
    match &tokens[0].kind {
        TokenKind::Defun => parse_function_def(tokens),
        TokenKind::If => parse_if(tokens),
        TokenKind::LeftParen if tokens[1].kind == TokenKind::Lambd => parse_lambda(tokens),
        _ => parse_expression(tokens),
    }
}

// One precedence tier, strictly left-associative
fn parse_expression(tokens: &[Token]) -> Result<(Expr, usize)> {
    let (mut left, mut consumed) = parse_term(tokens)?;

    while let Some(operator) = binary_operator(&tokens[consumed].kind) {
        consumed += 1;
        let (right, right_consumed) = parse_term(&tokens[consumed..])?;
        consumed += right_consumed;

        left = Expr::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        };
    }

    Ok((left, consumed))
}

fn binary_operator(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Subtract),
        TokenKind::Star => Some(BinaryOp::Multiply),
        TokenKind::Slash => Some(BinaryOp::Divide),
        TokenKind::Percent => Some(BinaryOp::Modulo),
        TokenKind::AndAnd => Some(BinaryOp::And),
        TokenKind::OrOr => Some(BinaryOp::Or),
        TokenKind::EqualEqual => Some(BinaryOp::Equal),
        TokenKind::BangEqual => Some(BinaryOp::NotEqual),
        TokenKind::Less => Some(BinaryOp::Less),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::LessEqual => Some(BinaryOp::LessEqual),
        TokenKind::GreaterEqual => Some(BinaryOp::GreaterEqual),
        _ => None,
    }
}

fn parse_term(tokens: &[Token]) -> Result<(Expr, usize)> {
    match &tokens[0].kind {
        TokenKind::Bang => {
            let (operand, operand_consumed) = parse_expression(&tokens[1..])?;
            Ok((
                Expr::Unary {
                    operator: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                operand_consumed + 1,
            ))
        }
        TokenKind::LeftParen if tokens[1].kind == TokenKind::Lambd => parse_lambda(tokens),
        TokenKind::Identifier(_) if tokens[1].kind == TokenKind::LeftParen => parse_call(tokens),
        TokenKind::Integer(value) => Ok((Expr::Int(*value), 1)),
        TokenKind::Boolean(value) => Ok((Expr::Bool(*value), 1)),
        TokenKind::Identifier(name) => Ok((Expr::Identifier(name.clone()), 1)),
        TokenKind::LeftParen => {
            let (inner, inner_consumed) = parse_expression(&tokens[1..])?;
            let consumed = inner_consumed + 1;

            expect(&tokens[consumed], &TokenKind::RightParen)?;
            Ok((inner, consumed + 1))
        }
        _ => syntax_error("expression", &tokens[0]),
    }
}

fn parse_function_def(tokens: &[Token]) -> Result<(Expr, usize)> {
    let mut consumed = 1; // 'Defun'

    expect(&tokens[consumed], &TokenKind::LeftBrace)?;
    consumed += 1;
    expect(&tokens[consumed], &TokenKind::Name)?;
    consumed += 1;
    expect(&tokens[consumed], &TokenKind::Colon)?;
    consumed += 1;

    let name = match &tokens[consumed].kind {
        TokenKind::Identifier(name) => name.clone(),
        _ => return syntax_error("function name", &tokens[consumed]),
    };
    consumed += 1;

    expect(&tokens[consumed], &TokenKind::Comma)?;
    consumed += 1;
    expect(&tokens[consumed], &TokenKind::Arguments)?;
    consumed += 1;
    expect(&tokens[consumed], &TokenKind::Colon)?;
    consumed += 1;

    let (parameters, params_consumed) = parse_params(&tokens[consumed..])?;
    consumed += params_consumed;

    expect(&tokens[consumed], &TokenKind::RightBrace)?;
    consumed += 1;

    let (body, body_consumed) = if tokens[consumed].kind == TokenKind::If {
        parse_if(&tokens[consumed..])?
    } else {
        parse_expression(&tokens[consumed..])?
    };
    consumed += body_consumed;

    Ok((
        Expr::FuncDef {
            name,
            parameters,
            body: Box::new(body),
        },
        consumed,
    ))
}

// The comma after the last parameter is optional: `(x, y,)` and `(x, y)`
// are both accepted and every listed parameter is kept.
fn parse_params(tokens: &[Token]) -> Result<(Vec<String>, usize)> {
    expect(&tokens[0], &TokenKind::LeftParen)?;
    let mut consumed = 1;
    let mut parameters = Vec::new();

    loop {
        match &tokens[consumed].kind {
            TokenKind::RightParen => break,
            TokenKind::Identifier(name) => {
                parameters.push(name.clone());
                consumed += 1;

                match tokens[consumed].kind {
                    TokenKind::Comma => consumed += 1,
                    TokenKind::RightParen => {}
                    _ => return syntax_error("',' or ')'", &tokens[consumed]),
                }
            }
            _ => return syntax_error("parameter name or ')'", &tokens[consumed]),
        }
    }
    consumed += 1; // ')'

    Ok((parameters, consumed))
}

fn parse_if(tokens: &[Token]) -> Result<(Expr, usize)> {
    let mut consumed = 1; // 'if'

    let (condition, condition_consumed) = parse_expression(&tokens[consumed..])?;
    consumed += condition_consumed;

    expect(&tokens[consumed], &TokenKind::LeftBrace)?;
    consumed += 1;
    let (then_branch, then_consumed) = parse_expression(&tokens[consumed..])?;
    consumed += then_consumed;
    expect(&tokens[consumed], &TokenKind::RightBrace)?;
    consumed += 1;

    let else_branch = if tokens[consumed].kind == TokenKind::Else {
        consumed += 1;
        expect(&tokens[consumed], &TokenKind::LeftBrace)?;
        consumed += 1;
        let (alternative, alternative_consumed) = parse_expression(&tokens[consumed..])?;
        consumed += alternative_consumed;
        expect(&tokens[consumed], &TokenKind::RightBrace)?;
        consumed += 1;

        Some(Box::new(alternative))
    } else {
        None
    };

    Ok((
        Expr::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        },
        consumed,
    ))
}

// `(` `Lambd` IDENT `.` expression `)`, then any number of argument-list
// suffixes: an application result followed by `(` is itself re-applied.
fn parse_lambda(tokens: &[Token]) -> Result<(Expr, usize)> {
    let mut consumed = 1; // '('

    expect(&tokens[consumed], &TokenKind::Lambd)?;
    consumed += 1;

    let parameter = match &tokens[consumed].kind {
        TokenKind::Identifier(name) => name.clone(),
        _ => return syntax_error("parameter name", &tokens[consumed]),
    };
    consumed += 1;

    expect(&tokens[consumed], &TokenKind::Dot)?;
    consumed += 1;

    let (body, body_consumed) = parse_expression(&tokens[consumed..])?;
    consumed += body_consumed;

    expect(&tokens[consumed], &TokenKind::RightParen)?;
    consumed += 1;

    let mut expr = Expr::Lambda {
        parameter,
        body: Box::new(body),
    };

    while tokens[consumed].kind == TokenKind::LeftParen {
        let (arguments, args_consumed) = parse_args(&tokens[consumed..])?;
        consumed += args_consumed;

        expr = Expr::Call {
            callee: Box::new(expr),
            arguments,
        };
    }

    Ok((expr, consumed))
}

fn parse_call(tokens: &[Token]) -> Result<(Expr, usize)> {
    let name = match &tokens[0].kind {
        TokenKind::Identifier(name) => name.clone(),
        _ => unreachable!(),
    };
    let mut consumed = 1;
    let mut expr = Expr::Identifier(name);

    while tokens[consumed].kind == TokenKind::LeftParen {
        let (arguments, args_consumed) = parse_args(&tokens[consumed..])?;
        consumed += args_consumed;

        expr = Expr::Call {
            callee: Box::new(expr),
            arguments,
        };
    }

    Ok((expr, consumed))
}

fn parse_args(tokens: &[Token]) -> Result<(Vec<Expr>, usize)> {
    let mut consumed = 1; // '('
    let mut arguments = Vec::new();

    while tokens[consumed].kind != TokenKind::RightParen {
        let (argument, argument_consumed) = parse_expression(&tokens[consumed..])?;
        arguments.push(argument);
        consumed += argument_consumed;

        match tokens[consumed].kind {
            TokenKind::Comma => consumed += 1,
            TokenKind::RightParen => break,
            _ => return syntax_error("',' or ')'", &tokens[consumed]),
        }
    }
    consumed += 1; // ')'

    Ok((arguments, consumed))
}
