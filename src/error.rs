use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("lex error: unexpected character {character:?} on line {line}")]
    Lex { character: char, line: usize },
    #[error("syntax error at line {line}, column {column}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },
    #[error("name error: undefined identifier '{name}'")]
    Name { name: String },
    #[error("type error: {message}")]
    Type { message: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("grammar error on line {line}: {message}")]
    Grammar { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
