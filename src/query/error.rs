use crate::query::lexer::TokenKind;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryErr>;

/// What the parser wanted to see at a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// A specific reserved word or symbol.
    Literal(&'static str),
    /// Any token of the given kind.
    Kind(TokenKind),
    /// One of several literals.
    OneOf(&'static [&'static str]),
    /// Any token of one of several kinds.
    AnyOf(&'static [TokenKind]),
    /// Nothing: the statement is complete.
    End,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(lit) => write!(f, "\"{lit}\""),
            Expected::Kind(kind) => write!(f, "{kind}"),
            Expected::OneOf(lits) => {
                let quoted: Vec<String> = lits.iter().map(|l| format!("\"{l}\"")).collect();
                write!(f, "one of {}", quoted.join(", "))
            }
            Expected::AnyOf(kinds) => {
                let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
                write!(f, "{}", names.join(" or "))
            }
            Expected::End => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryErr {
    #[error("unsupported token \"{fragment}\" at {position}")]
    UnsupportedToken { fragment: String, position: usize },
    #[error("syntax error at {position}: expected {expected}, found \"{found}\"")]
    UnexpectedToken {
        expected: Expected,
        found: String,
        position: usize,
    },
    #[error("syntax error at {position}: expected {expected}, found end of input")]
    UnexpectedEof { expected: Expected, position: usize },
    #[error(
        "unsupported operation \"{found}\" at {position}: only CREATE TABLE, INSERT INTO, SELECT and SHOW CREATE are supported"
    )]
    UnsupportedStatement { found: String, position: usize },
}

impl QueryErr {
    /// Offset in the request text where the failure was detected.
    pub fn position(&self) -> usize {
        match self {
            QueryErr::UnsupportedToken { position, .. }
            | QueryErr::UnexpectedToken { position, .. }
            | QueryErr::UnexpectedEof { position, .. }
            | QueryErr::UnsupportedStatement { position, .. } => *position,
        }
    }
}
