pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{
    ColumnDefinition, Condition, CreateTableQuery, InsertIntoQuery, Projection, SelectQuery,
    ShowCreateQuery, Statement,
};
pub use error::QueryErr;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parser, parse};
