use crate::query::TokenKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageErr>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageErr {
    #[error("table {name} does not exist")]
    NoSuchTable { name: String },
    #[error("table {name} already exists")]
    TableExists { name: String },
    #[error("column {column} is not represented inside table {table} (actual columns: {columns})")]
    NoSuchColumn {
        table: String,
        column: String,
        columns: String,
    },
    #[error("column {column} is defined more than once in table {table}")]
    DuplicateColumn { table: String, column: String },
    #[error("type {datatype} is not supported")]
    UnsupportedType { datatype: String },
    #[error("engine {engine} is not supported")]
    UnsupportedEngine { engine: String },
    #[error("operator {operator} is not supported")]
    UnsupportedOperator { operator: String },
    #[error("columns in request {columns} are in incorrect order (desired: {expected})")]
    ColumnOrder { columns: String, expected: String },
    #[error("value {value} for column {column} has unsupported type (expected {expected}, got {found})")]
    TypeMismatch {
        column: String,
        value: String,
        expected: TokenKind,
        found: TokenKind,
    },
    #[error("value set {values} has incorrect number of values (expected {expected}, got {found})")]
    ShapeMismatch {
        values: String,
        expected: usize,
        found: usize,
    },
    #[error("condition {condition} compares {found} with a column holding {expected}")]
    KindMismatch {
        condition: String,
        expected: TokenKind,
        found: TokenKind,
    },
}
