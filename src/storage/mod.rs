pub mod column;
pub mod error;
pub mod filter;
pub mod linear;

use crate::query::ast::bracketize;
use crate::query::{ColumnDefinition, CreateTableQuery, InsertIntoQuery, SelectQuery, Token, TokenKind};
pub use column::ColumnTable;
pub use error::{Result, StorageErr};
pub use linear::LinearTable;
use std::fmt;

#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum DataType {
    Int,
    Text,
}

/// A stored value. `Null` fills columns left out of a named insert.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Cell {
    Null,
    Numeric(i64),
    Identifier(Box<str>),
}

#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum Engine {
    Linear,
    Column,
}

impl DataType {
    pub fn from_token(token: &Token) -> Result<Self> {
        match token.value.to_lowercase().as_str() {
            "int" => Ok(DataType::Int),
            "text" => Ok(DataType::Text),
            _ => Err(StorageErr::UnsupportedType {
                datatype: token.value.clone(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Text => "text",
        }
    }

    /// Token kind a value must have to be stored in a column of this type.
    pub fn kind(self) -> TokenKind {
        match self {
            DataType::Int => TokenKind::Numeric,
            DataType::Text => TokenKind::Identifier,
        }
    }
}

impl Cell {
    /// Converts a value token. `null` becomes the sentinel; anything that is
    /// neither numeric nor an identifier is rejected.
    pub fn from_token(token: &Token) -> Option<Self> {
        match token.kind {
            TokenKind::Numeric => token.value.parse().ok().map(Cell::Numeric),
            TokenKind::Identifier if token.value.eq_ignore_ascii_case("null") => Some(Cell::Null),
            TokenKind::Identifier => Some(Cell::Identifier(token.value.as_str().into())),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// The sentinel is stored as an identifier.
    pub fn kind(&self) -> TokenKind {
        match self {
            Cell::Numeric(_) => TokenKind::Numeric,
            Cell::Null | Cell::Identifier(_) => TokenKind::Identifier,
        }
    }

    pub fn verify(&self, data_type: DataType) -> bool {
        self.is_null() || self.kind() == data_type.kind()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Numeric(value) => write!(f, "{value}"),
            Cell::Identifier(value) => f.write_str(value),
        }
    }
}

impl Engine {
    pub fn from_token(token: &Token) -> Result<Self> {
        match token.value.to_lowercase().as_str() {
            "linear" => Ok(Engine::Linear),
            "column" => Ok(Engine::Column),
            _ => Err(StorageErr::UnsupportedEngine {
                engine: token.value.clone(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Linear => "linear",
            Engine::Column => "column",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub datatype: DataType,
}

/// Column layout of a table. Fixed once the table is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn from_query(query: &CreateTableQuery) -> Result<Self> {
        let table = query.name.value.clone();
        let mut columns: Vec<ColumnDef> = Vec::with_capacity(query.columns.len());
        for definition in &query.columns {
            let name = definition.name.value.clone();
            if columns.iter().any(|c| c.name == name) {
                return Err(StorageErr::DuplicateColumn {
                    table,
                    column: name,
                });
            }
            columns.push(ColumnDef {
                name,
                datatype: DataType::from_token(&definition.datatype)?,
            });
        }
        Ok(Schema { table, columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `(id, int), (name, text)`
    pub fn describe(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("({}, {})", c.name, c.datatype.as_str()))
            .collect();
        columns.join(", ")
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn resolve(&self, column: &Token) -> Result<usize> {
        self.index_of(&column.value)
            .ok_or_else(|| StorageErr::NoSuchColumn {
                table: self.table.clone(),
                column: column.value.clone(),
                columns: self.describe(),
            })
    }

    /// Rebuilds the statement that would create this schema.
    pub fn to_create_query(&self, engine: Engine) -> CreateTableQuery {
        CreateTableQuery {
            name: Token::ident(self.table.as_str()),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnDefinition {
                    name: Token::ident(c.name.as_str()),
                    datatype: Token::new(c.datatype.as_str(), TokenKind::Type),
                })
                .collect(),
            engine: Token::new(engine.as_str(), TokenKind::Engine),
        }
    }

    /// Maps every value-set of `query` onto a full row.
    ///
    /// Either every value-set binds or none does, so a failing insert never
    /// leaves a partially applied table behind.
    pub fn bind_rows(&self, query: &InsertIntoQuery) -> Result<Vec<Vec<Cell>>> {
        let positions = if query.column_names.is_empty() {
            None
        } else {
            Some(self.positions(&query.column_names)?)
        };
        query
            .values
            .iter()
            .map(|set| self.bind_row(set, positions.as_deref()))
            .collect()
    }

    // 이름이 지정된 컬럼은 스키마 순서를 따라야 함
    fn positions(&self, names: &[Token]) -> Result<Vec<usize>> {
        let mut positions: Vec<usize> = Vec::with_capacity(names.len());
        for name in names {
            let index = self.resolve(name)?;
            if positions.last().is_some_and(|&last| index <= last) {
                return Err(StorageErr::ColumnOrder {
                    columns: bracketize(names),
                    expected: format!("({})", self.names().join(", ")),
                });
            }
            positions.push(index);
        }
        Ok(positions)
    }

    fn bind_row(&self, set: &[Token], positions: Option<&[usize]>) -> Result<Vec<Cell>> {
        let expected = positions.map_or(self.len(), <[usize]>::len);
        if set.len() != expected {
            return Err(StorageErr::ShapeMismatch {
                values: bracketize(set),
                expected,
                found: set.len(),
            });
        }
        let mut row = vec![Cell::Null; self.len()];
        for (i, token) in set.iter().enumerate() {
            let index = positions.map_or(i, |p| p[i]);
            let column = &self.columns[index];
            let mismatch = || StorageErr::TypeMismatch {
                column: column.name.clone(),
                value: token.value.clone(),
                expected: column.datatype.kind(),
                found: token.kind,
            };
            let cell = Cell::from_token(token).ok_or_else(mismatch)?;
            if !cell.verify(column.datatype) {
                return Err(mismatch());
            }
            row[index] = cell;
        }
        Ok(row)
    }
}

/// Result of a select: column names followed by the matching rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rows {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Rows {
    /// Header first, then one line per row, values joined by commas.
    pub fn to_csv(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().map(Cell::to_string).collect()),
            )
            .collect()
    }
}

/// Storage strategy behind a table.
///
/// Implementors only provide the physical layout; validation and query
/// evaluation are shared through the provided methods.
pub trait Table: fmt::Debug + Send {
    fn schema(&self) -> &Schema;

    fn engine(&self) -> Engine;

    /// Number of stored rows.
    fn count(&self) -> usize;

    /// Appends rows already bound against the schema.
    fn append(&mut self, rows: Vec<Vec<Cell>>);

    /// Visits stored rows in insertion order, stopping at the first error.
    fn scan(&self, visit: &mut dyn FnMut(&[Cell]) -> Result<()>) -> Result<()>;

    fn name(&self) -> &str {
        &self.schema().table
    }

    /// Validates and appends every value-set of `query`, returning the number
    /// of rows added. Existing rows are never touched.
    fn insert(&mut self, query: &InsertIntoQuery) -> Result<usize> {
        let rows = self.schema().bind_rows(query)?;
        let added = rows.len();
        self.append(rows);
        Ok(added)
    }

    fn select(&self, query: &SelectQuery) -> Result<Rows> {
        let plan = self.schema().plan(query)?;
        let mut rows = Vec::new();
        self.scan(&mut |row: &[Cell]| {
            if plan.accepts(row)? {
                rows.push(plan.project(row));
            }
            Ok(())
        })?;
        Ok(Rows {
            header: plan.header,
            rows,
        })
    }

    fn show_create(&self) -> String {
        self.schema().to_create_query(self.engine()).to_string()
    }
}

/// Builds an empty table for `query` using the engine it names.
pub fn create(query: &CreateTableQuery) -> Result<Box<dyn Table>> {
    let engine = Engine::from_token(&query.engine)?;
    let schema = Schema::from_query(query)?;
    Ok(match engine {
        Engine::Linear => Box::new(LinearTable::new(schema)),
        Engine::Column => Box::new(ColumnTable::new(schema)),
    })
}
