use crate::query::lexer::Token;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableQuery),
    InsertInto(InsertIntoQuery),
    Select(SelectQuery),
    ShowCreate(ShowCreateQuery),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Token,
    pub datatype: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableQuery {
    pub name: Token,
    pub columns: Vec<ColumnDefinition>,
    pub engine: Token,
}

/// `column_names` empty means a positional insert; `values` holds one entry
/// per parenthesized value-set.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertIntoQuery {
    pub table: Token,
    pub column_names: Vec<Token>,
    pub values: Vec<Vec<Token>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: Token,
    pub value: Token,
    pub operator: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    Columns(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub columns: Projection,
    pub from: Token,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowCreateQuery {
    pub table: Token,
}

impl Statement {
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::InsertInto(_) => "INSERT INTO",
            Statement::Select(_) => "SELECT",
            Statement::ShowCreate(_) => "SHOW CREATE",
        }
    }

    /// Name of the table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            Statement::CreateTable(q) => &q.name.value,
            Statement::InsertInto(q) => &q.table.value,
            Statement::Select(q) => &q.from.value,
            Statement::ShowCreate(q) => &q.table.value,
        }
    }
}

/// `(a, b, c)`
pub fn bracketize(tokens: &[Token]) -> String {
    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    format!("({})", values.join(", "))
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable(q) => q.fmt(f),
            Statement::InsertInto(q) => q.fmt(f),
            Statement::Select(q) => q.fmt(f),
            Statement::ShowCreate(q) => q.fmt(f),
        }
    }
}

impl fmt::Display for CreateTableQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.datatype.value.to_uppercase()))
            .collect();
        write!(
            f,
            "CREATE TABLE {} ({}) ENGINE {};",
            self.name,
            columns.join(", "),
            self.engine
        )
    }
}

impl fmt::Display for InsertIntoQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.column_names.is_empty() {
            write!(f, " {}", bracketize(&self.column_names))?;
        }
        let sets: Vec<String> = self.values.iter().map(|set| bracketize(set)).collect();
        write!(f, " VALUES {};", sets.join(", "))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.value)
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.columns {
            Projection::All => write!(f, "SELECT * FROM {}", self.from)?,
            Projection::Columns(columns) => {
                write!(f, "SELECT {} FROM {}", bracketize(columns), self.from)?
            }
        }
        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
            write!(f, " WHERE {}", conditions.join(" AND "))?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for ShowCreateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHOW CREATE ({});", self.table)
    }
}
