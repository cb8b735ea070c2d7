/*
Request dispatch for one session.

    `CREATE TABLE friends (name text, age int) ENGINE linear;`
    >>> ok

    `INSERT INTO friends VALUES (alpha, 18), (beta, 20);`
    `INSERT INTO friends (name) VALUES (delta);`
    >>> ok

    `SELECT (name, age) FROM friends WHERE age > 18;`
    >>> name,age
        beta,20

    `SHOW CREATE (friends);`
    >>> CREATE TABLE friends (name TEXT, age INT) ENGINE linear;

Every session starts with `system.tables`, listing each table and its engine.
*/

use crate::query::{self, CreateTableQuery, InsertIntoQuery, QueryErr, SelectQuery, Statement, Token};
use crate::storage::{self, StorageErr, Table};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const SYSTEM_TABLES: &str = "system.tables";

#[derive(Debug, Error)]
pub enum ExecErr {
    #[error(transparent)]
    Query(#[from] QueryErr),
    #[error(transparent)]
    Storage(#[from] StorageErr),
    #[error("table {name} is read-only")]
    ReadOnly { name: String },
}

impl ExecErr {
    /// Offset in the request for syntax errors.
    pub fn position(&self) -> Option<usize> {
        match self {
            ExecErr::Query(e) => Some(e.position()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Header line first.
    Rows(Vec<Vec<String>>),
    Text(String),
    Success,
    Error(String),
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(rows) => {
                for row in rows {
                    writeln!(f, "{}", row.join(","))?;
                }
                Ok(())
            }
            QueryResult::Text(text) => writeln!(f, "{text}"),
            QueryResult::Success => writeln!(f, "ok"),
            QueryResult::Error(msg) => writeln!(f, "{msg}"),
        }
    }
}

/// Tables of one session. Not shared: every client gets its own executor.
#[derive(Debug)]
pub struct Executor {
    tables: HashMap<String, Box<dyn Table>>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        let mut tables: HashMap<String, Box<dyn Table>> = HashMap::new();
        let (schema, row) = system_tables();
        let mut table = storage::LinearTable::new(schema);
        table.append(vec![row]);
        tables.insert(SYSTEM_TABLES.to_string(), Box::new(table));
        Self { tables }
    }

    pub fn run(&mut self, src: &str) -> QueryResult {
        match self.execute(src) {
            Ok(result) => result,
            Err(e) => {
                warn!(request = src, position = ?e.position(), error = %e, "request failed");
                QueryResult::Error(e.to_string())
            }
        }
    }

    pub fn execute(&mut self, src: &str) -> Result<QueryResult, ExecErr> {
        let stmt = query::parse(src)?;
        debug!(kind = stmt.kind(), table = stmt.table(), "parsed statement");
        match stmt {
            Statement::CreateTable(q) => self.run_create(&q),
            Statement::InsertInto(q) => self.run_insert(&q),
            Statement::Select(q) => self.run_select(&q),
            Statement::ShowCreate(q) => Ok(QueryResult::Text(self.table(&q.table)?.show_create())),
        }
    }

    fn table(&self, name: &Token) -> Result<&dyn Table, StorageErr> {
        self.tables
            .get(&name.value)
            .map(Box::as_ref)
            .ok_or_else(|| StorageErr::NoSuchTable {
                name: name.value.clone(),
            })
    }

    fn run_create(&mut self, q: &CreateTableQuery) -> Result<QueryResult, ExecErr> {
        let name = &q.name.value;
        if self.tables.contains_key(name) {
            return Err(StorageErr::TableExists { name: name.clone() }.into());
        }
        let table = storage::create(q)?;
        let engine = table.engine();
        self.tables.insert(name.clone(), table);
        if let Some(catalog) = self.tables.get_mut(SYSTEM_TABLES) {
            catalog.append(vec![vec![
                storage::Cell::Identifier(name.as_str().into()),
                storage::Cell::Identifier(engine.as_str().into()),
            ]]);
        }
        info!(table = %name, %engine, "table created");
        Ok(QueryResult::Success)
    }

    fn run_insert(&mut self, q: &InsertIntoQuery) -> Result<QueryResult, ExecErr> {
        let name = &q.table.value;
        if name == SYSTEM_TABLES {
            return Err(ExecErr::ReadOnly { name: name.clone() });
        }
        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| StorageErr::NoSuchTable { name: name.clone() })?;
        let rows = table.insert(q)?;
        debug!(table = %name, rows, "rows inserted");
        Ok(QueryResult::Success)
    }

    fn run_select(&self, q: &SelectQuery) -> Result<QueryResult, ExecErr> {
        let rows = self.table(&q.from)?.select(q)?;
        debug!(table = %q.from, rows = rows.rows.len(), "rows selected");
        Ok(QueryResult::Rows(rows.to_csv()))
    }

    /// Number of tables, the bookkeeping table included.
    pub fn count_tables(&self) -> usize {
        self.tables.len()
    }

    /// Row count per table.
    pub fn summary(&self) -> BTreeMap<&str, usize> {
        self.tables
            .iter()
            .map(|(name, table)| (name.as_str(), table.count()))
            .collect()
    }
}

// (table_name text, engine_type text) ENGINE linear, registering itself
fn system_tables() -> (storage::Schema, Vec<storage::Cell>) {
    let schema = storage::Schema {
        table: SYSTEM_TABLES.to_string(),
        columns: vec![
            storage::ColumnDef {
                name: "table_name".into(),
                datatype: storage::DataType::Text,
            },
            storage::ColumnDef {
                name: "engine_type".into(),
                datatype: storage::DataType::Text,
            },
        ],
    };
    let row = vec![
        storage::Cell::Identifier(SYSTEM_TABLES.into()),
        storage::Cell::Identifier(storage::Engine::Linear.as_str().into()),
    ];
    (schema, row)
}
