use crate::storage::error::Result;
use crate::storage::{Cell, DataType, Engine, Schema, Table};

/// Physical storage of one column. `None` marks the null sentinel.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Numeric(Vec<Option<i64>>),
    Identifier(Vec<Option<Box<str>>>),
}

impl ColumnData {
    pub fn new(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => ColumnData::Numeric(Vec::new()),
            DataType::Text => ColumnData::Identifier(Vec::new()),
        }
    }

    // 스키마 검증을 통과한 값만 들어옴
    fn push(&mut self, cell: Cell) {
        match (self, cell) {
            (ColumnData::Numeric(col), Cell::Numeric(v)) => col.push(Some(v)),
            (ColumnData::Identifier(col), Cell::Identifier(v)) => col.push(Some(v)),
            (ColumnData::Numeric(col), _) => col.push(None),
            (ColumnData::Identifier(col), _) => col.push(None),
        }
    }

    fn get(&self, row_idx: usize) -> Cell {
        let value = match self {
            ColumnData::Numeric(col) => col.get(row_idx).cloned().flatten().map(Cell::Numeric),
            ColumnData::Identifier(col) => {
                col.get(row_idx).cloned().flatten().map(Cell::Identifier)
            }
        };
        value.unwrap_or(Cell::Null)
    }
}

/// Column-oriented table: values of each column are kept in one typed vector.
#[derive(Debug, Clone)]
pub struct ColumnTable {
    schema: Schema,
    columns: Vec<ColumnData>,
    row_count: usize,
}

impl ColumnTable {
    pub fn new(schema: Schema) -> Self {
        let columns = schema
            .columns
            .iter()
            .map(|column| ColumnData::new(column.datatype))
            .collect();
        Self {
            schema,
            columns,
            row_count: 0,
        }
    }
}

impl Table for ColumnTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn engine(&self) -> Engine {
        Engine::Column
    }

    fn count(&self) -> usize {
        self.row_count
    }

    fn append(&mut self, rows: Vec<Vec<Cell>>) {
        for row in rows {
            for (column, cell) in self.columns.iter_mut().zip(row) {
                column.push(cell);
            }
            self.row_count += 1;
        }
    }

    fn scan(&self, visit: &mut dyn FnMut(&[Cell]) -> Result<()>) -> Result<()> {
        let mut row = Vec::with_capacity(self.columns.len());
        for row_idx in 0..self.row_count {
            row.clear();
            row.extend(self.columns.iter().map(|col| col.get(row_idx)));
            visit(&row)?;
        }
        Ok(())
    }
}
