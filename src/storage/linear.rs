use crate::storage::error::Result;
use crate::storage::{Cell, Engine, Schema, Table};

/// Row-oriented table: every row is stored as one contiguous vector.
#[derive(Debug, Clone)]
pub struct LinearTable {
    schema: Schema,
    rows: Vec<Vec<Cell>>,
}

impl LinearTable {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }
}

impl Table for LinearTable {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn engine(&self) -> Engine {
        Engine::Linear
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn append(&mut self, rows: Vec<Vec<Cell>>) {
        self.rows.extend(rows);
    }

    fn scan(&self, visit: &mut dyn FnMut(&[Cell]) -> Result<()>) -> Result<()> {
        self.rows.iter().try_for_each(|row| visit(row.as_slice()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::test::{create_query, insert_query, select_query};
    use crate::storage::{DataType, StorageErr, create};
    use proptest::prelude::*;

    fn table() -> Box<dyn Table> {
        create(&create_query(
            "create table test (id int, name text) engine linear;",
        ))
        .unwrap()
    }

    fn text(value: &str) -> Cell {
        Cell::Identifier(value.into())
    }

    #[test]
    fn test_table_creation() {
        let table = table();
        assert_eq!(table.count(), 0);
        assert_eq!(table.schema().len(), 2);
        assert_eq!(table.schema().columns[0].datatype, DataType::Int);
        assert_eq!(table.schema().columns[1].datatype, DataType::Text);
    }

    #[test]
    fn test_insert_and_type_error() {
        let mut table = table();
        assert_eq!(
            table
                .insert(&insert_query("insert into test values (1, alice);"))
                .unwrap(),
            1
        );
        let err = table
            .insert(&insert_query("insert into test values (1, 2);"))
            .unwrap_err();
        assert!(matches!(err, StorageErr::TypeMismatch { ref column, .. } if column == "name"));
        assert_eq!(table.count(), 1);
        let rows = table.select(&select_query("select * from test;")).unwrap();
        assert_eq!(rows.rows, vec![vec![Cell::Numeric(1), text("alice")]]);
    }

    #[test]
    fn test_failed_insert_leaves_table_untouched() {
        let mut table = table();
        table
            .insert(&insert_query("insert into test values (1, a);"))
            .unwrap();
        assert!(
            table
                .insert(&insert_query("insert into test values (2, b), (c, 3);"))
                .is_err()
        );
        assert!(
            table
                .insert(&insert_query("insert into test (name, id) values (bob, 2);"))
                .is_err()
        );
        assert_eq!(table.count(), 1);
        assert_eq!(table.schema().len(), 2);
    }

    #[test]
    fn test_select_where() {
        let mut table = table();
        table
            .insert(&insert_query("insert into test values (1, alice);"))
            .unwrap();
        table
            .insert(&insert_query("insert into test values (-1, bob);"))
            .unwrap();
        let rows = table
            .select(&select_query("select (id, name) from test where id > 0;"))
            .unwrap();
        assert_eq!(rows.header, vec!["id".to_string(), "name".to_string()]);
        assert_eq!(rows.rows, vec![vec![Cell::Numeric(1), text("alice")]]);
    }

    #[test]
    fn test_select_conjunction_and_nulls() {
        let mut table = table();
        table
            .insert(&insert_query(
                "insert into test values (1, a), (2, b), (3, c);",
            ))
            .unwrap();
        table
            .insert(&insert_query("insert into test (name) values (d);"))
            .unwrap();
        let rows = table
            .select(&select_query(
                "select (name) from test where id > 1 and name < c;",
            ))
            .unwrap();
        assert_eq!(rows.rows, vec![vec![text("b")]]);

        let rows = table.select(&select_query("select (id) from test;")).unwrap();
        assert_eq!(rows.rows.len(), 4);
        assert_eq!(rows.rows[3], vec![Cell::Null]);
    }

    #[test]
    fn test_show_create() {
        assert_eq!(
            table().show_create(),
            "CREATE TABLE test (id INT, name TEXT) ENGINE linear;"
        );
    }

    proptest! {
        #[test]
        fn prop_select_filter_matches_model(
            ids in prop::collection::vec(-50i64..50, 0..40),
            k in -50i64..50,
        ) {
            let mut table = table();
            for id in &ids {
                table
                    .insert(&insert_query(&format!("insert into test values ({id}, x);")))
                    .unwrap();
            }
            let rows = table
                .select(&select_query(&format!("select (id) from test where id > {k};")))
                .unwrap();
            let expected: Vec<Vec<Cell>> = ids
                .iter()
                .filter(|&&id| id > k)
                .map(|&id| vec![Cell::Numeric(id)])
                .collect();
            prop_assert_eq!(rows.header, vec!["id".to_string()]);
            prop_assert_eq!(rows.rows, expected);
            prop_assert_eq!(table.count(), ids.len());
        }
    }
}
