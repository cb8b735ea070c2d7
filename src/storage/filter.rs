use crate::query::{Condition, Projection, SelectQuery, Token, TokenKind};
use crate::storage::error::{Result, StorageErr};
use crate::storage::{Cell, Schema};
use std::cmp::Ordering;

#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum Operator {
    Eq, // ==
    Gt, // >
    Lt, // <
}

impl Operator {
    pub fn from_token(token: &Token) -> Result<Self> {
        match (token.kind, token.value.as_str()) {
            (TokenKind::Symbol, "==") => Ok(Operator::Eq),
            (TokenKind::Symbol, ">") => Ok(Operator::Gt),
            (TokenKind::Symbol, "<") => Ok(Operator::Lt),
            _ => Err(StorageErr::UnsupportedOperator {
                operator: token.value.clone(),
            }),
        }
    }

    /// `ordering` is candidate compared to literal.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Lt => ordering == Ordering::Less,
        }
    }
}

impl Condition {
    fn kind_mismatch(&self, expected: TokenKind) -> StorageErr {
        StorageErr::KindMismatch {
            condition: self.to_string(),
            expected,
            found: self.value.kind,
        }
    }

    /// Tests a stored value against the literal of this condition.
    ///
    /// Numbers compare as integers and identifiers lexicographically; the two
    /// kinds never compare with each other. The null sentinel satisfies no
    /// condition.
    pub fn evaluate(&self, candidate: &Cell) -> Result<bool> {
        let operator = Operator::from_token(&self.operator)?;
        let ordering = match (candidate, self.value.kind) {
            (Cell::Null, _) => return Ok(false),
            (Cell::Numeric(value), TokenKind::Numeric) => {
                let literal: i64 = self
                    .value
                    .value
                    .parse()
                    .map_err(|_| self.kind_mismatch(TokenKind::Numeric))?;
                value.cmp(&literal)
            }
            (Cell::Identifier(value), TokenKind::Identifier) => {
                value.as_ref().cmp(self.value.value.as_str())
            }
            (cell, _) => return Err(self.kind_mismatch(cell.kind())),
        };
        Ok(operator.holds(ordering))
    }
}

/// Column indices and conditions of a select, resolved against a schema.
#[derive(Debug, Clone)]
pub struct SelectPlan {
    pub header: Vec<String>,
    projection: Vec<usize>,
    filters: Vec<(usize, Condition)>,
}

impl SelectPlan {
    /// True if `row` satisfies every condition.
    pub fn accepts(&self, row: &[Cell]) -> Result<bool> {
        for (index, condition) in &self.filters {
            if !condition.evaluate(&row[*index])? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn project(&self, row: &[Cell]) -> Vec<Cell> {
        self.projection.iter().map(|&i| row[i].clone()).collect()
    }
}

impl Schema {
    /// Resolves output and condition columns. Conditions whose literal kind
    /// differs from the column type are rejected before any row is read.
    pub fn plan(&self, query: &SelectQuery) -> Result<SelectPlan> {
        let projection: Vec<usize> = match &query.columns {
            Projection::All => (0..self.len()).collect(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|column| self.resolve(column))
                .collect::<Result<_>>()?,
        };
        let header = projection
            .iter()
            .map(|&i| self.columns[i].name.clone())
            .collect();
        let mut filters = Vec::with_capacity(query.conditions.len());
        for condition in &query.conditions {
            let index = self.resolve(&condition.column)?;
            Operator::from_token(&condition.operator)?;
            let expected = self.columns[index].datatype.kind();
            if condition.value.kind != expected {
                return Err(condition.kind_mismatch(expected));
            }
            filters.push((index, condition.clone()));
        }
        Ok(SelectPlan {
            header,
            projection,
            filters,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::test::{create_query, select_query};

    fn condition(column: &str, operator: &str, value: Token) -> Condition {
        Condition {
            column: Token::ident(column),
            value,
            operator: Token::symbol(operator),
        }
    }

    fn schema() -> Schema {
        Schema::from_query(&create_query(
            "create table test (id int, name text) engine linear;",
        ))
        .unwrap()
    }

    #[test]
    fn test_numeric_comparison() {
        let gt = condition("id", ">", Token::num(0));
        assert!(gt.evaluate(&Cell::Numeric(1)).unwrap());
        assert!(!gt.evaluate(&Cell::Numeric(0)).unwrap());
        assert!(!gt.evaluate(&Cell::Numeric(-1)).unwrap());

        let lt = condition("id", "<", Token::num(10));
        assert!(lt.evaluate(&Cell::Numeric(9)).unwrap());
        // 문자열이 아닌 정수로 비교함
        assert!(!lt.evaluate(&Cell::Numeric(100)).unwrap());

        let eq = condition("id", "==", Token::num(-3));
        assert!(eq.evaluate(&Cell::Numeric(-3)).unwrap());
        assert!(!eq.evaluate(&Cell::Numeric(3)).unwrap());
    }

    #[test]
    fn test_identifier_comparison() {
        let gt = condition("name", ">", Token::ident("bob"));
        assert!(gt.evaluate(&Cell::Identifier("carol".into())).unwrap());
        assert!(!gt.evaluate(&Cell::Identifier("alice".into())).unwrap());
        let eq = condition("name", "==", Token::ident("bob"));
        assert!(eq.evaluate(&Cell::Identifier("bob".into())).unwrap());
    }

    #[test]
    fn test_kind_mismatch() {
        let cond = condition("id", ">", Token::ident("x"));
        assert!(matches!(
            cond.evaluate(&Cell::Numeric(1)),
            Err(StorageErr::KindMismatch {
                expected: TokenKind::Numeric,
                found: TokenKind::Identifier,
                ..
            })
        ));
        let cond = condition("name", "==", Token::num(1));
        assert!(cond.evaluate(&Cell::Identifier("1".into())).is_err());
    }

    #[test]
    fn test_null_never_matches() {
        for op in ["==", ">", "<"] {
            assert!(!condition("id", op, Token::num(0)).evaluate(&Cell::Null).unwrap());
            assert!(
                !condition("name", op, Token::ident("null"))
                    .evaluate(&Cell::Null)
                    .unwrap()
            );
        }
    }

    #[test]
    fn test_unsupported_operator() {
        let cond = condition("id", "*", Token::num(0));
        assert!(matches!(
            cond.evaluate(&Cell::Numeric(0)),
            Err(StorageErr::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_plan_resolves_columns_in_requested_order() {
        let plan = schema()
            .plan(&select_query("select (name, id) from test where id > 0;"))
            .unwrap();
        assert_eq!(plan.header, vec!["name".to_string(), "id".to_string()]);
        let row = [Cell::Numeric(1), Cell::Identifier("alice".into())];
        assert!(plan.accepts(&row).unwrap());
        assert_eq!(
            plan.project(&row),
            vec![Cell::Identifier("alice".into()), Cell::Numeric(1)]
        );
    }

    #[test]
    fn test_plan_rejects_unknown_and_mismatched() {
        assert!(matches!(
            schema().plan(&select_query("select (age) from test;")),
            Err(StorageErr::NoSuchColumn { .. })
        ));
        assert!(matches!(
            schema().plan(&select_query("select (id) from test where age > 1;")),
            Err(StorageErr::NoSuchColumn { .. })
        ));
        assert!(matches!(
            schema().plan(&select_query("select (id) from test where id == bob;")),
            Err(StorageErr::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_plan_star() {
        let plan = schema().plan(&select_query("select * from test;")).unwrap();
        assert_eq!(plan.header, vec!["id".to_string(), "name".to_string()]);
    }
}
