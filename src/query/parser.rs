use crate::query::ast::{
    ColumnDefinition, Condition, CreateTableQuery, InsertIntoQuery, Projection, SelectQuery,
    ShowCreateQuery, Statement,
};
use crate::query::error::{Expected, QueryErr, Result};
use crate::query::lexer::{Token, TokenKind, tokenize};

const VERBS: &[&str] = &["create", "insert", "select", "show"];
const OPERATORS: &[&str] = &["==", ">", "<"];
const VALUE_KINDS: &[TokenKind] = &[TokenKind::Identifier, TokenKind::Numeric];

impl Expected {
    fn matches(&self, token: &Token) -> bool {
        let literal = matches!(token.kind, TokenKind::Keyword | TokenKind::Symbol);
        match self {
            Expected::Literal(lit) => literal && token.value == *lit,
            Expected::Kind(kind) => token.kind == *kind,
            Expected::OneOf(lits) => literal && lits.contains(&token.value.as_str()),
            Expected::AnyOf(kinds) => kinds.contains(&token.kind),
            Expected::End => false,
        }
    }
}

/// Recursive-descent parser for a single `;`-terminated statement.
///
/// Every state consumes exactly one token through [`Parser::expect`]; the
/// first mismatch aborts with the offending token and its offset. There is
/// no backtracking.
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    end: usize,
}

impl Parser {
    /// `end` is the byte length of the source, reported by end-of-input errors.
    pub fn new(tokens: Vec<Token>, end: usize) -> Self {
        Parser {
            tokens,
            cursor: 0,
            end,
        }
    }

    fn curr(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn curr_is(&self, literal: &'static str) -> bool {
        self.curr()
            .is_some_and(|t| Expected::Literal(literal).matches(t))
    }

    fn unexpected(&self, expected: Expected) -> QueryErr {
        match self.curr() {
            Some(token) => QueryErr::UnexpectedToken {
                expected,
                found: token.value.clone(),
                position: token.position,
            },
            None => QueryErr::UnexpectedEof {
                expected,
                position: self.end,
            },
        }
    }

    /// Consumes the current token if it satisfies `expected`.
    fn expect(&mut self, expected: Expected) -> Result<Token> {
        match self.curr() {
            Some(token) if expected.matches(token) => {
                let token = token.clone();
                self.cursor += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// `( item {, item} )`
    fn parenthesized<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.expect(Expected::Literal("("))?;
        let mut items = Vec::new();
        loop {
            items.push(item(self)?);
            let sep = self.expect(Expected::OneOf(&[",", ")"]))?;
            if sep.value == ")" {
                return Ok(items);
            }
        }
    }

    pub fn parse(mut self) -> Result<Statement> {
        let Some(verb) = self.curr().filter(|t| t.kind == TokenKind::Keyword).cloned() else {
            return Err(match self.curr() {
                Some(t) => QueryErr::UnsupportedStatement {
                    found: t.value.clone(),
                    position: t.position,
                },
                None => QueryErr::UnexpectedEof {
                    expected: Expected::OneOf(VERBS),
                    position: self.end,
                },
            });
        };
        let stmt = match verb.value.as_str() {
            "create" => Statement::CreateTable(self.parse_create()?),
            "insert" => Statement::InsertInto(self.parse_insert()?),
            "select" => Statement::Select(self.parse_select()?),
            "show" => Statement::ShowCreate(self.parse_show_create()?),
            _ => {
                return Err(QueryErr::UnsupportedStatement {
                    found: verb.value,
                    position: verb.position,
                });
            }
        };
        if self.curr().is_some() {
            return Err(self.unexpected(Expected::End));
        }
        Ok(stmt)
    }

    // CREATE TABLE <ident> ( <ident> <type> {, <ident> <type>} ) ENGINE <engine> ;
    fn parse_create(&mut self) -> Result<CreateTableQuery> {
        self.expect(Expected::Literal("create"))?;
        self.expect(Expected::Literal("table"))?;
        let name = self.expect(Expected::Kind(TokenKind::Identifier))?;
        let columns = self.parenthesized(|p| {
            let name = p.expect(Expected::Kind(TokenKind::Identifier))?;
            let datatype = p.expect(Expected::Kind(TokenKind::Type))?;
            Ok(ColumnDefinition { name, datatype })
        })?;
        self.expect(Expected::Literal("engine"))?;
        let engine = self.expect(Expected::Kind(TokenKind::Engine))?;
        self.expect(Expected::Literal(";"))?;
        Ok(CreateTableQuery {
            name,
            columns,
            engine,
        })
    }

    // INSERT INTO <ident> [ ( <ident> {, <ident>} ) ] VALUES ( <val> {, <val>} ) {, ( ... )} ;
    fn parse_insert(&mut self) -> Result<InsertIntoQuery> {
        self.expect(Expected::Literal("insert"))?;
        self.expect(Expected::Literal("into"))?;
        let table = self.expect(Expected::Kind(TokenKind::Identifier))?;
        let column_names = if self.curr_is("(") {
            self.parenthesized(|p| p.expect(Expected::Kind(TokenKind::Identifier)))?
        } else {
            Vec::new()
        };
        self.expect(Expected::Literal("values"))?;
        let mut values = Vec::new();
        loop {
            values.push(self.parenthesized(|p| p.expect(Expected::AnyOf(VALUE_KINDS)))?);
            let sep = self.expect(Expected::OneOf(&[",", ";"]))?;
            if sep.value == ";" {
                break;
            }
        }
        Ok(InsertIntoQuery {
            table,
            column_names,
            values,
        })
    }

    // SELECT ( <ident> {, <ident>} ) | * FROM <ident> [ WHERE <cond> {AND <cond>} ] ;
    fn parse_select(&mut self) -> Result<SelectQuery> {
        self.expect(Expected::Literal("select"))?;
        let columns = if self.curr_is("*") {
            self.expect(Expected::Literal("*"))?;
            Projection::All
        } else {
            Projection::Columns(
                self.parenthesized(|p| p.expect(Expected::Kind(TokenKind::Identifier)))?,
            )
        };
        self.expect(Expected::Literal("from"))?;
        let from = self.expect(Expected::Kind(TokenKind::Identifier))?;
        let mut conditions = Vec::new();
        let mut next = self.expect(Expected::OneOf(&["where", ";"]))?;
        if next.value == "where" {
            loop {
                conditions.push(self.parse_condition()?);
                next = self.expect(Expected::OneOf(&["and", ";"]))?;
                if next.value == ";" {
                    break;
                }
            }
        }
        Ok(SelectQuery {
            columns,
            from,
            conditions,
        })
    }

    // <ident> <op> <val>
    fn parse_condition(&mut self) -> Result<Condition> {
        let column = self.expect(Expected::Kind(TokenKind::Identifier))?;
        let operator = self.expect(Expected::OneOf(OPERATORS))?;
        let value = self.expect(Expected::AnyOf(VALUE_KINDS))?;
        Ok(Condition {
            column,
            value,
            operator,
        })
    }

    // SHOW CREATE ( <ident> ) ;
    fn parse_show_create(&mut self) -> Result<ShowCreateQuery> {
        self.expect(Expected::Literal("show"))?;
        self.expect(Expected::Literal("create"))?;
        self.expect(Expected::Literal("("))?;
        let table = self.expect(Expected::Kind(TokenKind::Identifier))?;
        self.expect(Expected::Literal(")"))?;
        self.expect(Expected::Literal(";"))?;
        Ok(ShowCreateQuery { table })
    }
}

/// Tokenizes and parses a single statement.
pub fn parse(text: &str) -> Result<Statement> {
    Parser::new(tokenize(text)?, text.len()).parse()
}
