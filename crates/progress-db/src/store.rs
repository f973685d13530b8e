use async_trait::async_trait;

use crate::error::DbError;

/// A single SQL value, shaped after SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// SQL text plus positional arguments bound to `?1`, `?2`, ...
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I>(sql: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            sql: sql.into(),
            args: args.into_iter().collect(),
        }
    }
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    pub rows: Vec<Vec<Value>>,
    pub affected_row_count: u64,
}

impl Rows {
    /// First column of the first row, if any row came back.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Storage client the data-access modules run their statements through.
///
/// Implementations own their connection; callers never see it.
#[async_trait]
pub trait Store: Send + Sync {
    async fn execute(&self, stmt: Statement) -> Result<Rows, DbError>;
}
