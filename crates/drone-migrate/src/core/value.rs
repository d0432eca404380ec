//! Backend-neutral SQL values, rows and statements.
//!
//! Every driver decodes its native rows into [`Row`] and binds [`SqlValue`]
//! parameters, so the migration steps never see a driver type.

use crate::error::{MigrateError, Result};

/// SQL value used for parameters and decoded columns.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer. Narrower integer columns decode into this.
    I64(i64),

    /// Text data.
    Text(String),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns true for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I64(v.into())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

/// A SQL statement with positional parameters.
///
/// The SQL text must already use the placeholder style of the backend
/// it is executed against (see [`Dialect::param_placeholder`](super::Dialect::param_placeholder)).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Statement with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// A decoded result row.
///
/// Getters are lenient: NULL decodes to the zero value, integers decode as
/// booleans and text and bytes convert into each other. Legacy schemas store
/// booleans as integers on some backends and blobs as text on others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Create an empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append a column.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.push(column.into());
        self.values.push(value);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(column, value.into());
        self
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value by column name. Column names are matched case-insensitively
    /// because MySQL may report them in upper case.
    pub fn value(&self, column: &str) -> Result<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .map(|idx| &self.values[idx])
            .ok_or_else(|| MigrateError::decode(column, "column not found in result set"))
    }

    /// Integer column.
    pub fn i64(&self, column: &str) -> Result<i64> {
        match self.value(column)? {
            SqlValue::Null => Ok(0),
            SqlValue::I64(v) => Ok(*v),
            SqlValue::Bool(v) => Ok(i64::from(*v)),
            SqlValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| MigrateError::decode(column, format!("'{}' is not an integer", s))),
            SqlValue::Bytes(_) => Err(MigrateError::decode(column, "expected integer, got bytes")),
        }
    }

    /// Boolean column.
    pub fn bool(&self, column: &str) -> Result<bool> {
        match self.value(column)? {
            SqlValue::Null => Ok(false),
            SqlValue::Bool(v) => Ok(*v),
            SqlValue::I64(v) => Ok(*v != 0),
            SqlValue::Text(s) => match s.to_ascii_lowercase().as_str() {
                "1" | "t" | "true" => Ok(true),
                "0" | "f" | "false" | "" => Ok(false),
                other => Err(MigrateError::decode(
                    column,
                    format!("'{}' is not a boolean", other),
                )),
            },
            SqlValue::Bytes(_) => Err(MigrateError::decode(column, "expected boolean, got bytes")),
        }
    }

    /// Text column.
    pub fn string(&self, column: &str) -> Result<String> {
        match self.value(column)? {
            SqlValue::Null => Ok(String::new()),
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::I64(v) => Ok(v.to_string()),
            SqlValue::Bool(v) => Ok(v.to_string()),
            SqlValue::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|e| MigrateError::decode(column, e.to_string())),
        }
    }

    /// Binary column.
    pub fn bytes(&self, column: &str) -> Result<Vec<u8>> {
        match self.value(column)? {
            SqlValue::Null => Ok(Vec::new()),
            SqlValue::Bytes(b) => Ok(b.clone()),
            SqlValue::Text(s) => Ok(s.clone().into_bytes()),
            other => Err(MigrateError::decode(
                column,
                format!("expected bytes, got {:?}", other),
            )),
        }
    }
}
