use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Values used both as statement parameters and as materialised row values.
///
/// Every backend converts to and from this one enum so helpers never branch on
/// driver types:
/// ```rust
/// use sql_access::prelude::*;
///
/// let params = vec![
///     DbValue::Int(1),
///     DbValue::Text("alice".into()),
///     DbValue::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, bound as text
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl DbValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DbValue::Int(value) => Some(*value),
            DbValue::Bool(b) => Some(i64::from(*b)),
            // SQL Server hands back DECIMAL/NUMERIC identities as floats.
            DbValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            DbValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let DbValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DbValue::Bool(value) => Some(*value),
            DbValue::Int(1) => Some(true),
            DbValue::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let DbValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(dt);
                }
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DbValue::Float(value) => Some(*value),
            DbValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let DbValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Length used for `StringLength` checks; `None` for non-text values.
    #[must_use]
    pub(crate) fn text_len(&self) -> Option<usize> {
        match self {
            DbValue::Text(s) => Some(s.chars().count()),
            _ => None,
        }
    }
}

impl From<i64> for DbValue {
    fn from(value: i64) -> Self {
        DbValue::Int(value)
    }
}

impl From<i32> for DbValue {
    fn from(value: i32) -> Self {
        DbValue::Int(i64::from(value))
    }
}

impl From<f64> for DbValue {
    fn from(value: f64) -> Self {
        DbValue::Float(value)
    }
}

impl From<bool> for DbValue {
    fn from(value: bool) -> Self {
        DbValue::Bool(value)
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<NaiveDateTime> for DbValue {
    fn from(value: NaiveDateTime) -> Self {
        DbValue::Timestamp(value)
    }
}

impl From<Vec<u8>> for DbValue {
    fn from(value: Vec<u8>) -> Self {
        DbValue::Blob(value)
    }
}

impl From<JsonValue> for DbValue {
    fn from(value: JsonValue) -> Self {
        DbValue::Json(value)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DbValue::Null, Into::into)
    }
}

/// Database provider behind an alias.
///
/// The set is closed: each variant owns a backend module that implements the
/// connection, command and result-set contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Microsoft SQL Server via tiberius
    #[serde(alias = "sqlserver")]
    Mssql,
    /// SAP/Sybase ASE via ODBC
    #[serde(alias = "ase")]
    Sybase,
    /// `SQLite` via rusqlite
    Sqlite,
}

impl Provider {
    #[must_use]
    pub fn dialect(self) -> SqlDialect {
        match self {
            Provider::Mssql => SqlDialect {
                provider: self,
                placeholders: PlaceholderStyle::AtNumbered,
            },
            Provider::Sybase => SqlDialect {
                provider: self,
                placeholders: PlaceholderStyle::Positional,
            },
            Provider::Sqlite => SqlDialect {
                provider: self,
                placeholders: PlaceholderStyle::QuestionNumbered,
            },
        }
    }

    /// Whether support for this provider was compiled in.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        match self {
            Provider::Mssql => cfg!(feature = "mssql"),
            Provider::Sybase => cfg!(feature = "sybase"),
            Provider::Sqlite => cfg!(feature = "sqlite"),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Provider::Mssql => "mssql",
            Provider::Sybase => "sybase",
            Provider::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

/// Placeholder syntax a provider's driver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `@P1`, `@P2`, ... (tiberius / `sp_executesql`).
    AtNumbered,
    /// `?1`, `?2`, ... (`SQLite`).
    QuestionNumbered,
    /// Bare `?`, bound strictly by position (ODBC).
    Positional,
}

impl PlaceholderStyle {
    /// Placeholder text for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            PlaceholderStyle::AtNumbered => format!("@P{index}"),
            PlaceholderStyle::QuestionNumbered => format!("?{index}"),
            PlaceholderStyle::Positional => "?".to_string(),
        }
    }

    #[must_use]
    pub fn is_positional(self) -> bool {
        matches!(self, PlaceholderStyle::Positional)
    }
}

/// SQL text conventions for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlDialect {
    pub provider: Provider,
    pub placeholders: PlaceholderStyle,
}

impl SqlDialect {
    /// Quote an identifier; dotted names are quoted per segment.
    #[must_use]
    pub fn quote(&self, ident: &str) -> String {
        ident
            .split('.')
            .map(|part| match self.provider {
                Provider::Mssql => format!("[{}]", part.replace(']', "]]")),
                Provider::Sqlite => format!("\"{}\"", part.replace('"', "\"\"")),
                // ASE only honours double quotes with quoted_identifier on.
                Provider::Sybase => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    #[must_use]
    pub fn begin_statement(&self) -> &'static str {
        match self.provider {
            Provider::Mssql | Provider::Sybase => "BEGIN TRANSACTION",
            Provider::Sqlite => "BEGIN",
        }
    }

    #[must_use]
    pub fn commit_statement(&self) -> &'static str {
        match self.provider {
            Provider::Mssql | Provider::Sybase => "COMMIT TRANSACTION",
            Provider::Sqlite => "COMMIT",
        }
    }

    #[must_use]
    pub fn rollback_statement(&self) -> &'static str {
        match self.provider {
            Provider::Mssql | Provider::Sybase => "ROLLBACK TRANSACTION",
            Provider::Sqlite => "ROLLBACK",
        }
    }

    #[must_use]
    pub fn supports_procedures(&self) -> bool {
        matches!(self.provider, Provider::Mssql | Provider::Sybase)
    }
}
