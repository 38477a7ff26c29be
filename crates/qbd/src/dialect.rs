//! Target SQL dialects.
//!
//! A [`Dialect`] decides three things about the rendered statement:
//!
//! - the placeholder style (`$1, $2, ...` for PostgreSQL, a repeated `?` for
//!   the MySQL family),
//! - the identifier quote character (`"` vs `` ` ``),
//! - whether a `RETURNING` clause is rendered (PostgreSQL only).
//!
//! MySQL and MariaDB are kept as distinct variants so callers can say what
//! they run, but they behave identically everywhere in this crate.

use crate::error::BuildError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Dialect {
    Postgres,
    MySql,
    MariaDb,
}

impl Dialect {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::MariaDb => "mariadb",
        }
    }

    /// True for MySQL and MariaDB.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Dialect::MySql | Dialect::MariaDb)
    }

    /// Identifier quote character.
    pub fn identifier_quote(self) -> char {
        match self {
            Dialect::Postgres => '"',
            Dialect::MySql | Dialect::MariaDb => '`',
        }
    }

    /// Whether `INSERT ... RETURNING` is rendered for this dialect.
    pub fn supports_returning(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Whether placeholders carry a 1-based position (`$N`).
    pub fn numbered_placeholders(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Default server port, used when a config omits one.
    pub fn default_port(self) -> u16 {
        match self {
            Dialect::Postgres => 5432,
            Dialect::MySql | Dialect::MariaDb => 3306,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "mariadb" => Ok(Dialect::MariaDb),
            _ => Err(BuildError::UnsupportedDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
