//! Dialect-aware SQL identifier escaping.
//!
//! [`escape_identifier`] turns a caller-supplied table or column name into its
//! final quoted form. Besides plain names it understands three shapes:
//!
//! - `*` is passed through untouched (wildcard column)
//! - `table alias` / `table AS alias` quotes the table and keeps the alias
//! - `qualifier.column` quotes the column and keeps the qualifier
//!
//! Embedded quote characters are doubled, so the result is always a single
//! well-formed identifier token (plus the verbatim alias/qualifier).
//!
//! # Example
//! ```
//! use qbd::{Dialect, escape_identifier};
//!
//! assert_eq!(escape_identifier(Dialect::Postgres, "users")?, r#""users""#);
//! assert_eq!(escape_identifier(Dialect::MySql, "users u")?, "`users` u");
//! assert_eq!(escape_identifier(Dialect::Postgres, "u.name")?, r#"u."name""#);
//! # Ok::<(), qbd::BuildError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};

/// Escape a table or column name for `dialect`.
///
/// Alias and qualifier tokens are emitted verbatim; only the identifier part
/// is quoted.
pub fn escape_identifier(dialect: Dialect, name: &str) -> BuildResult<String> {
    if name == "*" {
        return Ok(name.to_string());
    }
    if name.is_empty() {
        return Err(BuildError::EmptyIdentifier);
    }

    if name.contains(' ') {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        return match tokens.as_slice() {
            [table, kw, alias] if kw.eq_ignore_ascii_case("as") => {
                Ok(format!("{} AS {}", escape_qualified(dialect, table)?, alias))
            }
            [table, alias] => Ok(format!("{} {}", escape_qualified(dialect, table)?, alias)),
            _ => Ok(quote(dialect, name)),
        };
    }

    escape_qualified(dialect, name)
}

/// `qualifier.column` => `qualifier."column"`; anything without a dot is quoted whole.
fn escape_qualified(dialect: Dialect, name: &str) -> BuildResult<String> {
    let Some((qualifier, column)) = name.rsplit_once('.') else {
        return Ok(quote(dialect, name));
    };
    if qualifier.is_empty() || column.is_empty() {
        return Err(BuildError::EmptyIdentifier);
    }
    if column == "*" {
        return Ok(name.to_string());
    }
    Ok(format!("{}.{}", qualifier, quote(dialect, column)))
}

/// Wrap in the dialect's quote character, doubling embedded quotes.
fn quote(dialect: Dialect, name: &str) -> String {
    let q = dialect.identifier_quote();
    let mut out = String::with_capacity(name.len() + 2);
    out.push(q);
    for c in name.chars() {
        if c == q {
            out.push(q);
        }
        out.push(c);
    }
    out.push(q);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_quoted() {
        assert_eq!(escape_identifier(Dialect::Postgres, "users").unwrap(), "\"users\"");
        assert_eq!(escape_identifier(Dialect::MySql, "users").unwrap(), "`users`");
        assert_eq!(escape_identifier(Dialect::MariaDb, "users").unwrap(), "`users`");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(escape_identifier(Dialect::Postgres, "a\"b").unwrap(), "\"a\"\"b\"");
        assert_eq!(escape_identifier(Dialect::MySql, "a`b").unwrap(), "`a``b`");
        // The other dialect's quote is just a character.
        assert_eq!(escape_identifier(Dialect::MySql, "a\"b").unwrap(), "`a\"b`");
    }

    #[test]
    fn wildcard_passes_through() {
        assert_eq!(escape_identifier(Dialect::Postgres, "*").unwrap(), "*");
        assert_eq!(escape_identifier(Dialect::MySql, "u.*").unwrap(), "u.*");
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(escape_identifier(Dialect::Postgres, ""), Err(BuildError::EmptyIdentifier));
        assert_eq!(escape_identifier(Dialect::Postgres, "u."), Err(BuildError::EmptyIdentifier));
        assert_eq!(escape_identifier(Dialect::MySql, ".id"), Err(BuildError::EmptyIdentifier));
    }

    #[test]
    fn alias_forms() {
        assert_eq!(escape_identifier(Dialect::Postgres, "users u").unwrap(), "\"users\" u");
        assert_eq!(
            escape_identifier(Dialect::Postgres, "users AS u").unwrap(),
            "\"users\" AS u"
        );
        assert_eq!(escape_identifier(Dialect::MySql, "users as u").unwrap(), "`users` AS u");
        assert_eq!(
            escape_identifier(Dialect::Postgres, "public.users u").unwrap(),
            "public.\"users\" u"
        );
    }

    #[test]
    fn unrecognised_spaced_names_are_one_identifier() {
        assert_eq!(
            escape_identifier(Dialect::Postgres, "order line item").unwrap(),
            "\"order line item\""
        );
    }

    #[test]
    fn qualified_column_keeps_qualifier() {
        assert_eq!(escape_identifier(Dialect::Postgres, "u.name").unwrap(), "u.\"name\"");
        assert_eq!(escape_identifier(Dialect::MySql, "db.t.col").unwrap(), "db.t.`col`");
    }
}
