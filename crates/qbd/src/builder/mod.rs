//! Statement builder.
//!
//! One [`QueryBuilder`] type covers all four statement kinds; the
//! [`Operation`] fixed at construction decides which chained methods are
//! legal and which assembler `build()` dispatches to.
//!
//! ## Design
//!
//! - Conditions are written with the dialect-neutral `?` marker and values are
//!   bound as [`Value`]s, so the same chain renders for PostgreSQL (`$1, $2`)
//!   and MySQL/MariaDB (`?`).
//! - Table and column names go through [`escape_identifier`]. JOIN `ON`
//!   predicates and the `RETURNING` clause are raw SQL supplied by the caller
//!   and are emitted verbatim; never build them from user input.
//! - The first error is kept and every later call is a no-op; `build()`
//!   returns that error instead of a partial statement.
//! - `build()` takes `&self` and never mutates the builder, so it can be
//!   called repeatedly with identical results.
//!
//! ## Example
//! ```
//! use qbd::{args, Dialect};
//! use qbd::builder::select;
//!
//! let q = select(Dialect::MySql, "t", &["a", "b"])
//!     .and_where("a = ?", args!["v"])
//!     .order_by("a", "DESC", None)
//!     .limit(10)
//!     .offset(3)
//!     .build()?;
//!
//! assert_eq!(q.sql(), "SELECT `a`, `b` FROM `t` WHERE a = ? ORDER BY `a` DESC LIMIT ? OFFSET ?");
//! assert_eq!(q.params(), &args!["v", 10, 3][..]);
//! # Ok::<(), qbd::BuildError>(())
//! ```

mod delete;
mod insert;
mod select;
mod update;

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::ident::escape_identifier;
use crate::placeholder::{
    count_markers, generate_placeholders, placeholder_list, translate_condition,
};
use crate::value::Value;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Statement kind a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Select => "SELECT",
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SELECT" => Ok(Operation::Select),
            "INSERT" => Ok(Operation::Insert),
            "UPDATE" => Ok(Operation::Update),
            "DELETE" => Ok(Operation::Delete),
            _ => Err(BuildError::UnsupportedOperation(s.to_string())),
        }
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    /// Normalize a caller-supplied direction.
    ///
    /// Case-insensitive `asc`/`desc` map to their variant; anything else is `Desc`.
    pub fn normalize(direction: &str) -> Self {
        match direction.to_ascii_uppercase().as_str() {
            "ASC" => SortDir::Asc,
            _ => SortDir::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Column used when an ORDER BY column is not in the caller's allow-list.
pub const FALLBACK_ORDER_COLUMN: &str = "id";

const SELECT_ONLY: &[Operation] = &[Operation::Select];
const FILTERABLE: &[Operation] = &[Operation::Select, Operation::Update, Operation::Delete];
const INSERT_ONLY: &[Operation] = &[Operation::Insert];
const UPDATE_ONLY: &[Operation] = &[Operation::Update];

fn function_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid built-in function name regex")
    })
}

/// Accumulated state for one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    dialect: Dialect,
    operation: Operation,
    /// Escaped table expression (may carry an alias)
    table: String,
    /// Escaped SELECT column expressions
    columns: Vec<String>,
    /// Columns were not given explicitly and are still the implicit `*`
    default_columns: bool,
    distinct: bool,
    joins: Vec<String>,
    /// WHERE fragments; numbered at render time
    conditions: Vec<Condition>,
    group_by: Vec<String>,
    /// HAVING fragments; numbered after WHERE at render time
    having: Vec<Condition>,
    having_args: Vec<Value>,
    order_by: Option<String>,
    limit: u64,
    offset: u64,
    /// WHERE-bound values, in placeholder order
    args: Vec<Value>,
    /// INSERT values / UPDATE SET pairs
    data: BTreeMap<String, Value>,
    returning: Option<String>,
    error: Option<BuildError>,
}

impl QueryBuilder {
    fn init(dialect: Dialect, operation: Operation, table: &str) -> Self {
        let mut qb = Self {
            dialect,
            operation,
            table: String::new(),
            columns: Vec::new(),
            default_columns: false,
            distinct: false,
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            having_args: Vec::new(),
            order_by: None,
            limit: 0,
            offset: 0,
            args: Vec::new(),
            data: BTreeMap::new(),
            returning: None,
            error: None,
        };
        match escape_identifier(dialect, table) {
            Ok(t) => qb.table = t,
            Err(e) => qb.error = Some(e),
        }
        qb
    }

    /// SELECT builder. An empty `columns` slice selects `*`.
    pub fn select(dialect: Dialect, table: &str, columns: &[&str]) -> Self {
        let mut qb = Self::init(dialect, Operation::Select, table);
        if columns.is_empty() {
            qb.columns.push("*".to_string());
            qb.default_columns = true;
            return qb;
        }
        if qb.error.is_none() {
            match escape_all(dialect, columns) {
                Ok(cols) => qb.columns = cols,
                Err(e) => qb.error = Some(e),
            }
        }
        qb
    }

    /// INSERT builder.
    pub fn insert(dialect: Dialect, table: &str) -> Self {
        Self::init(dialect, Operation::Insert, table)
    }

    /// UPDATE builder.
    pub fn update(dialect: Dialect, table: &str) -> Self {
        Self::init(dialect, Operation::Update, table)
    }

    /// DELETE builder.
    pub fn delete(dialect: Dialect, table: &str) -> Self {
        Self::init(dialect, Operation::Delete, table)
    }

    /// Builder for an operation given by name (`"select"`, `"UPDATE"`, ...).
    ///
    /// An unknown name is captured as [`BuildError::UnsupportedOperation`] and
    /// returned from `build()`, unless the table name already failed to escape.
    pub fn new(dialect: Dialect, operation: &str, table: &str) -> Self {
        match operation.parse::<Operation>() {
            Ok(Operation::Select) => Self::select(dialect, table, &[]),
            Ok(op) => Self::init(dialect, op, table),
            Err(e) => {
                let mut qb = Self::init(dialect, Operation::Select, table);
                if qb.error.is_none() {
                    qb.error = Some(e);
                }
                qb
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The captured error, if any.
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// Run `f` unless an error is already captured or `method` is not legal for
    /// this operation. An error returned by `f` becomes the captured error.
    ///
    /// `f` must finish every fallible step before it mutates the builder.
    fn apply<F>(mut self, method: &'static str, allowed: &[Operation], f: F) -> Self
    where
        F: FnOnce(&mut Self) -> BuildResult<()>,
    {
        if self.error.is_some() {
            return self;
        }
        if !allowed.contains(&self.operation) {
            self.error = Some(BuildError::WrongSetterForOperation {
                method,
                operation: self.operation,
            });
            return self;
        }
        if let Err(e) = f(&mut self) {
            self.error = Some(e);
        }
        self
    }

    // ==================== SELECT shape ====================

    /// Render `SELECT DISTINCT`.
    pub fn distinct(self) -> Self {
        self.apply("distinct", SELECT_ONLY, |qb| {
            qb.distinct = true;
            Ok(())
        })
    }

    /// Add an aggregate column such as `COUNT(*)` or `SUM("total")`.
    ///
    /// `function` is emitted unquoted and must be a plain identifier. On a
    /// builder created without explicit columns, the first aggregate replaces
    /// the implicit `*`.
    pub fn aggregate(self, function: &str, column: &str) -> Self {
        self.apply("aggregate", SELECT_ONLY, |qb| {
            if !function_name_re().is_match(function) {
                return Err(BuildError::InvalidFunctionName(function.to_string()));
            }
            let col = escape_identifier(qb.dialect, column)?;
            let expr = format!("{function}({col})");
            if qb.default_columns {
                qb.columns = vec![expr];
                qb.default_columns = false;
            } else {
                qb.columns.push(expr);
            }
            Ok(())
        })
    }

    /// Add `LEFT JOIN table ON on`. `on` is trusted raw SQL.
    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.join("left_join", "LEFT JOIN", table, on)
    }

    /// Add `INNER JOIN table ON on`. `on` is trusted raw SQL.
    pub fn inner_join(self, table: &str, on: &str) -> Self {
        self.join("inner_join", "INNER JOIN", table, on)
    }

    /// Add `RIGHT JOIN table ON on`. `on` is trusted raw SQL.
    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.join("right_join", "RIGHT JOIN", table, on)
    }

    fn join(self, method: &'static str, kind: &str, table: &str, on: &str) -> Self {
        self.apply(method, SELECT_ONLY, |qb| {
            let t = escape_identifier(qb.dialect, table)?;
            qb.joins.push(format!("{kind} {t} ON {on}"));
            Ok(())
        })
    }

    // ==================== Conditions ====================

    /// AND a condition written with `?` markers, one per value in `args`.
    pub fn and_where(self, condition: &str, args: Vec<Value>) -> Self {
        self.apply("and_where", FILTERABLE, |qb| {
            check_arg_count(condition, args.len())?;
            qb.conditions.push(Condition::Expr(condition.to_string()));
            qb.args.extend(args);
            Ok(())
        })
    }

    /// AND `column IN (...)` with one placeholder per value.
    ///
    /// An empty list renders the always-false `1=0`.
    pub fn where_in(self, column: &str, values: Vec<Value>) -> Self {
        self.apply("where_in", FILTERABLE, |qb| {
            let col = escape_identifier(qb.dialect, column)?;
            if values.is_empty() {
                qb.conditions.push(Condition::Never);
                return Ok(());
            }
            qb.conditions.push(Condition::In {
                column: col,
                len: values.len(),
            });
            qb.args.extend(values);
            Ok(())
        })
    }

    /// AND `column BETWEEN start AND end`.
    pub fn where_between(
        self,
        column: &str,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        self.apply("where_between", FILTERABLE, |qb| {
            let col = escape_identifier(qb.dialect, column)?;
            qb.conditions.push(Condition::Between(col));
            qb.args.push(start.into());
            qb.args.push(end.into());
            Ok(())
        })
    }

    // ==================== Grouping / ordering ====================

    pub fn group_by(self, columns: &[&str]) -> Self {
        self.apply("group_by", SELECT_ONLY, |qb| {
            let cols = escape_all(qb.dialect, columns)?;
            qb.group_by.extend(cols);
            Ok(())
        })
    }

    /// AND a HAVING condition with `?` markers.
    ///
    /// HAVING values are bound after every WHERE value regardless of call order.
    pub fn having(self, condition: &str, args: Vec<Value>) -> Self {
        self.apply("having", SELECT_ONLY, |qb| {
            check_arg_count(condition, args.len())?;
            qb.having.push(Condition::Expr(condition.to_string()));
            qb.having_args.extend(args);
            Ok(())
        })
    }

    /// Set `ORDER BY column direction`; the last call wins.
    ///
    /// With `allowed`, a column outside the list is replaced by `id`.
    /// `direction` is normalized with [`SortDir::normalize`].
    pub fn order_by(self, column: &str, direction: &str, allowed: Option<&[&str]>) -> Self {
        let column = match allowed {
            Some(list) if !list.contains(&column) => FALLBACK_ORDER_COLUMN,
            _ => column,
        };
        self.order("order_by", column, direction)
    }

    /// Order by a caller-requested column when it is non-empty and allowed,
    /// else by `default`.
    pub fn dynamic_order_by(
        self,
        requested: &str,
        default: &str,
        direction: &str,
        allowed: &[&str],
    ) -> Self {
        let column = if !requested.is_empty() && allowed.contains(&requested) {
            requested
        } else {
            default
        };
        self.order("dynamic_order_by", column, direction)
    }

    fn order(self, method: &'static str, column: &str, direction: &str) -> Self {
        self.apply(method, SELECT_ONLY, |qb| {
            let col = escape_identifier(qb.dialect, column)?;
            qb.order_by = Some(format!("{col} {}", SortDir::normalize(direction)));
            Ok(())
        })
    }

    /// `LIMIT n`; 0 omits the clause.
    pub fn limit(self, n: u64) -> Self {
        self.apply("limit", SELECT_ONLY, |qb| {
            qb.limit = n;
            Ok(())
        })
    }

    /// `OFFSET n`; 0 omits the clause.
    pub fn offset(self, n: u64) -> Self {
        self.apply("offset", SELECT_ONLY, |qb| {
            qb.offset = n;
            Ok(())
        })
    }

    // ==================== Payloads ====================

    /// INSERT column/value pairs. Repeated calls merge; later keys win.
    pub fn values<I, K, V>(self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.apply("values", INSERT_ONLY, |qb| {
            merge_data(qb, data);
            Ok(())
        })
    }

    /// UPDATE SET column/value pairs. Repeated calls merge; later keys win.
    pub fn set<I, K, V>(self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.apply("set", UPDATE_ONLY, |qb| {
            merge_data(qb, data);
            Ok(())
        })
    }

    /// `RETURNING clause` for INSERT, rendered for PostgreSQL only.
    ///
    /// `clause` is trusted raw SQL.
    pub fn returning(self, clause: &str) -> Self {
        self.apply("returning", INSERT_ONLY, |qb| {
            qb.returning = Some(clause.to_string());
            Ok(())
        })
    }

    // ==================== Build ====================

    /// Render the statement and its ordered parameters.
    pub fn build(&self) -> BuildResult<BuiltQuery> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.operation {
            Operation::Select => self.build_select(),
            Operation::Insert => self.build_insert(),
            Operation::Update => self.build_update(),
            Operation::Delete => self.build_delete(),
        }
    }

    /// ` WHERE a AND b`, or nothing. The first WHERE placeholder is `start`.
    fn push_where(&self, sql: &mut String, start: usize) -> BuildResult<()> {
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&render_conditions(self.dialect, &self.conditions, start)?);
        }
        Ok(())
    }
}

/// A WHERE or HAVING fragment, kept unnumbered until the statement is
/// rendered so the same fragment can follow SET values in UPDATE.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// Caller-written SQL with `?` markers
    Expr(String),
    In { column: String, len: usize },
    Between(String),
    /// `IN` over an empty list
    Never,
}

impl Condition {
    fn markers(&self) -> usize {
        match self {
            Condition::Expr(text) => count_markers(text),
            Condition::In { len, .. } => *len,
            Condition::Between(_) => 2,
            Condition::Never => 0,
        }
    }

    fn render(&self, dialect: Dialect, start: usize) -> BuildResult<String> {
        Ok(match self {
            Condition::Expr(text) => translate_condition(dialect, text, start),
            Condition::In { column, len } => {
                format!("{column} IN ({})", generate_placeholders(dialect, start, *len))
            }
            Condition::Between(column) => {
                let list = placeholder_list(dialect, start, 2);
                let got = list.len();
                let [lo, hi]: [String; 2] = list
                    .try_into()
                    .map_err(|_| BuildError::PlaceholderGeneration { expected: 2, got })?;
                format!("{column} BETWEEN {lo} AND {hi}")
            }
            Condition::Never => "1=0".to_string(),
        })
    }
}

/// Render `conditions` joined with `AND`, numbering from `start`.
fn render_conditions(
    dialect: Dialect,
    conditions: &[Condition],
    start: usize,
) -> BuildResult<String> {
    let mut next = start;
    let mut parts = Vec::with_capacity(conditions.len());
    for cond in conditions {
        parts.push(cond.render(dialect, next)?);
        next += cond.markers();
    }
    Ok(parts.join(" AND "))
}

fn escape_all(dialect: Dialect, names: &[&str]) -> BuildResult<Vec<String>> {
    names.iter().map(|n| escape_identifier(dialect, n)).collect()
}

fn check_arg_count(condition: &str, args: usize) -> BuildResult<()> {
    let markers = count_markers(condition);
    if markers != args {
        return Err(BuildError::ArgumentCountMismatch {
            condition: condition.to_string(),
            markers,
            args,
        });
    }
    Ok(())
}

fn merge_data<I, K, V>(qb: &mut QueryBuilder, data: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    qb.data.extend(data.into_iter().map(|(k, v)| (k.into(), v.into())));
}

/// SELECT builder. An empty `columns` slice selects `*`.
pub fn select(dialect: Dialect, table: &str, columns: &[&str]) -> QueryBuilder {
    QueryBuilder::select(dialect, table, columns)
}

/// INSERT builder.
pub fn insert(dialect: Dialect, table: &str) -> QueryBuilder {
    QueryBuilder::insert(dialect, table)
}

/// UPDATE builder.
pub fn update(dialect: Dialect, table: &str) -> QueryBuilder {
    QueryBuilder::update(dialect, table)
}

/// DELETE builder.
pub fn delete(dialect: Dialect, table: &str) -> QueryBuilder {
    QueryBuilder::delete(dialect, table)
}

/// A rendered statement: SQL text, parameters in placeholder order, and the
/// dialect it was rendered for.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    sql: String,
    params: Vec<Value>,
    dialect: Dialect,
}

impl BuiltQuery {
    pub(crate) fn new(sql: String, params: Vec<Value>, dialect: Dialect) -> Self {
        Self {
            sql,
            params,
            dialect,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl fmt::Display for BuiltQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
