//! # qbd
//!
//! A dialect-aware, parameter-safe SQL statement builder for PostgreSQL and
//! MySQL/MariaDB.
//!
//! ## Features
//!
//! - **One chain, two dialects**: write conditions with `?`; PostgreSQL output
//!   gets `$1, $2, ...`, MySQL/MariaDB output keeps `?`
//! - **Escaped identifiers**: tables and columns are quoted per dialect, with
//!   alias (`users u`) and qualifier (`u.name`) handling
//! - **Deterministic output**: INSERT/UPDATE columns render in key order
//! - **First error wins**: a failed call makes the rest of the chain inert and
//!   `build()` returns that error
//! - **PostgreSQL execution**: run a [`BuiltQuery`] through any [`GenericClient`]
//!
//! ## Example
//!
//! ```
//! use qbd::{args, Dialect};
//! use qbd::builder::{select, update};
//!
//! let q = select(Dialect::Postgres, "users u", &["u.id", "u.name"])
//!     .and_where("u.status = ?", args!["active"])
//!     .where_in("u.role_id", args![1, 2])
//!     .order_by("name", "asc", Some(&["name", "created_at"][..]))
//!     .limit(20)
//!     .build()?;
//! assert_eq!(
//!     q.sql(),
//!     r#"SELECT u."id", u."name" FROM "users" u WHERE u.status = $1 AND u."role_id" IN ($2, $3) ORDER BY "name" ASC LIMIT $4"#
//! );
//!
//! let q = update(Dialect::MySql, "users")
//!     .set([("status", "inactive")])
//!     .and_where("id = ?", args![42])
//!     .build()?;
//! assert_eq!(q.sql(), "UPDATE `users` SET `status` = ? WHERE id = ?");
//! # Ok::<(), qbd::BuildError>(())
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod placeholder;
pub mod value;

pub use builder::{BuiltQuery, Operation, QueryBuilder, SortDir};
pub use client::GenericClient;
pub use config::DbConfig;
pub use dialect::Dialect;
pub use error::{BuildError, BuildResult, QbError, QbResult};
pub use ident::escape_identifier;
pub use placeholder::{
    count_markers, generate_placeholders, placeholder, placeholder_list, shift_placeholders,
    translate_condition,
};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_tls};
