//! PostgreSQL execution for built statements.
//!
//! [`GenericClient`] lets the helpers on [`BuiltQuery`] accept a plain
//! connection, a transaction, or a pooled client. Only statements rendered for
//! [`Dialect::Postgres`] can be run here; MySQL/MariaDB output is meant for a
//! driver of the caller's choosing via [`BuiltQuery::into_parts`].

use crate::builder::BuiltQuery;
use crate::dialect::Dialect;
use crate::error::{QbError, QbResult};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = QbResult<Vec<Row>>> + Send;

    /// Execute a query and return the first row, if any.
    ///
    /// Extra rows are ignored.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = QbResult<Option<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = QbResult<u64>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Vec<Row>> {
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Option<Row>> {
        let rows = GenericClient::query(self, sql, params).await?;
        Ok(rows.into_iter().next())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, params).await?)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Vec<Row>> {
        Ok(tokio_postgres::Transaction::query(self, sql, params).await?)
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Option<Row>> {
        let rows = GenericClient::query(self, sql, params).await?;
        Ok(rows.into_iter().next())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, sql, params).await?)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::ClientWrapper {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Vec<Row>> {
        GenericClient::query(&**self, sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Option<Row>> {
        GenericClient::query_opt(&**self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<u64> {
        GenericClient::execute(&**self, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper).
        GenericClient::query(&**self, sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Option<Row>> {
        GenericClient::query_opt(&**self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<u64> {
        GenericClient::execute(&**self, sql, params).await
    }
}

// ===== BuiltQuery execution =====

impl BuiltQuery {
    /// Borrow the parameters for tokio-postgres, refusing non-PostgreSQL output.
    fn pg_params(&self) -> QbResult<Vec<&(dyn ToSql + Sync)>> {
        if self.dialect() != Dialect::Postgres {
            return Err(QbError::DialectMismatch {
                expected: Dialect::Postgres,
                found: self.dialect(),
            });
        }
        Ok(self
            .params()
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect())
    }

    /// Execute and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> QbResult<Vec<Row>> {
        let params = self.pg_params()?;
        trace_sql(self);
        conn.query(self.sql(), &params)
            .await
            .inspect_err(|e| trace_failure(self, e))
    }

    /// Execute and return the first row.
    ///
    /// Returns [`QbError::NotFound`] if the statement produced no rows.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> QbResult<Row> {
        self.fetch_opt(conn)
            .await?
            .ok_or_else(|| QbError::not_found("Expected one row, got none"))
    }

    /// Execute and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> QbResult<Option<Row>> {
        let params = self.pg_params()?;
        trace_sql(self);
        conn.query_opt(self.sql(), &params)
            .await
            .inspect_err(|e| trace_failure(self, e))
    }

    /// Execute and return the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> QbResult<u64> {
        let params = self.pg_params()?;
        trace_sql(self);
        conn.execute(self.sql(), &params)
            .await
            .inspect_err(|e| trace_failure(self, e))
    }
}

#[cfg(feature = "tracing")]
fn trace_sql(q: &BuiltQuery) {
    tracing::debug!(
        target: "qbd.sql",
        dialect = %q.dialect(),
        params = q.params().len(),
        sql = %q.sql(),
        "executing statement"
    );
}

#[cfg(feature = "tracing")]
fn trace_failure(q: &BuiltQuery, err: &QbError) {
    tracing::warn!(target: "qbd.sql", sql = %q.sql(), error = %err, "statement failed");
}

#[cfg(not(feature = "tracing"))]
fn trace_sql(_q: &BuiltQuery) {}

#[cfg(not(feature = "tracing"))]
fn trace_failure(_q: &BuiltQuery, _err: &QbError) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::builder::{delete, select};
    use std::sync::Mutex;

    /// Records what it was asked to run and returns no rows.
    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl RecordingClient {
        fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
            self.calls.lock().unwrap().push((sql.to_string(), params.len()));
        }
    }

    impl GenericClient for RecordingClient {
        async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<Vec<Row>> {
            self.record(sql, params);
            Ok(Vec::new())
        }

        async fn query_opt(
            &self,
            sql: &str,
            params: &[&(dyn ToSql + Sync)],
        ) -> QbResult<Option<Row>> {
            self.record(sql, params);
            Ok(None)
        }

        async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> QbResult<u64> {
            self.record(sql, params);
            Ok(3)
        }
    }

    #[tokio::test]
    async fn mysql_statements_are_refused_before_execution() {
        let client = RecordingClient::default();
        let q = select(Dialect::MySql, "t", &[]).build().unwrap();

        let err = q.fetch_all(&client).await.unwrap_err();
        assert!(matches!(
            err,
            QbError::DialectMismatch {
                expected: Dialect::Postgres,
                found: Dialect::MySql
            }
        ));
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn postgres_statements_pass_sql_and_params() {
        let client = RecordingClient::default();
        let q = delete(Dialect::Postgres, "t")
            .and_where("id = ? OR id = ?", args![1, 2])
            .build()
            .unwrap();

        assert_eq!(q.execute(&client).await.unwrap(), 3);
        assert_eq!(
            client.calls.lock().unwrap().as_slice(),
            &[(r#"DELETE FROM "t" WHERE id = $1 OR id = $2"#.to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn fetch_one_maps_empty_result_to_not_found() {
        let client = RecordingClient::default();
        let q = select(Dialect::Postgres, "t", &[]).build().unwrap();

        assert!(q.fetch_opt(&client).await.unwrap().is_none());
        assert!(q.fetch_one(&client).await.unwrap_err().is_not_found());
        assert!(q.fetch_all(&client).await.unwrap().is_empty());
    }
}
