use super::{BuiltQuery, QueryBuilder};
use crate::error::{BuildError, BuildResult};
use crate::ident::escape_identifier;
use crate::placeholder::generate_placeholders;

impl QueryBuilder {
    /// `INSERT INTO table (cols) VALUES (...) [RETURNING ...]`
    ///
    /// Columns come out in key order.
    pub(super) fn build_insert(&self) -> BuildResult<BuiltQuery> {
        if self.data.is_empty() {
            return Err(BuildError::NoDataForInsert);
        }

        let cols = self
            .data
            .keys()
            .map(|k| escape_identifier(self.dialect, k))
            .collect::<BuildResult<Vec<_>>>()?;
        let params = self.data.values().cloned().collect::<Vec<_>>();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            cols.join(", "),
            generate_placeholders(self.dialect, 1, params.len())
        );

        if let Some(returning) = &self.returning {
            if self.dialect.supports_returning() {
                sql.push_str(" RETURNING ");
                sql.push_str(returning);
            }
        }

        Ok(BuiltQuery::new(sql, params, self.dialect))
    }
}
