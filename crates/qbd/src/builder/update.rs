use super::{BuiltQuery, QueryBuilder};
use crate::error::{BuildError, BuildResult};
use crate::ident::escape_identifier;
use crate::placeholder::placeholder;

impl QueryBuilder {
    /// `UPDATE table SET a = p1, b = p2 [WHERE ...]`
    ///
    /// SET values bind first, in key order; WHERE placeholders are numbered
    /// after them.
    pub(super) fn build_update(&self) -> BuildResult<BuiltQuery> {
        if self.data.is_empty() {
            return Err(BuildError::NoDataForUpdate);
        }

        let set = self
            .data
            .keys()
            .enumerate()
            .map(|(i, k)| {
                let col = escape_identifier(self.dialect, k)?;
                Ok(format!("{col} = {}", placeholder(self.dialect, i + 1)))
            })
            .collect::<BuildResult<Vec<_>>>()?;

        let mut sql = format!("UPDATE {} SET {}", self.table, set.join(", "));
        self.push_where(&mut sql, self.data.len() + 1)?;

        let mut params = Vec::with_capacity(self.data.len() + self.args.len());
        params.extend(self.data.values().cloned());
        params.extend(self.args.iter().cloned());

        Ok(BuiltQuery::new(sql, params, self.dialect))
    }
}
