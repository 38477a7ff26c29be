use super::{BuiltQuery, QueryBuilder};
use crate::error::BuildResult;

impl QueryBuilder {
    /// `DELETE FROM table [WHERE ...]`
    pub(super) fn build_delete(&self) -> BuildResult<BuiltQuery> {
        let mut sql = format!("DELETE FROM {}", self.table);
        self.push_where(&mut sql, 1)?;
        Ok(BuiltQuery::new(sql, self.args.clone(), self.dialect))
    }
}
