use super::{BuiltQuery, QueryBuilder, render_conditions};
use crate::value::Value;
use crate::error::BuildResult;
use crate::placeholder::placeholder;

impl QueryBuilder {
    /// `SELECT [DISTINCT] cols FROM table [joins] [WHERE] [GROUP BY] [HAVING]
    /// [ORDER BY] [LIMIT] [OFFSET]`
    pub(super) fn build_select(&self) -> BuildResult<BuiltQuery> {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        if !self.joins.is_empty() {
            sql.push(' ');
            sql.push_str(&self.joins.join(" "));
        }

        self.push_where(&mut sql, 1)?;
        let mut params = self.args.clone();

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&render_conditions(self.dialect, &self.having, params.len() + 1)?);
            params.extend(self.having_args.iter().cloned());
        }

        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        if self.limit > 0 {
            sql.push_str(" LIMIT ");
            sql.push_str(&placeholder(self.dialect, params.len() + 1));
            params.push(Value::from(self.limit));
        }
        if self.offset > 0 {
            sql.push_str(" OFFSET ");
            sql.push_str(&placeholder(self.dialect, params.len() + 1));
            params.push(Value::from(self.offset));
        }

        Ok(BuiltQuery::new(sql, params, self.dialect))
    }
}
