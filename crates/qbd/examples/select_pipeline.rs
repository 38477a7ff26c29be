//! Renders the same statements for PostgreSQL and MySQL side by side.
//!
//! Run with:
//!   cargo run --example select_pipeline -p qbd

use qbd::builder::{delete, insert, select, update};
use qbd::{BuildResult, BuiltQuery, Dialect, args};

const SORTABLE: &[&str] = &["name", "created_at", "total"];

fn report(dialect: Dialect, sort_by: Option<&str>) -> BuildResult<BuiltQuery> {
    select(dialect, "orders o", &["o.user_id"])
        .aggregate("SUM", "o.total")
        .inner_join("users u", "u.id = o.user_id")
        .and_where("o.status = ?", args!["paid"])
        .where_between("o.created_at", "2024-01-01", "2024-12-31")
        .group_by(&["o.user_id"])
        .having("SUM(o.total) > ?", args![1000])
        .dynamic_order_by(sort_by.unwrap_or_default(), "total", "desc", SORTABLE)
        .limit(20)
        .offset(40)
        .build()
}

fn print(label: &str, q: &BuiltQuery) {
    println!("[{} {label}]\n  {}\n  params = {:?}\n", q.dialect(), q.sql(), q.params());
}

fn main() -> BuildResult<()> {
    for dialect in [Dialect::Postgres, Dialect::MySql] {
        print("report", &report(dialect, Some("name"))?);

        let q = insert(dialect, "users")
            .values(vec![
                ("name", qbd::Value::from("alice")),
                ("email", qbd::Value::from("alice@example.com")),
                ("age", qbd::Value::from(31)),
            ])
            .returning("id")
            .build()?;
        print("insert", &q);

        let q = update(dialect, "users")
            .set([("status", "inactive")])
            .and_where("last_login < ?", args!["2023-01-01"])
            .where_in("role", args!["guest", "trial"])
            .build()?;
        print("update", &q);

        let q = delete(dialect, "sessions")
            .and_where("expires_at < ?", args!["2024-06-01"])
            .build()?;
        print("delete", &q);
    }

    // Errors surface once, at build time.
    let err = update(Dialect::Postgres, "users")
        .values([("name", "bob")])
        .set([("name", "bob")])
        .build()
        .unwrap_err();
    println!("expected error: {err}");

    Ok(())
}
