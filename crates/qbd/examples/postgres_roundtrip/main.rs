//! Builds statements with qbd and runs them through a deadpool-postgres pool.
//!
//! Run with:
//!   cargo run --example postgres_roundtrip -p qbd
//!
//! Requires a reachable database described by `QBD_*` variables (a `.env`
//! file works too):
//!   QBD_DIALECT=postgres QBD_USER=postgres QBD_PASSWORD=postgres
//!   QBD_HOST=localhost QBD_DATABASE=qbd_example

use qbd::builder::{delete, insert, select, update};
use qbd::{DbConfig, Dialect, QbResult, args, create_pool};

#[tokio::main]
async fn main() -> QbResult<()> {
    dotenvy::dotenv().ok();

    let config = match DbConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            println!("{e}; skipping DB execution.");
            return Ok(());
        }
    };

    let pool = create_pool(&config)?;
    let client = pool.get().await?;

    client
        .batch_execute(
            "DROP TABLE IF EXISTS products;
             CREATE TABLE products (
                 id BIGSERIAL PRIMARY KEY,
                 name TEXT NOT NULL,
                 price BIGINT NOT NULL,
                 stock INTEGER NOT NULL DEFAULT 0
             )",
        )
        .await?;

    for (name, price, stock) in [("keyboard", 4900, 12), ("mouse", 1900, 40), ("monitor", 18900, 3)] {
        let row = insert(Dialect::Postgres, "products")
            .values(vec![
                ("name", qbd::Value::from(name)),
                ("price", qbd::Value::from(price)),
                ("stock", qbd::Value::from(stock)),
            ])
            .returning("id")
            .build()?
            .fetch_one(&client)
            .await?;
        let id: i64 = row.try_get("id")?;
        println!("inserted {name} as id={id}");
    }

    let affected = update(Dialect::Postgres, "products")
        .set([("stock", 0)])
        .and_where("price > ?", args![10000])
        .build()?
        .execute(&client)
        .await?;
    println!("marked {affected} product(s) out of stock");

    let q = select(Dialect::Postgres, "products", &["name", "price", "stock"])
        .where_between("price", 1000, 20000)
        .order_by("price", "asc", Some(&["name", "price"][..]))
        .limit(10)
        .build()?;
    println!("\n{q}");
    for row in q.fetch_all(&client).await? {
        let name: String = row.try_get("name")?;
        let price: i64 = row.try_get("price")?;
        let stock: i32 = row.try_get("stock")?;
        println!("- {name}: {price} ({stock} in stock)");
    }

    let removed = delete(Dialect::Postgres, "products")
        .where_in("name", args!["mouse"])
        .build()?
        .execute(&client)
        .await?;
    println!("\nremoved {removed} product(s)");

    Ok(())
}
