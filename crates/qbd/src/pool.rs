//! Connection pool utilities

use crate::config::DbConfig;
use crate::dialect::Dialect;
use crate::error::{QbError, QbResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::{NoTls, Socket};

/// Create a PostgreSQL connection pool from a [`DbConfig`].
///
/// The pool holds at most [`DbConfig::max_connections`] clients and uses
/// `NoTls`. Connections are opened lazily, so this does not touch the network.
///
/// Returns [`QbError::DialectMismatch`] for MySQL/MariaDB configs and
/// [`QbError::Config`] for `ssl_mode = "require"`, which needs a TLS
/// connector; use [`create_pool_with_tls`] for that.
///
/// # Example
///
/// ```ignore
/// let cfg = qbd::DbConfig::load("qbd.toml")?;
/// let pool = qbd::create_pool(&cfg)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &DbConfig) -> QbResult<Pool> {
    if config.ssl_mode == "require" {
        return Err(QbError::config(
            "ssl_mode 'require' needs a TLS connector (see create_pool_with_tls)",
        ));
    }
    create_pool_with_tls(config, NoTls)
}

/// Create a PostgreSQL connection pool using a custom TLS connector.
pub fn create_pool_with_tls<T>(config: &DbConfig, tls: T) -> QbResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    if config.dialect != Dialect::Postgres {
        return Err(QbError::DialectMismatch {
            expected: Dialect::Postgres,
            found: config.dialect,
        });
    }

    let pg_config: tokio_postgres::Config = config
        .connection_url()?
        .parse()
        .map_err(|e: tokio_postgres::Error| QbError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, tls, default_manager_config());
    Pool::builder(mgr)
        .max_size(config.max_connections())
        .build()
        .map_err(|e| QbError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
