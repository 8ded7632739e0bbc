//! PostgreSQL gateway implementation

use crate::credentials::{DbCredentials, Endpoint};
use crate::error::{DbError, DbResult};
use crate::options::DbOptions;
use crate::traits::{Database, Transaction};
use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgQueryResult, PgSslMode};
use sqlx::{ConnectOptions, Executor, Postgres};
use std::future::Future;
use std::time::Duration;

/// Statement used to check a freshly opened pool
const PROBE_SQL: &str = "SELECT 1";

/// PostgreSQL gateway backed by a single-connection pool.
///
/// One connection keeps session state (`SET search_path`, temporary
/// tables) visible from one script to the next, matching the sequential
/// way scripts are applied.
pub struct PgGateway {
    pool: PgPool,
    timeout: Duration,
}

impl PgGateway {
    /// Connect with default options (30 second timeout, `DB_QUERY_DEBUG`
    /// controlling statement logging)
    pub async fn connect(credentials: &DbCredentials) -> DbResult<Self> {
        Self::connect_with_options(credentials, DbOptions::from_env()).await
    }

    /// Connect, then verify the server answers `SELECT 1`.
    ///
    /// On any failure nothing is retained and a [`DbError::ConnectionError`]
    /// is returned.
    pub async fn connect_with_options(
        credentials: &DbCredentials,
        options: DbOptions,
    ) -> DbResult<Self> {
        let endpoint = credentials.endpoint();
        log::debug!(
            "Connecting to {} database {} as {}",
            endpoint,
            credentials.database,
            credentials.user
        );

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(options.timeout)
            .connect_with(connect_options(credentials, &options))
            .await
            .map_err(|e| DbError::ConnectionError(format!("{endpoint}: {e}")))?;

        let probe = tokio::time::timeout(options.timeout, sqlx::raw_sql(PROBE_SQL).execute(&pool));
        let failure = match probe.await {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!("probe timed out after {:?}", options.timeout)),
        };
        if let Some(message) = failure {
            pool.close().await;
            return Err(DbError::ConnectionError(format!("{endpoint}: {message}")));
        }

        Ok(Self {
            pool,
            timeout: options.timeout,
        })
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool, waiting for the connection to be released
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Build driver options from credentials. TLS is always disabled.
pub(crate) fn connect_options(credentials: &DbCredentials, options: &DbOptions) -> PgConnectOptions {
    let base = PgConnectOptions::new()
        .username(&credentials.user)
        .password(&credentials.password)
        .database(&credentials.database)
        .ssl_mode(PgSslMode::Disable)
        .application_name("sqlrun");

    let base = match credentials.endpoint() {
        // The driver appends `.s.PGSQL.<port>` to the socket directory
        // itself; the configured TCP port is not used.
        Endpoint::Unix { path } => base.socket(path),
        Endpoint::Tcp { host, port } => base.host(&host).port(port),
    };

    if options.log_queries {
        base.log_statements(log::LevelFilter::Info)
    } else {
        base.disable_statement_logging()
    }
}

/// Await a driver future, bounded by `timeout`
async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, sqlx::Error>>,
) -> DbResult<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DbError::ExecutionError(e.to_string())),
        Err(_) => Err(DbError::Timeout(timeout)),
    }
}

/// Run a script on one concrete connection.
///
/// Goes through `Executor::execute` on `&mut PgConnection` directly; the
/// generic `RawSql::execute` future does not prove `Send` inside an
/// `#[async_trait]` body.
fn execute_on<'c>(
    conn: &'c mut PgConnection,
    sql: &'c str,
) -> BoxFuture<'c, Result<PgQueryResult, sqlx::Error>> {
    Executor::execute(conn, sqlx::raw_sql(sql))
}

#[async_trait]
impl Database for PgGateway {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        // raw_sql uses the simple-query protocol, so multi-statement
        // scripts are sent as-is
        bounded(self.timeout, sqlx::raw_sql(sql).execute(&self.pool)).await?;
        Ok(())
    }

    async fn begin(&self) -> DbResult<Box<dyn Transaction>> {
        let tx = match tokio::time::timeout(self.timeout, self.pool.begin()).await {
            Ok(Ok(tx)) => tx,
            Ok(Err(e)) => {
                return Err(DbError::TransactionError {
                    action: "begin",
                    message: e.to_string(),
                })
            }
            Err(_) => return Err(DbError::Timeout(self.timeout)),
        };
        Ok(Box::new(PgTransaction {
            tx,
            timeout: self.timeout,
        }))
    }

    fn db_type(&self) -> &'static str {
        "postgres"
    }
}

/// Open PostgreSQL transaction; rolled back on drop unless committed
struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
    timeout: Duration,
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        let conn: &mut PgConnection = &mut self.tx;
        bounded(self.timeout, execute_on(conn, sql)).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionError {
                action: "commit",
                message: e.to_string(),
            })
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionError {
                action: "rollback",
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
