use std::fmt;

use bon::Builder;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, info, warn};

use crate::error::ImportError;

#[derive(Builder, Clone, PartialEq)]
#[builder(on(String, into))]
pub struct QueryParams {
    pub database: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub query: String,
}

impl fmt::Debug for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParams")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("query", &self.query)
            .finish()
    }
}

#[allow(async_fn_in_trait)]
pub trait Warehouse {
    type Connection: WarehouseConnection;

    async fn connect(&self, params: &QueryParams) -> Result<Self::Connection, ImportError>;
}

#[allow(async_fn_in_trait)]
pub trait WarehouseConnection {
    /// Runs `query` as one simple-protocol batch; multiple statements allowed.
    async fn execute(&mut self, query: &str) -> Result<(), ImportError>;

    async fn close(self) -> Result<(), ImportError>;
}

/// Redshift over the PostgreSQL wire protocol, one connection per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedshiftWarehouse;

impl Warehouse for RedshiftWarehouse {
    type Connection = PgConnection;

    async fn connect(&self, params: &QueryParams) -> Result<PgConnection, ImportError> {
        let options = PgConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .database(&params.database)
            .username(&params.username)
            .password(&params.password);

        PgConnection::connect_with(&options)
            .await
            .map_err(|e| ImportError::Connection {
                host: params.host.clone(),
                port: params.port,
                message: e.to_string(),
            })
    }
}

impl WarehouseConnection for PgConnection {
    async fn execute(&mut self, query: &str) -> Result<(), ImportError> {
        sqlx::raw_sql(query)
            .execute(&mut *self)
            .await
            .map(|_| ())
            .map_err(|e| ImportError::Query(e.to_string()))
    }

    async fn close(self) -> Result<(), ImportError> {
        Connection::close(self)
            .await
            .map_err(|e| ImportError::Query(format!("failed to close connection: {}", e)))
    }
}

/// Opens one connection, runs `params.query` and closes the connection
/// again, whether or not the query succeeded.
pub async fn run_db_query<W: Warehouse>(
    warehouse: &W,
    params: &QueryParams,
) -> Result<(), ImportError> {
    info!("Initializing DB connection");
    info!(
        "DB params dbname={}, host={}, port={}, user={}",
        params.database, params.host, params.port, params.username
    );
    debug!("query={}", params.query);

    let mut connection = warehouse.connect(params).await?;

    info!("DB connection initialized");

    info!("Executing query");

    let result = connection.execute(&params.query).await;

    if let Err(e) = connection.close().await {
        warn!("Failed to close DB connection: {}", e);
    }

    result?;

    info!("Query executed");

    Ok(())
}
