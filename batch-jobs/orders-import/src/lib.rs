pub mod config;
pub mod credentials;
pub mod error;
pub mod merge;
pub mod query;

use std::fmt;

use tracing::{error, info, warn};

pub use config::ImportConfig;
pub use credentials::{get_secret_values, Credentials, SecretStore, SecretsManagerStore};
pub use error::ImportError;
pub use query::{run_db_query, QueryParams, RedshiftWarehouse, Warehouse, WarehouseConnection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    NotStarted,
    CredentialsFetched,
    QueryExecuted,
    Done,
    Failed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::CredentialsFetched => write!(f, "credentials_fetched"),
            Self::QueryExecuted => write!(f, "query_executed"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Builds the merge query for `credentials` under `config`.
pub fn build_query_params(config: &ImportConfig, credentials: &Credentials) -> QueryParams {
    QueryParams::builder()
        .database(config.database.as_str())
        .host(credentials.host.as_str())
        .port(config.port)
        .username(credentials.username.as_str())
        .password(credentials.password.as_str())
        .query(config.merge_script())
        .build()
}

/// Fetches credentials, then runs the merge once. The first error aborts
/// the run; nothing is retried.
pub async fn run_import<S, W>(
    config: &ImportConfig,
    secrets: &S,
    warehouse: &W,
) -> Result<(), ImportError>
where
    S: SecretStore,
    W: Warehouse,
{
    let mut stage = ImportStage::NotStarted;

    let result = async {
        let credentials = get_secret_values(secrets, &config.secret_name).await?;
        stage = ImportStage::CredentialsFetched;
        info!("Import stage: {}", stage);

        if !credentials.database_matches(&config.database) {
            warn!(
                "Secret names database {}, connecting to {}",
                credentials.dbname.as_deref().unwrap_or_default(),
                config.database
            );
        }

        let params = build_query_params(config, &credentials);
        run_db_query(warehouse, &params).await?;
        stage = ImportStage::QueryExecuted;
        info!("Import stage: {}", stage);

        Ok::<(), ImportError>(())
    }
    .await;

    match &result {
        Ok(()) => info!("Import stage: {}", ImportStage::Done),
        Err(e) => error!(
            "Import stage: {} [last_completed={}]: {}",
            ImportStage::Failed,
            stage,
            e
        ),
    }

    result
}
