use std::fmt;

use aws_config::SdkConfig;
use aws_sdk_secretsmanager::{error::DisplayErrorContext, Client as SecretsClient};
use serde::Deserialize;
use tracing::info;

use crate::error::ImportError;

/// Warehouse connection settings stored in the secret. Redshift secrets
/// carry a few more keys; the ones the job never reads are ignored.
#[derive(Deserialize, Clone, PartialEq)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
    pub engine: Option<String>,
    pub dbname: Option<String>,
    #[serde(rename = "dbClusterIdentifier")]
    pub db_cluster_identifier: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("engine", &self.engine)
            .field("dbname", &self.dbname)
            .field("db_cluster_identifier", &self.db_cluster_identifier)
            .finish()
    }
}

impl Credentials {
    pub fn from_secret_string(secret: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(secret)?)
    }

    /// False when the secret names a different database than `database`.
    /// Secrets without `dbname` match anything.
    pub fn database_matches(&self, database: &str) -> bool {
        self.dbname.as_deref().map_or(true, |dbname| dbname == database)
    }
}

#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    /// Returns the raw `SecretString` of `secret_id`.
    async fn get_secret_string(&self, secret_id: &str) -> Result<String, ImportError>;
}

pub struct SecretsManagerStore {
    client: SecretsClient,
}

impl SecretsManagerStore {
    pub fn new(config: &SdkConfig) -> Self {
        let region = config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "default".to_string());
        info!("Creating client [service_name=secretsmanager, region={}]", region);

        let client = SecretsClient::new(config);

        info!("Client created [service_name=secretsmanager]");

        Self { client }
    }
}

impl SecretStore for SecretsManagerStore {
    async fn get_secret_string(&self, secret_id: &str) -> Result<String, ImportError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| ImportError::Lookup {
                secret_id: secret_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| ImportError::Lookup {
                secret_id: secret_id.to_string(),
                message: "secret has no SecretString".to_string(),
            })
    }
}

pub async fn get_secret_values<S: SecretStore>(
    store: &S,
    secret_id: &str,
) -> Result<Credentials, ImportError> {
    info!("Fetching secret values [secret_id={}]", secret_id);

    let secret = store.get_secret_string(secret_id).await?;
    let credentials = Credentials::from_secret_string(&secret)?;

    info!(
        "Secret values fetched [engine={}, cluster={}]",
        credentials.engine.as_deref().unwrap_or("unknown"),
        credentials.db_cluster_identifier.as_deref().unwrap_or("unknown")
    );

    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_deserialization() {
        let json = r#"{"host": "db.example.com", "username": "u", "password": "p"}"#;
        let credentials = Credentials::from_secret_string(json).unwrap();
        assert_eq!(credentials.host, "db.example.com");
        assert_eq!(credentials.username, "u");
        assert_eq!(credentials.password, "p");
        assert_eq!(credentials.engine, None);
    }

    #[test]
    fn test_redshift_secret_extra_keys() {
        let json = r#"{
            "username": "loader",
            "password": "hunter2",
            "engine": "redshift",
            "host": "cluster.abc.eu-west-1.redshift.amazonaws.com",
            "port": 5439,
            "dbClusterIdentifier": "cluster"
        }"#;
        let credentials = Credentials::from_secret_string(json).unwrap();
        assert_eq!(credentials.engine.as_deref(), Some("redshift"));
        assert_eq!(credentials.db_cluster_identifier.as_deref(), Some("cluster"));
    }

    #[test]
    fn test_missing_password_is_format_error() {
        let json = r#"{"host": "db.example.com", "username": "u"}"#;
        let result = Credentials::from_secret_string(json);
        assert!(matches!(result, Err(ImportError::Format { .. })));
    }

    #[test]
    fn test_wrong_password_type_does_not_leak() {
        let json = r#"{"host": "h", "username": "u", "password": 987654321}"#;
        let error = Credentials::from_secret_string(json).unwrap_err();
        assert!(matches!(error, ImportError::Format { .. }));
        assert!(!error.to_string().contains("987654321"));
    }

    #[test]
    fn test_database_matches() {
        let json = r#"{"host": "h", "username": "u", "password": "p", "dbname": "ecommerce"}"#;
        let credentials = Credentials::from_secret_string(json).unwrap();
        assert!(credentials.database_matches("ecommerce"));
        assert!(!credentials.database_matches("ecommerce_dev"));

        let json = r#"{"host": "h", "username": "u", "password": "p"}"#;
        let credentials = Credentials::from_secret_string(json).unwrap();
        assert!(credentials.database_matches("anything"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let json = r#"{"host": "db.example.com", "username": "u", "password": "s3cret"}"#;
        let credentials = Credentials::from_secret_string(json).unwrap();
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_get_secret_values_uses_secret_id() {
        let mut store = MockSecretStore::new();
        store
            .expect_get_secret_string()
            .withf(|secret_id| secret_id == "redshift")
            .times(1)
            .returning(|_| Ok(r#"{"host":"h","username":"u","password":"p"}"#.to_string()));

        let credentials = get_secret_values(&store, "redshift").await.unwrap();
        assert_eq!(credentials.host, "h");
    }

    #[tokio::test]
    async fn test_lookup_error_propagates() {
        let mut store = MockSecretStore::new();
        store.expect_get_secret_string().returning(|secret_id| {
            Err(ImportError::Lookup {
                secret_id: secret_id.to_string(),
                message: "ResourceNotFoundException".to_string(),
            })
        });

        let result = get_secret_values(&store, "missing").await;
        assert!(matches!(result, Err(ImportError::Lookup { .. })));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_format_error() {
        let mut store = MockSecretStore::new();
        store
            .expect_get_secret_string()
            .returning(|_| Ok("not json".to_string()));

        let result = get_secret_values(&store, "redshift").await;
        assert!(matches!(result, Err(ImportError::Format { .. })));
    }
}
