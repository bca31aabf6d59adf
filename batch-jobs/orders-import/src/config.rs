use clap::Parser;

use crate::error::ImportError;
use crate::merge;

pub const DEFAULT_SECRET_NAME: &str = "redshift";
pub const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_DATABASE: &str = "ecommerce";
pub const DEFAULT_PORT: u16 = 5439;
pub const DEFAULT_STAGING_PATH: &str =
    "s3://mysql-dwh-serhii/order_payments/current/order_payments.csv";
pub const DEFAULT_ROLE_ARN: &str = "arn:aws:iam::589464876810:role/Redshift";

/// Settings for one import run. Every flag can also be supplied through
/// its environment variable; unset options fall back to the production
/// values the job has always used.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "orders-import")]
#[command(about = "Merge the hourly order payments export from S3 into Redshift", long_about = None)]
pub struct ImportConfig {
    /// Secrets Manager secret holding the warehouse credentials
    #[arg(long, env = "SECRET_NAME", default_value = DEFAULT_SECRET_NAME)]
    pub secret_name: String,

    /// Region of the secret
    #[arg(long, env = "SECRET_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DATABASE)]
    pub database: String,

    #[arg(long, env = "DB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// S3 object loaded into the staging table
    #[arg(long, env = "STAGING_PATH", default_value = DEFAULT_STAGING_PATH)]
    pub staging_path: String,

    /// IAM role Redshift assumes to read the staging object
    #[arg(long, env = "ROLE_ARN", default_value = DEFAULT_ROLE_ARN)]
    pub role_arn: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            port: DEFAULT_PORT,
            staging_path: DEFAULT_STAGING_PATH.to_string(),
            role_arn: DEFAULT_ROLE_ARN.to_string(),
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.secret_name.trim().is_empty() {
            return Err(ImportError::Config("secret_name must not be empty".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(ImportError::Config("region must not be empty".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(ImportError::Config("database must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ImportError::Config("port must be non-zero".to_string()));
        }
        if !self.staging_path.starts_with("s3://") {
            return Err(ImportError::Config(format!(
                "staging_path must be an s3:// URI, got {}",
                self.staging_path
            )));
        }
        if !self.role_arn.starts_with("arn:") {
            return Err(ImportError::Config(format!(
                "role_arn must be an ARN, got {}",
                self.role_arn
            )));
        }
        // Both values end up inside single-quoted SQL literals.
        if self.staging_path.contains('\'') || self.role_arn.contains('\'') {
            return Err(ImportError::Config(
                "staging_path and role_arn must not contain quotes".to_string(),
            ));
        }
        Ok(())
    }

    pub fn merge_script(&self) -> String {
        merge::render(&self.staging_path, &self.role_arn)
    }
}
