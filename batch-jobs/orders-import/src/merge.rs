pub const MAIN_TABLE: &str = "mysql_dwh.order_payments";
pub const STAGING_TABLE: &str = "mysql_dwh_staging.order_payments";

/// Renders the staging-to-main merge as a single transaction:
/// COPY into staging, DELETE matched rows from main, INSERT everything
/// from staging, TRUNCATE staging.
///
/// Staging rows win over main rows with the same `order_id`. Redshift
/// commits implicitly on TRUNCATE, so it has to stay the last statement.
pub fn render(staging_path: &str, role_arn: &str) -> String {
    format!(
        r#"BEGIN;

-- Copy hourly data from S3 to the staging table
COPY {staging} FROM '{staging_path}'
    IAM_ROLE '{role_arn}'
    CSV QUOTE '"' DELIMITER ','
    ACCEPTINVCHARS;

-- Delete records from the main table that are present in staging
DELETE
FROM {main}
    USING
        {staging}
WHERE {main}.order_id = {staging}.order_id;

-- Insert all staging data into the main table
INSERT INTO {main}
SELECT *
FROM {staging};

-- Truncate the staging table
TRUNCATE TABLE {staging};

END;
"#,
        main = MAIN_TABLE,
        staging = STAGING_TABLE,
    )
}
