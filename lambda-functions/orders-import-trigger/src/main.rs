use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use orders_import_trigger::{function_handler, TriggerService};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Built once per cold start, shared by every invocation.
    let service = Arc::new(TriggerService::new().await);

    run(service_fn(move |event: LambdaEvent<Value>| {
        let service = Arc::clone(&service);
        async move { function_handler(event, service.as_ref()).await }
    }))
    .await
}
