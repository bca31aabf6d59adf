use std::collections::HashMap;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_glue::{error::DisplayErrorContext, Client as GlueClient};
use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub const DEFAULT_JOB_NAME: &str = "hourly_orders_import";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    /// 200 with the JSON-encoded confirmation, e.g. `"\"hourly_orders_import triggered\""`.
    pub fn triggered(job_name: &str) -> Self {
        Self {
            status_code: 200,
            body: Value::String(format!("{} triggered", job_name)).to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct JobTriggerRequest {
    pub job_name: String,
    pub arguments: HashMap<String, String>,
}

impl JobTriggerRequest {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            arguments: HashMap::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Failed to start job run [job_name={job_name}]: {message}")]
    Orchestration { job_name: String, message: String },
}

#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub trait JobLauncher {
    /// Starts a run without waiting for it; returns the run id when the
    /// service reports one.
    async fn start_job_run(
        &self,
        request: &JobTriggerRequest,
    ) -> Result<Option<String>, TriggerError>;
}

pub struct GlueJobLauncher {
    client: GlueClient,
}

impl GlueJobLauncher {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: GlueClient::new(config),
        }
    }
}

impl JobLauncher for GlueJobLauncher {
    async fn start_job_run(
        &self,
        request: &JobTriggerRequest,
    ) -> Result<Option<String>, TriggerError> {
        let output = self
            .client
            .start_job_run()
            .job_name(&request.job_name)
            .set_arguments(Some(request.arguments.clone()))
            .send()
            .await
            .map_err(|e| TriggerError::Orchestration {
                job_name: request.job_name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.job_run_id().map(str::to_string))
    }
}

pub struct TriggerService<L> {
    launcher: L,
    job_name: String,
}

impl TriggerService<GlueJobLauncher> {
    pub async fn new() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let job_name =
            std::env::var("JOB_NAME").unwrap_or_else(|_| DEFAULT_JOB_NAME.to_string());

        Self::with_launcher(GlueJobLauncher::new(&config), job_name)
    }
}

impl<L: JobLauncher> TriggerService<L> {
    pub fn with_launcher(launcher: L, job_name: impl Into<String>) -> Self {
        Self {
            launcher,
            job_name: job_name.into(),
        }
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub async fn trigger(&self) -> Result<Response, TriggerError> {
        let request = JobTriggerRequest::new(self.job_name.as_str());

        info!("Starting job run [job_name={}]", request.job_name);

        let job_run_id = self.launcher.start_job_run(&request).await?;

        info!(
            "Job run started [job_name={}, job_run_id={}]",
            request.job_name,
            job_run_id.as_deref().unwrap_or("unknown")
        );

        Ok(Response::triggered(&request.job_name))
    }
}

/// The event payload is not inspected; any scheduler event starts the job.
pub async fn function_handler<L: JobLauncher>(
    event: LambdaEvent<Value>,
    service: &TriggerService<L>,
) -> Result<Response, Error> {
    info!("Trigger invoked [request_id={}]", event.context.request_id);

    Ok(service.trigger().await?)
}
