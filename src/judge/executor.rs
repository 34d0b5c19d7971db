use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("execution service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("execution service unreachable")]
    Unavailable(#[source] reqwest::Error),
    #[error("execution service rejected the request with status {status}")]
    Rejected { status: StatusCode },
    #[error("execution service answered with a non-JSON body")]
    MalformedBody(#[source] reqwest::Error),
    #[error("failed to build execution client")]
    Client(#[source] reqwest::Error),
}

/// Unparsed execution response, as returned by the execution service.
///
/// Field access goes through [`crate::judge::extractor`], which tolerates
/// missing or mistyped fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExecution(pub JsonValue);

impl RawExecution {
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }
}

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Compiles `source` and runs it once with `stdin` as standard input.
    async fn execute(&self, source: &str, stdin: &str) -> Result<RawExecution, ExecutionError>;
}

#[derive(Debug, Clone)]
pub struct HttpExecutorConfig {
    pub url: Url,
    pub client_secret: String,
    pub lang: String,
    pub time_limit: u32,
    pub memory_limit: u32,
    pub timeout: Duration,
}

#[derive(Serialize, Debug)]
struct RunRequest<'a> {
    client_secret: &'a str,
    #[serde(rename = "async")]
    run_async: u8,
    source: &'a str,
    lang: &'a str,
    time_limit: u32,
    memory_limit: u32,
    input: &'a str,
}

/// Client for a HackerEarth-style `code/run` endpoint.
pub struct HttpExecutor {
    config: HttpExecutorConfig,
    client: Client,
}

impl HttpExecutor {
    pub fn new(config: HttpExecutorConfig) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ExecutionError::Client)?;

        Ok(HttpExecutor { config, client })
    }

    fn map_send_error(&self, err: reqwest::Error) -> ExecutionError {
        if err.is_timeout() {
            warn!(
                "Execution request to {} timed out after {:?}",
                self.config.url, self.config.timeout
            );
            ExecutionError::Timeout(self.config.timeout)
        } else {
            error!("Execution request to {} failed: {:?}", self.config.url, err);
            ExecutionError::Unavailable(err)
        }
    }
}

#[async_trait]
impl CodeExecutor for HttpExecutor {
    async fn execute(&self, source: &str, stdin: &str) -> Result<RawExecution, ExecutionError> {
        let request = RunRequest {
            client_secret: &self.config.client_secret,
            run_async: 0,
            source,
            lang: &self.config.lang,
            time_limit: self.config.time_limit,
            memory_limit: self.config.memory_limit,
            input: stdin,
        };
        debug!(
            "Sending {} bytes of {} source to {}",
            source.len(),
            self.config.lang,
            self.config.url
        );

        let res = self
            .client
            .post(self.config.url.clone())
            .form(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = res.status();
        if !status.is_success() {
            error!("Execution service answered with status {}", status);
            return Err(ExecutionError::Rejected { status });
        }

        let body: JsonValue = res.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(e)
            } else {
                error!("Execution service body is not valid JSON: {:?}", e);
                ExecutionError::MalformedBody(e)
            }
        })?;

        Ok(RawExecution(body))
    }
}
