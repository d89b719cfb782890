use std::time::Duration;

use derive_builder::Builder;
use google_api_proto::google::spanner::v1 as proto;
use tonic::transport::ClientTlsConfig;

use crate::{Client, DatabaseId, Error};

/// Deadline applied to `ExecuteSql` calls when none is given.
pub const DEFAULT_EXECUTE_SQL_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings of a [`StatementExecutor`](crate::StatementExecutor).
///
/// ```
/// use std::time::Duration;
/// use spanner_txn::ExecutorConfig;
///
/// let config = ExecutorConfig::builder()
///     .default_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(config.deadline(None), Some(Duration::from_secs(5)));
/// ```
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(default, build_fn(error = "crate::Error"))]
pub struct ExecutorConfig {
    /// Applied to calls whose options carry no timeout.
    default_timeout: Duration,
    /// When set, calls without a timeout wait for the server indefinitely.
    disable_default_timeout: bool,
    /// Record the server-reported latency found in response metadata.
    capture_latency: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_EXECUTE_SQL_TIMEOUT,
            disable_default_timeout: false,
            capture_latency: true,
        }
    }
}

impl ExecutorConfig {
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// The deadline of a call given its own optional timeout.
    pub fn deadline(&self, timeout: Option<Duration>) -> Option<Duration> {
        match timeout {
            Some(timeout) => Some(timeout),
            None if self.disable_default_timeout => None,
            None => Some(self.default_timeout),
        }
    }

    pub(crate) fn capture_latency(&self) -> bool {
        self.capture_latency
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl From<Priority> for proto::request_options::Priority {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Low => proto::request_options::Priority::Low,
            Priority::Medium => proto::request_options::Priority::Medium,
            Priority::High => proto::request_options::Priority::High,
        }
    }
}

/// Options of a single statement execution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    timeout: Option<Duration>,
    request_tag: Option<String>,
    priority: Option<Priority>,
}

impl QueryOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn request_tag(mut self, tag: &str) -> Self {
        self.request_tag = Some(tag.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub(crate) fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn request_options(&self) -> proto::RequestOptions {
        proto::RequestOptions {
            priority: self
                .priority
                .map(|p| proto::request_options::Priority::from(p) as i32)
                .unwrap_or_default(),
            request_tag: self.request_tag.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Configuration of a [`Client`] connected over gRPC.
#[derive(Default, Clone)]
pub struct Config {
    endpoint: Option<String>,
    tls_config: Option<ClientTlsConfig>,
    database: Option<DatabaseId>,
    executor: ExecutorConfig,
}

impl Config {
    /// Defaults to `https://spanner.googleapis.com`.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Connects in plaintext to an emulator listening on `localhost`.
    pub fn with_emulator_grpc_port(self, port: u16) -> Self {
        self.endpoint(&format!("http://localhost:{}", port))
    }

    pub fn tls_config(mut self, tls_config: ClientTlsConfig) -> Self {
        self.tls_config = Some(tls_config);
        self
    }

    pub fn database(mut self, database: DatabaseId) -> Self {
        self.database = Some(database);
        self
    }

    pub fn executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    pub async fn connect(self) -> Result<Client, Error> {
        let database = self
            .database
            .ok_or_else(|| Error::Config("missing database".to_string()))?;
        let connection =
            crate::connection::grpc::connect(self.endpoint, self.tls_config, database).await?;
        Ok(Client::new(connection, self.executor))
    }
}
