use std::convert::TryFrom;
use std::future::Future;
use std::time::Duration;

use google_api_proto::google::spanner::v1 as proto;
use tonic::metadata::MetadataMap;

use crate::result_set::ExecutionResult;
use crate::{Connection, Error, ExecutorConfig, QueryOptions, Session, TransactionId};

const SERVER_TIMING_HEADER: &str = "server-timing";
const GFE_TIMING_METRIC: &str = "gfet4t7";

/// Issues RPCs with a bounded wait and hands back their raw outcome.
///
/// The executor knows nothing about transaction identity, that is left to its callers.
#[derive(Clone)]
pub struct StatementExecutor {
    connection: Box<dyn Connection>,
    config: ExecutorConfig,
}

impl StatementExecutor {
    pub fn new(connection: Box<dyn Connection>, config: ExecutorConfig) -> Self {
        Self { connection, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub(crate) async fn execute(
        &mut self,
        request: proto::ExecuteSqlRequest,
        options: &QueryOptions,
    ) -> Result<ExecutionResult, Error> {
        let deadline = self.config.deadline(options.get_timeout());
        let response = within(deadline, self.connection.execute_sql(request, deadline)).await?;
        if self.config.capture_latency() {
            capture_latency(&response.metadata);
        }
        ExecutionResult::try_from(response.message)
    }

    pub(crate) async fn create_session(&mut self) -> Result<Session, Error> {
        let deadline = self.config.deadline(None);
        within(deadline, self.connection.create_session()).await
    }

    pub(crate) async fn begin_transaction(
        &mut self,
        session: &Session,
        options: &QueryOptions,
    ) -> Result<TransactionId, Error> {
        let deadline = self.config.deadline(options.get_timeout());
        within(
            deadline,
            self.connection.begin_transaction(session, deadline),
        )
        .await
    }

    pub(crate) async fn commit(
        &mut self,
        session: &Session,
        transaction: &TransactionId,
    ) -> Result<(), Error> {
        let deadline = self.config.deadline(None);
        within(
            deadline,
            self.connection.commit(session, transaction, deadline),
        )
        .await
    }

    pub(crate) async fn rollback(
        &mut self,
        session: &Session,
        transaction: &TransactionId,
    ) -> Result<(), Error> {
        let deadline = self.config.deadline(None);
        within(
            deadline,
            self.connection.rollback(session, transaction, deadline),
        )
        .await
    }
}

/// Bounds `call` by `deadline` even when the connection does not enforce it itself.
async fn within<T, F>(deadline: Option<Duration>, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, call)
            .await
            .map_err(|_| Error::Timeout(deadline))?,
        None => call.await,
    }
}

fn capture_latency(metadata: &MetadataMap) {
    match metadata.get(SERVER_TIMING_HEADER).map(|value| value.to_str()) {
        Some(Ok(value)) => match parse_gfe_latency(value) {
            Some(latency) => log::debug!("gfe latency: {:?}", latency),
            None => log::trace!("no gfe latency in {}: {:?}", SERVER_TIMING_HEADER, value),
        },
        Some(Err(err)) => log::trace!("unreadable {} header: {}", SERVER_TIMING_HEADER, err),
        None => log::trace!("response has no {} header", SERVER_TIMING_HEADER),
    }
}

// server-timing: gfet4t7; dur=123
fn parse_gfe_latency(server_timing: &str) -> Option<Duration> {
    server_timing
        .split(',')
        .map(str::trim)
        .filter(|metric| metric.starts_with(GFE_TIMING_METRIC))
        .flat_map(|metric| metric.split(';').skip(1))
        .find_map(|param| param.trim().strip_prefix("dur="))
        .and_then(|millis| millis.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
