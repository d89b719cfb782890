use std::time::Duration;

use super::{Connection, RpcResponse};
use crate::{DatabaseId, Error, Session, TransactionId};
use async_trait::async_trait;
use google_api_proto::google::spanner::v1 as proto;
use proto::{
    spanner_client::SpannerClient, BeginTransactionRequest, CommitRequest, CreateSessionRequest,
    ExecuteSqlRequest, RollbackRequest,
};
use tonic::transport::{Channel, ClientTlsConfig};
use tonic::Request;

#[derive(Clone)]
pub(crate) struct GrpcConnection {
    database: DatabaseId,
    spanner: SpannerClient<Channel>,
}

pub(crate) async fn connect(
    endpoint: Option<String>,
    tls_config: Option<ClientTlsConfig>,
    database: DatabaseId,
) -> Result<Box<dyn Connection>, Error> {
    let channel = match endpoint {
        None => Channel::from_static("https://spanner.googleapis.com")
            .tls_config(tls_config.unwrap_or_else(ClientTlsConfig::new))?,
        Some(hostname) => {
            let channel = Channel::from_shared(hostname).map_err(|invalid_uri| {
                Error::Config(format!("invalid endpoint: {}", invalid_uri))
            })?;
            if let Some(tls_config) = tls_config {
                channel.tls_config(tls_config)?
            } else {
                channel
            }
        }
    };

    let channel = channel.connect().await?;
    log::debug!("connected to spanner for database {}", database.path());

    Ok(Box::new(GrpcConnection {
        database,
        spanner: SpannerClient::new(channel),
    }))
}

fn request<T>(message: T, timeout: Option<Duration>) -> Request<T> {
    let mut request = Request::new(message);
    if let Some(timeout) = timeout {
        request.set_timeout(timeout);
    }
    request
}

#[async_trait]
impl Connection for GrpcConnection {
    async fn create_session(&mut self) -> Result<Session, Error> {
        let response = self
            .spanner
            .create_session(Request::new(CreateSessionRequest {
                database: self.database.path(),
                ..Default::default()
            }))
            .await?;
        Ok(response.into_inner().into())
    }

    async fn execute_sql(
        &mut self,
        message: ExecuteSqlRequest,
        timeout: Option<Duration>,
    ) -> Result<RpcResponse<proto::ResultSet>, Error> {
        let response = self.spanner.execute_sql(request(message, timeout)).await?;
        let metadata = response.metadata().clone();
        Ok(RpcResponse {
            metadata,
            message: response.into_inner(),
        })
    }

    async fn begin_transaction(
        &mut self,
        session: &Session,
        timeout: Option<Duration>,
    ) -> Result<TransactionId, Error> {
        let transaction = self
            .spanner
            .begin_transaction(request(
                BeginTransactionRequest {
                    session: session.name().to_string(),
                    options: Some(crate::transaction::read_write_options()),
                    ..Default::default()
                },
                timeout,
            ))
            .await?
            .into_inner();
        TransactionId::try_from(&transaction)
    }

    async fn commit(
        &mut self,
        session: &Session,
        transaction: &TransactionId,
        timeout: Option<Duration>,
    ) -> Result<(), Error> {
        self.spanner
            .commit(request(
                CommitRequest {
                    session: session.name().to_string(),
                    transaction: Some(proto::commit_request::Transaction::TransactionId(
                        transaction.as_bytes().to_vec().into(),
                    )),
                    ..Default::default()
                },
                timeout,
            ))
            .await?;
        Ok(())
    }

    async fn rollback(
        &mut self,
        session: &Session,
        transaction: &TransactionId,
        timeout: Option<Duration>,
    ) -> Result<(), Error> {
        self.spanner
            .rollback(request(
                RollbackRequest {
                    session: session.name().to_string(),
                    transaction_id: transaction.as_bytes().to_vec().into(),
                },
                timeout,
            ))
            .await?;
        Ok(())
    }
}
