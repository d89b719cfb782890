use std::time::Duration;

use async_trait::async_trait;
use dyn_clone::DynClone;
use google_api_proto::google::spanner::v1 as proto;
use tonic::metadata::MetadataMap;

use crate::{Error, Session, TransactionId};

/// A response message along with the metadata (headers) the server sent with it.
#[derive(Debug)]
pub struct RpcResponse<T> {
    pub metadata: MetadataMap,
    pub message: T,
}

impl<T> RpcResponse<T> {
    pub fn new(message: T) -> Self {
        Self {
            metadata: MetadataMap::new(),
            message,
        }
    }
}

/// The RPCs a read-write transaction is built on.
///
/// `timeout` is the deadline to propagate to the server, `None` means the caller waits indefinitely.
#[async_trait]
pub trait Connection
where
    Self: DynClone + Send,
{
    async fn create_session(&mut self) -> Result<Session, Error>;
    async fn execute_sql(
        &mut self,
        request: proto::ExecuteSqlRequest,
        timeout: Option<Duration>,
    ) -> Result<RpcResponse<proto::ResultSet>, Error>;
    async fn begin_transaction(
        &mut self,
        session: &Session,
        timeout: Option<Duration>,
    ) -> Result<TransactionId, Error>;
    async fn commit(
        &mut self,
        session: &Session,
        transaction: &TransactionId,
        timeout: Option<Duration>,
    ) -> Result<(), Error>;
    async fn rollback(
        &mut self,
        session: &Session,
        transaction: &TransactionId,
        timeout: Option<Duration>,
    ) -> Result<(), Error>;
}

dyn_clone::clone_trait_object!(Connection);

pub(crate) mod grpc;
