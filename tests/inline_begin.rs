use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use google_api_proto::google::spanner::v1 as proto;
use spanner_txn::{
    Client, Connection, Error, ExecutorConfig, QueryOptions, ReadWriteTransaction, ResolutionState,
    RpcResponse, Session, Statement, TransactionId,
};

#[derive(Default)]
struct Server {
    responses: VecDeque<Result<proto::ResultSet, tonic::Status>>,
    requests: Vec<proto::ExecuteSqlRequest>,
    commits: Vec<TransactionId>,
}

/// Plays back canned `ExecuteSql` responses.
#[derive(Clone, Default)]
struct Canned(Arc<Mutex<Server>>);

impl Canned {
    fn new(responses: Vec<Result<proto::ResultSet, tonic::Status>>) -> Self {
        let server = Server {
            responses: responses.into(),
            ..Default::default()
        };
        Self(Arc::new(Mutex::new(server)))
    }

    fn requests(&self) -> Vec<proto::ExecuteSqlRequest> {
        self.0.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl Connection for Canned {
    async fn create_session(&mut self) -> Result<Session, Error> {
        Ok(Session::new("projects/p/instances/i/databases/d/sessions/s"))
    }

    async fn execute_sql(
        &mut self,
        request: proto::ExecuteSqlRequest,
        _timeout: Option<Duration>,
    ) -> Result<RpcResponse<proto::ResultSet>, Error> {
        let mut server = self.0.lock().unwrap();
        server.requests.push(request);
        let response = server
            .responses
            .pop_front()
            .ok_or_else(|| Error::Client("no response left".to_string()))?;
        Ok(RpcResponse::new(response?))
    }

    async fn begin_transaction(
        &mut self,
        _session: &Session,
        _timeout: Option<Duration>,
    ) -> Result<TransactionId, Error> {
        Ok(TransactionId::new("explicit").unwrap())
    }

    async fn commit(
        &mut self,
        _session: &Session,
        transaction: &TransactionId,
        _timeout: Option<Duration>,
    ) -> Result<(), Error> {
        self.0.lock().unwrap().commits.push(transaction.clone());
        Ok(())
    }

    async fn rollback(
        &mut self,
        _session: &Session,
        _transaction: &TransactionId,
        _timeout: Option<Duration>,
    ) -> Result<(), Error> {
        Ok(())
    }
}

fn response(id: Option<&str>, row_count: Option<i64>) -> proto::ResultSet {
    proto::ResultSet {
        metadata: Some(proto::ResultSetMetadata {
            transaction: id.map(|id| proto::Transaction {
                id: id.as_bytes().to_vec().into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        stats: row_count.map(|count| proto::ResultSetStats {
            row_count: Some(proto::result_set_stats::RowCount::RowCountExact(count)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

async fn begin(connection: &Canned) -> ReadWriteTransaction {
    Client::new(Box::new(connection.clone()), ExecutorConfig::default())
        .begin()
        .await
        .unwrap()
}

fn update() -> Statement {
    Statement::new("UPDATE person SET name = @name WHERE id = @id")
        .bind("id", 7)
        .bind("name", "ferris")
}

fn txn_7() -> TransactionId {
    TransactionId::new("txn-7").unwrap()
}

#[tokio::test]
async fn test_inline_begin_resolves_identity() {
    let connection = Canned::new(vec![Ok(response(Some("txn-7"), Some(1)))]);
    let mut tx = begin(&connection).await;
    assert_eq!(tx.state(), &ResolutionState::Unresolved);

    let rs = tx
        .execute_update(&update(), &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(rs.row_count(), Some(1));
    assert_eq!(tx.state(), &ResolutionState::Resolved(txn_7()));
}

#[tokio::test]
async fn test_missing_identity_fails_begin() {
    let connection = Canned::new(vec![Ok(response(None, Some(1)))]);
    let mut tx = begin(&connection).await;

    let err = tx
        .execute_update(&update(), &QueryOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InlineBeginTransactionFailed));
    assert_eq!(tx.state(), &ResolutionState::BeginFailed);
}

#[tokio::test]
async fn test_transport_error_fails_begin() {
    for status in [
        tonic::Status::unavailable("unavailable"),
        tonic::Status::invalid_argument("bad sql"),
        tonic::Status::internal("oops"),
    ] {
        let code = status.code();
        let connection = Canned::new(vec![Err(status)]);
        let mut tx = begin(&connection).await;

        let err = tx
            .execute_update(&update(), &QueryOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(&err, Error::Status(status) if status.code() == code));
        assert_eq!(tx.state(), &ResolutionState::BeginFailed);
    }
}

#[tokio::test]
async fn test_missing_statistics_keeps_identity() {
    let connection = Canned::new(vec![
        Ok(response(Some("txn-7"), Some(1))),
        Ok(response(None, None)),
    ]);
    let mut tx = begin(&connection).await;
    tx.execute_update(&update(), &QueryOptions::default())
        .await
        .unwrap();

    let err = tx
        .execute_update(&Statement::new("SELECT 1"), &QueryOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::MissingResultStatistics { sql } => assert_eq!(sql, "SELECT 1"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(tx.state(), &ResolutionState::Resolved(txn_7()));

    let requests = connection.requests();
    assert!(matches!(
        requests[1].transaction.as_ref().and_then(|t| t.selector.as_ref()),
        Some(proto::transaction_selector::Selector::Id(_))
    ));
}

#[tokio::test]
async fn test_missing_statistics_after_inline_begin() {
    let connection = Canned::new(vec![Ok(response(Some("txn-7"), None))]);
    let mut tx = begin(&connection).await;

    let err = tx
        .execute_update(&update(), &QueryOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingResultStatistics { .. }));
    assert_eq!(tx.state(), &ResolutionState::Resolved(txn_7()));
}

#[tokio::test]
async fn test_identity_error_takes_precedence() {
    let connection = Canned::new(vec![Ok(response(None, None))]);
    let mut tx = begin(&connection).await;

    let err = tx
        .execute_update(&update(), &QueryOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InlineBeginTransactionFailed));
    assert_eq!(tx.state(), &ResolutionState::BeginFailed);
}

#[tokio::test]
async fn test_identity_never_changes() {
    let connection = Canned::new(vec![
        Ok(response(Some("txn-7"), Some(1))),
        Ok(response(Some("txn-8"), Some(1))),
    ]);
    let mut tx = begin(&connection).await;
    for _ in 0..2 {
        tx.execute_update(&update(), &QueryOptions::default())
            .await
            .unwrap();
    }
    assert_eq!(tx.id(), Some(&txn_7()));
    tx.commit().await.unwrap();
    assert_eq!(connection.0.lock().unwrap().commits, vec![txn_7()]);
}

#[tokio::test]
async fn test_runner_recovers_from_failed_inline_begin() {
    let connection = Canned::new(vec![
        Err(tonic::Status::unavailable("unavailable")),
        Ok(response(None, Some(3))),
    ]);
    let client = Client::new(Box::new(connection.clone()), ExecutorConfig::default());

    let count = client
        .read_write()
        .run(|tx| {
            Box::pin(async move {
                let rs = tx
                    .execute_update(&update(), &QueryOptions::default())
                    .await?;
                Ok(rs.row_count())
            })
        })
        .await
        .unwrap();

    assert_eq!(count, Some(3));
    assert_eq!(
        connection.0.lock().unwrap().commits,
        vec![TransactionId::new("explicit").unwrap()]
    );
}
