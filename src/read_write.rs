use crate::inline_begin::InlineBeginAttempt;
use crate::transaction::TransactionHandle;
use crate::{
    validate, Error, QueryOptions, ResolutionState, ResultSet, Session, Statement,
    StatementExecutor, TransactionId,
};

/// A read-write transaction.
///
/// The transaction is begun lazily: the first statement asks the server to begin it inline.
/// When that fails, statements return [`Error::InlineBeginTransactionFailed`] or the error of the
/// failed RPC and the transaction must be restarted using [`restart_with_explicit_begin`](Self::restart_with_explicit_begin).
///
/// Statements of one transaction are executed one at a time, which `&mut self` enforces.
pub struct ReadWriteTransaction {
    session: Session,
    handle: TransactionHandle,
    executor: StatementExecutor,
    seqno: i64,
}

impl ReadWriteTransaction {
    pub fn new(session: Session, executor: StatementExecutor) -> Self {
        Self {
            session,
            handle: TransactionHandle::default(),
            executor,
            seqno: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &ResolutionState {
        self.handle.state()
    }

    /// The identity of this transaction, once the server has begun it.
    pub fn id(&self) -> Option<&TransactionId> {
        self.handle.id()
    }

    /// Executes a DML statement and returns its result set, which always carries statistics.
    pub async fn execute_update(
        &mut self,
        statement: &Statement,
        options: &QueryOptions,
    ) -> Result<ResultSet, Error> {
        let (attempt, selector) = InlineBeginAttempt::start(&mut self.handle)?;
        // the server orders DML of a transaction by seqno
        self.seqno += 1;
        let request = statement.to_request(&self.session, selector, self.seqno, options);
        let result = self.executor.execute(request, options).await;
        let result_set = attempt.settle(result)?;
        validate::require_statistics(statement, result_set)
    }

    /// Begins the transaction with a dedicated RPC instead of inline with its first statement.
    pub async fn begin(&mut self, options: &QueryOptions) -> Result<(), Error> {
        match self.handle.state() {
            ResolutionState::Unresolved => {
                let id = self
                    .executor
                    .begin_transaction(&self.session, options)
                    .await?;
                log::debug!("transaction begun explicitly: {:?}", id);
                self.handle.commit(id)
            }
            ResolutionState::Resolved(id) => Err(Error::ProtocolViolation(format!(
                "transaction {:?} was already begun",
                id
            ))),
            ResolutionState::BeginFailed => Err(Error::InvalidState(
                "inline begin failed, restart the transaction instead".to_string(),
            )),
        }
    }

    /// Abandons this transaction and begins a new one, in the same session, with an explicit begin.
    pub async fn restart_with_explicit_begin(
        self,
        options: &QueryOptions,
    ) -> Result<ReadWriteTransaction, Error> {
        let session = self.session.clone();
        let executor = self.executor.clone();
        if let Err(err) = self.rollback().await {
            log::warn!("failed to roll back abandoned transaction: {}", err);
        }
        let mut tx = ReadWriteTransaction::new(session, executor);
        tx.begin(options).await?;
        Ok(tx)
    }

    /// Commits the transaction.
    ///
    /// A transaction that never executed a statement does not exist on the server, committing it does nothing.
    pub async fn commit(mut self) -> Result<(), Error> {
        match self.handle.state() {
            ResolutionState::Resolved(id) => {
                let id = id.clone();
                self.executor.commit(&self.session, &id).await
            }
            ResolutionState::Unresolved => {
                log::debug!("committing a transaction that was never begun");
                Ok(())
            }
            ResolutionState::BeginFailed => Err(Error::InvalidState(
                "cannot commit a transaction that failed to begin".to_string(),
            )),
        }
    }

    /// Rolls back the transaction, if the server began it.
    pub async fn rollback(mut self) -> Result<(), Error> {
        match self.handle.id().cloned() {
            Some(id) => self.executor.rollback(&self.session, &id).await,
            None => Ok(()),
        }
    }
}
