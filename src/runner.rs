use std::future::Future;
use std::pin::Pin;

use crate::{Error, QueryOptions, ReadWriteTransaction, Session, StatementExecutor};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Runs read-write transactions, retrying them when they fail transiently.
///
/// The first attempt begins its transaction inline. Once an attempt fails with a retryable error
/// (including [`Error::InlineBeginTransactionFailed`]) the work is retried in a new transaction
/// begun explicitly. Any other error is returned as is.
pub struct TransactionRunner {
    executor: StatementExecutor,
    session: Option<Session>,
    max_attempts: u32,
}

impl TransactionRunner {
    /// A session is created on first use.
    pub fn new(executor: StatementExecutor) -> Self {
        Self {
            executor,
            session: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_session(executor: StatementExecutor, session: Session) -> Self {
        Self {
            session: Some(session),
            ..Self::new(executor)
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    async fn session(&mut self) -> Result<Session, Error> {
        match &self.session {
            Some(session) => Ok(session.clone()),
            None => {
                let session = self.executor.create_session().await?;
                self.session = Some(session.clone());
                Ok(session)
            }
        }
    }

    /// Runs `work` in a transaction and commits it.
    ///
    /// `work` may be invoked more than once.
    pub async fn run<O, F>(&mut self, mut work: F) -> Result<O, Error>
    where
        F: for<'t> FnMut(
            &'t mut ReadWriteTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<O, Error>> + 't>>,
    {
        let session = self.session().await?;
        let mut explicit_begin = false;
        let mut attempt = 1;
        loop {
            let tx = ReadWriteTransaction::new(session.clone(), self.executor.clone());
            match Self::attempt(tx, explicit_begin, &mut work).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    log::debug!(
                        "transaction attempt {} failed, retrying with an explicit begin: {}",
                        attempt,
                        err
                    );
                    explicit_begin = true;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt<O, F>(
        mut tx: ReadWriteTransaction,
        explicit_begin: bool,
        work: &mut F,
    ) -> Result<O, Error>
    where
        F: for<'t> FnMut(
            &'t mut ReadWriteTransaction,
        ) -> Pin<Box<dyn Future<Output = Result<O, Error>> + 't>>,
    {
        if explicit_begin {
            tx.begin(&QueryOptions::default()).await?;
        }
        let outcome = work(&mut tx).await;
        match outcome {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    log::warn!("failed to roll back transaction: {}", rollback_err);
                }
                Err(err)
            }
        }
    }
}
