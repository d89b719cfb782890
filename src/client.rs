use crate::{
    Config, Connection, Error, ExecutorConfig, ReadWriteTransaction, StatementExecutor,
    TransactionRunner,
};

/// Entry point of the library, issues transactions over a [`Connection`].
#[derive(Clone)]
pub struct Client {
    connection: Box<dyn Connection>,
    config: ExecutorConfig,
}

impl Client {
    pub fn configure() -> Config {
        Config::default()
    }

    /// Creates a client over any connection, e.g.: one that adds authentication to requests.
    pub fn new(connection: Box<dyn Connection>, config: ExecutorConfig) -> Self {
        Self { connection, config }
    }

    fn executor(&self) -> StatementExecutor {
        StatementExecutor::new(self.connection.clone(), self.config.clone())
    }

    /// Returns a runner that executes read-write transactions in a new session.
    pub fn read_write(&self) -> TransactionRunner {
        TransactionRunner::new(self.executor())
    }

    /// Starts a read-write transaction in a new session, its first statement begins it inline.
    ///
    /// Unlike [`Client::read_write()`], failed transactions are not retried.
    pub async fn begin(&self) -> Result<ReadWriteTransaction, Error> {
        let mut executor = self.executor();
        let session = executor.create_session().await?;
        Ok(ReadWriteTransaction::new(session, executor))
    }
}
