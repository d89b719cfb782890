//! Read-write transactions for Cloud Spanner that begin inline with their first statement.
//!
//! # Example
//!
//! ```no_run
//! use spanner_txn::{Client, DatabaseId, Error, QueryOptions, Statement};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = Client::configure()
//!         .with_emulator_grpc_port(9010)
//!         .database(DatabaseId::new("my-project", "my-instance", "my-database"))
//!         .connect()
//!         .await?;
//!
//!     // assuming the following table:
//!     //   person(id INT64, name STRING(MAX)) PRIMARY KEY(id)
//!     let inserted = client
//!         .read_write()
//!         .run(|tx| {
//!             // this closure may be invoked more than once
//!             Box::pin(async move {
//!                 let statement = Statement::new("INSERT INTO person(id, name) VALUES(@id, @name)")
//!                     .bind("id", 42)
//!                     .bind("name", "ferris");
//!                 let rs = tx.execute_update(&statement, &QueryOptions::default()).await?;
//!                 Ok(rs.row_count())
//!             })
//!         })
//!         .await?;
//!
//!     println!("inserted {:?} rows", inserted);
//!     Ok(())
//! }
//! ```
//!
//! # Inline begin
//!
//! A read-write transaction needs an identity assigned by the server before it can execute statements.
//! Instead of a dedicated `BeginTransaction` round trip, the first statement asks the server to begin the
//! transaction and return its identity along with the statement's results.
//!
//! When that statement fails, or succeeds without returning an identity, the transaction is marked as
//! [`ResolutionState::BeginFailed`]: the statement returns either its own error or
//! [`Error::InlineBeginTransactionFailed`], and the transaction must be restarted with an explicit begin.
//! [`TransactionRunner`] does this transparently, [`ReadWriteTransaction::restart_with_explicit_begin()`]
//! does it for transactions managed by hand.
//!
//! DML statements must return statistics, a statement whose result set has none fails with
//! [`Error::MissingResultStatistics`]. Identity problems are always reported before statistics problems.

pub use crate::client::*;
pub use crate::config::*;
pub use crate::connection::{Connection, RpcResponse};
pub use crate::error::{Error, ErrorClass};
pub use crate::executor::*;
pub use crate::read_write::*;
pub use crate::result_set::{ResultSet, ResultSetStats, RowCount};
pub use crate::runner::*;
pub use crate::session::*;
pub use crate::statement::*;
pub use crate::transaction::{ResolutionState, TransactionId};
pub(crate) use crate::transaction::TransactionSelector;

mod client;
mod config;
mod connection;
mod error;
mod executor;
mod inline_begin;
mod read_write;
mod result_set;
mod runner;
mod session;
mod statement;
mod transaction;
mod validate;
