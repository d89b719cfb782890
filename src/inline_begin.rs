//! Bookkeeping of a statement that may begin its transaction inline.
//!
//! The first statement of a read-write transaction asks the server to begin the transaction and
//! return its identity along with the statement's results. Every outcome of such an attempt
//! resolves the [`TransactionHandle`]: either the identity is recorded, or the handle is marked
//! as [`ResolutionState::BeginFailed`](crate::ResolutionState::BeginFailed) so that the caller
//! restarts the transaction with an explicit begin.

use crate::result_set::ExecutionResult;
use crate::transaction::{TransactionHandle, TransactionSelector};
use crate::{Error, ResultSet, TransactionId};

/// What an attempt's RPC produced, as far as transaction identity is concerned.
#[derive(Debug)]
enum RpcOutcome {
    Failed(Error),
    Succeeded(ResultSet, Option<TransactionId>),
}

impl From<Result<ExecutionResult, Error>> for RpcOutcome {
    fn from(value: Result<ExecutionResult, Error>) -> Self {
        match value {
            Ok(result) => RpcOutcome::Succeeded(result.result_set, result.returned_id),
            Err(err) => RpcOutcome::Failed(err),
        }
    }
}

#[derive(Debug)]
enum Transition {
    /// No inline begin was requested, the outcome is returned untouched.
    Pass(Result<ResultSet, Error>),
    /// The server began the transaction.
    Commit(ResultSet, TransactionId),
    /// The RPC failed, the begin did not happen either.
    BeginFailed(Error),
    /// The RPC succeeded without returning the identity of the transaction it should have begun.
    MissingId,
}

fn transition(requested_begin: bool, outcome: RpcOutcome) -> Transition {
    match (requested_begin, outcome) {
        (false, RpcOutcome::Failed(err)) => Transition::Pass(Err(err)),
        (false, RpcOutcome::Succeeded(result_set, _)) => Transition::Pass(Ok(result_set)),
        (true, RpcOutcome::Succeeded(result_set, Some(id))) => Transition::Commit(result_set, id),
        (true, RpcOutcome::Succeeded(_, None)) => Transition::MissingId,
        (true, RpcOutcome::Failed(err)) => Transition::BeginFailed(err),
    }
}

/// One RPC attempt against a transaction handle.
///
/// If the attempt requested an inline begin and is dropped before [`settle`](Self::settle) is
/// called (e.g.: the enclosing future was cancelled), the handle is marked as failed.
pub(crate) struct InlineBeginAttempt<'a> {
    handle: &'a mut TransactionHandle,
    requested_begin: bool,
    settled: bool,
}

impl<'a> InlineBeginAttempt<'a> {
    /// Returns the attempt along with the selector its request must carry.
    pub(crate) fn start(
        handle: &'a mut TransactionHandle,
    ) -> Result<(Self, TransactionSelector), Error> {
        let selector = handle.current_selector()?;
        let attempt = Self {
            handle,
            requested_begin: selector == TransactionSelector::Begin,
            settled: false,
        };
        Ok((attempt, selector))
    }

    pub(crate) fn settle(
        mut self,
        result: Result<ExecutionResult, Error>,
    ) -> Result<ResultSet, Error> {
        self.settled = true;
        match transition(self.requested_begin, result.into()) {
            Transition::Pass(result) => result,
            Transition::Commit(result_set, id) => {
                log::debug!("transaction begun inline: {:?}", id);
                self.handle.commit(id)?;
                Ok(result_set)
            }
            Transition::BeginFailed(err) => {
                log::debug!("inline begin failed along with its statement: {}", err);
                self.handle.mark_begin_failed()?;
                Err(err)
            }
            Transition::MissingId => {
                // may also hide a server-side defect
                log::warn!("statement succeeded but the server returned no transaction id for its inline begin");
                self.handle.mark_begin_failed()?;
                Err(Error::InlineBeginTransactionFailed)
            }
        }
    }
}

impl Drop for InlineBeginAttempt<'_> {
    fn drop(&mut self) {
        if self.requested_begin && !self.settled {
            log::debug!("inline begin abandoned before its statement completed");
            if let Err(err) = self.handle.mark_begin_failed() {
                log::warn!("{}", err);
            }
        }
    }
}
