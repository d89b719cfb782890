use google_api_proto::google::spanner::v1 as proto;

use crate::Error;

/// The opaque, server-assigned identity of a read-write transaction.
///
/// A `TransactionId` is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(Vec<u8>);

impl TransactionId {
    /// Returns `None` when `id` is empty, the server never assigns an empty identity.
    pub fn new(id: impl Into<Vec<u8>>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&proto::Transaction> for TransactionId {
    type Error = Error;

    fn try_from(value: &proto::Transaction) -> Result<Self, Self::Error> {
        TransactionId::new(value.id.to_vec())
            .ok_or_else(|| Error::Codec("server returned an empty transaction id".to_string()))
    }
}

/// Which transaction a request executes in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TransactionSelector {
    Id(TransactionId),
    Begin,
}

pub(crate) fn read_write_options() -> proto::TransactionOptions {
    proto::TransactionOptions {
        mode: Some(proto::transaction_options::Mode::ReadWrite(
            Default::default(),
        )),
        ..Default::default()
    }
}

impl From<TransactionSelector> for proto::TransactionSelector {
    fn from(value: TransactionSelector) -> Self {
        let selector = match value {
            TransactionSelector::Id(id) => proto::transaction_selector::Selector::Id(id.0.into()),
            TransactionSelector::Begin => {
                proto::transaction_selector::Selector::Begin(read_write_options())
            }
        };
        proto::TransactionSelector {
            selector: Some(selector),
        }
    }
}

/// How far a read-write transaction got in obtaining its server-side identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionState {
    /// No identity yet, the next statement will ask the server to begin the transaction inline.
    Unresolved,
    /// The server assigned this identity. It never changes afterwards.
    Resolved(TransactionId),
    /// An inline begin did not produce an identity.
    /// The transaction must be restarted with an explicit begin.
    BeginFailed,
}

/// Client-side state of a read-write transaction's identity.
///
/// Transitions are only `Unresolved -> Resolved` and `Unresolved -> BeginFailed`.
/// A handle is used by one statement at a time.
#[derive(Debug)]
pub(crate) struct TransactionHandle {
    state: ResolutionState,
}

impl Default for TransactionHandle {
    fn default() -> Self {
        Self {
            state: ResolutionState::Unresolved,
        }
    }
}

impl TransactionHandle {
    pub(crate) fn state(&self) -> &ResolutionState {
        &self.state
    }

    pub(crate) fn id(&self) -> Option<&TransactionId> {
        match &self.state {
            ResolutionState::Resolved(id) => Some(id),
            _ => None,
        }
    }

    pub(crate) fn current_selector(&self) -> Result<TransactionSelector, Error> {
        match &self.state {
            ResolutionState::Unresolved => Ok(TransactionSelector::Begin),
            ResolutionState::Resolved(id) => Ok(TransactionSelector::Id(id.clone())),
            ResolutionState::BeginFailed => Err(Error::InvalidState(
                "inline begin failed, the transaction must be restarted with an explicit begin"
                    .to_string(),
            )),
        }
    }

    pub(crate) fn commit(&mut self, id: TransactionId) -> Result<(), Error> {
        match &self.state {
            ResolutionState::Unresolved => {
                self.state = ResolutionState::Resolved(id);
                Ok(())
            }
            other => Err(Error::ProtocolViolation(format!(
                "cannot resolve transaction identity in state {:?}",
                other
            ))),
        }
    }

    pub(crate) fn mark_begin_failed(&mut self) -> Result<(), Error> {
        match &self.state {
            ResolutionState::Unresolved | ResolutionState::BeginFailed => {
                self.state = ResolutionState::BeginFailed;
                Ok(())
            }
            ResolutionState::Resolved(_) => Err(Error::ProtocolViolation(
                "cannot fail the begin of a resolved transaction".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn id(bytes: &[u8]) -> TransactionId {
        TransactionId::new(bytes).unwrap()
    }

    #[test]
    fn test_empty_id() {
        assert!(TransactionId::new(Vec::new()).is_none());
        assert_eq!(id(b"txn-7").as_bytes(), b"txn-7");
    }

    #[test]
    fn test_unresolved_selector() {
        let handle = TransactionHandle::default();
        assert_eq!(handle.state(), &ResolutionState::Unresolved);
        assert_eq!(
            handle.current_selector().unwrap(),
            TransactionSelector::Begin
        );
        assert!(handle.id().is_none());
    }

    #[test]
    fn test_commit_once() {
        let mut handle = TransactionHandle::default();
        handle.commit(id(b"txn-7")).unwrap();
        assert_eq!(handle.id(), Some(&id(b"txn-7")));
        assert_eq!(
            handle.current_selector().unwrap(),
            TransactionSelector::Id(id(b"txn-7"))
        );

        for other in [&b"txn-8"[..], &b"txn-7"[..]] {
            assert!(matches!(
                handle.commit(id(other)),
                Err(Error::ProtocolViolation(_))
            ));
        }
        assert_eq!(handle.id(), Some(&id(b"txn-7")));
    }

    #[test]
    fn test_begin_failed() {
        let mut handle = TransactionHandle::default();
        handle.mark_begin_failed().unwrap();
        handle.mark_begin_failed().unwrap();
        assert_eq!(handle.state(), &ResolutionState::BeginFailed);
        assert!(matches!(
            handle.current_selector(),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            handle.commit(id(b"txn-7")),
            Err(Error::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_resolved_cannot_fail() {
        let mut handle = TransactionHandle::default();
        handle.commit(id(b"txn-7")).unwrap();
        assert!(matches!(
            handle.mark_begin_failed(),
            Err(Error::ProtocolViolation(_))
        ));
        assert_eq!(handle.id(), Some(&id(b"txn-7")));
    }

    #[test]
    fn test_selector_to_proto() {
        let selector: proto::TransactionSelector = TransactionSelector::Begin.into();
        assert!(matches!(
            selector.selector,
            Some(proto::transaction_selector::Selector::Begin(
                proto::TransactionOptions {
                    mode: Some(proto::transaction_options::Mode::ReadWrite(_)),
                    ..
                }
            ))
        ));

        let selector: proto::TransactionSelector = TransactionSelector::Id(id(b"txn-7")).into();
        match selector.selector {
            Some(proto::transaction_selector::Selector::Id(bytes)) => {
                assert_eq!(bytes.to_vec(), b"txn-7".to_vec())
            }
            other => panic!("unexpected selector {:?}", other),
        }
    }
}
