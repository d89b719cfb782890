use std::convert::TryFrom;

use google_api_proto::google::spanner::v1 as proto;
use prost_types::ListValue;

use crate::TransactionId;

/// The number of rows modified by a DML statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowCount {
    Exact(i64),
    /// Returned for partitioned DML, where the exact count is unknown.
    LowerBound(i64),
}

impl RowCount {
    pub fn value(&self) -> i64 {
        match self {
            RowCount::Exact(count) | RowCount::LowerBound(count) => *count,
        }
    }
}

/// Statistics returned by the server alongside a statement's rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSetStats {
    row_count: Option<RowCount>,
}

impl ResultSetStats {
    pub fn row_count(&self) -> Option<RowCount> {
        self.row_count
    }
}

impl From<proto::ResultSetStats> for ResultSetStats {
    fn from(value: proto::ResultSetStats) -> Self {
        let row_count = value.row_count.map(|count| match count {
            proto::result_set_stats::RowCount::RowCountExact(count) => RowCount::Exact(count),
            proto::result_set_stats::RowCount::RowCountLowerBound(count) => {
                RowCount::LowerBound(count)
            }
        });
        Self { row_count }
    }
}

/// The rows and statistics produced by a statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<ListValue>,
    stats: Option<ResultSetStats>,
}

impl ResultSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ListValue] {
        &self.rows
    }

    pub fn stats(&self) -> Option<&ResultSetStats> {
        self.stats.as_ref()
    }

    /// The number of rows modified by the statement, if the server reported it.
    pub fn row_count(&self) -> Option<i64> {
        self.stats
            .as_ref()
            .and_then(ResultSetStats::row_count)
            .map(|count| count.value())
    }
}

/// A result set along with the transaction identity the server returned with it, if any.
#[derive(Debug)]
pub(crate) struct ExecutionResult {
    pub(crate) result_set: ResultSet,
    pub(crate) returned_id: Option<TransactionId>,
}

impl TryFrom<proto::ResultSet> for ExecutionResult {
    type Error = crate::Error;

    fn try_from(value: proto::ResultSet) -> Result<Self, Self::Error> {
        let (columns, returned_id) = match value.metadata {
            Some(metadata) => {
                let columns = metadata
                    .row_type
                    .map(|row_type| row_type.fields.into_iter().map(|f| f.name).collect())
                    .unwrap_or_default();
                let returned_id = metadata
                    .transaction
                    .and_then(|tx| TransactionId::new(tx.id.to_vec()));
                (columns, returned_id)
            }
            None => (Vec::new(), None),
        };

        Ok(Self {
            result_set: ResultSet {
                columns,
                rows: value.rows,
                stats: value.stats.map(Into::into),
            },
            returned_id,
        })
    }
}
