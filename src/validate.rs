use crate::{Error, ResultSet, Statement};

/// DML must report statistics, a response without them means the statement was not DML.
pub(crate) fn require_statistics(
    statement: &Statement,
    result_set: ResultSet,
) -> Result<ResultSet, Error> {
    if result_set.stats().is_none() {
        return Err(Error::MissingResultStatistics {
            sql: statement.sql().to_string(),
        });
    }
    Ok(result_set)
}
