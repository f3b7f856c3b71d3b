use thiserror::Error;

use crate::expr::Column;

/// Result type used across the optimizer.
///
/// Errors raised by collaborators (e.g. a custom [`StatsDeriver`](crate::stat::StatsDeriver))
/// are carried unchanged, so callers can `downcast_ref` to the concrete type they produced.
pub type OptResult<T> = anyhow::Result<T>;

/// Errors raised by this crate itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptError {
    #[error("statistics of table `{table}` not found")]
    StatisticsNotFound { table: String },
    #[error("column `{column}` not found in input schema")]
    ColumnNotFound { column: Column },
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}
