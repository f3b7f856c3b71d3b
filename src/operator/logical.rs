use enum_as_inner::EnumAsInner;

use crate::error::OptResult;
use crate::operator::{Filter, Join, Limit, LogicalOperatorTrait, Projection, TableScan};
use crate::properties::LogicalProperty;

/// Logical relational operator.
#[derive(Clone, Debug, Hash, Eq, PartialEq, EnumAsInner)]
pub enum LogicalOperator {
    LogicalLimit(Limit),
    LogicalProjection(Projection),
    LogicalFilter(Filter),
    LogicalJoin(Join),
    LogicalScan(TableScan),
}

impl LogicalOperator {
    /// Number of inputs this operator expects.
    pub fn arity(&self) -> usize {
        match self {
            LogicalOperator::LogicalScan(_) => 0,
            LogicalOperator::LogicalJoin(_) => 2,
            _ => 1,
        }
    }
}

impl LogicalOperatorTrait for LogicalOperator {
    fn derive_logical_prop(&self, inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty> {
        match self {
            LogicalOperator::LogicalLimit(op) => op.derive_logical_prop(inputs),
            LogicalOperator::LogicalProjection(op) => op.derive_logical_prop(inputs),
            LogicalOperator::LogicalFilter(op) => op.derive_logical_prop(inputs),
            LogicalOperator::LogicalJoin(op) => op.derive_logical_prop(inputs),
            LogicalOperator::LogicalScan(op) => op.derive_logical_prop(inputs),
        }
    }
}
