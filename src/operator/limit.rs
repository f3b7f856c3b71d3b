use crate::error::OptResult;
use crate::operator::LogicalOperatorTrait;
use crate::properties::LogicalProperty;

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Limit {
    limit: usize,
}

impl Limit {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl LogicalOperatorTrait for Limit {
    fn derive_logical_prop(&self, inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty> {
        Ok(inputs[0].clone())
    }
}
