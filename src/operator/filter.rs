use crate::error::OptResult;
use crate::expr::Expr;
use crate::operator::LogicalOperatorTrait;
use crate::properties::LogicalProperty;

/// Keeps rows satisfying all conditions.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Filter {
    conditions: Vec<Expr>,
}

impl Filter {
    pub fn new(conditions: Vec<Expr>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Expr] {
        &self.conditions
    }
}

impl LogicalOperatorTrait for Filter {
    fn derive_logical_prop(&self, inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty> {
        Ok(inputs[0].clone())
    }
}
