//! Optimization rules.

pub mod join_reorder;

use crate::error::OptResult;
use crate::optimizer::OptimizerContext;
use crate::plan::Plan;

/// A rewrite rule, which substitutes its result for the original plan.
pub trait Rule {
    fn name(&self) -> &'static str;

    fn apply(&self, plan: Plan, context: &OptimizerContext) -> OptResult<Plan>;
}
