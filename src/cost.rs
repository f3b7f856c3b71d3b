//! Cost estimation used for ranking join orders.

use derive_more::{Add, AddAssign, Display, From, Into};

use crate::error::OptResult;
use crate::plan::PlanNode;
use crate::stat::StatsDeriver;

/// A heuristic score, lower is better.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, From, Into, Add, AddAssign, Display)]
pub struct Cost(f64);

impl Cost {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Cumulative cost of join trees built while reordering joins.
pub trait JoinCostModel {
    /// Cost of a join group member before it's joined with anything.
    fn base_cost(&self, plan_node: &PlanNode, deriver: &dyn StatsDeriver) -> OptResult<Cost>;

    /// Cost of `join`, whose inputs have cumulative costs `left` and `right`.
    fn join_cost(
        &self,
        join: &PlanNode,
        left: Cost,
        right: Cost,
        deriver: &dyn StatsDeriver,
    ) -> OptResult<Cost>;
}

/// Cost as the number of rows produced by every operator of a tree.
///
/// For a member, it's the sum of row counts over its whole subtree. For a join, it's
/// `left + right + rows(join)`. It only approximates the physical cost.
#[derive(Copy, Clone, Debug, Default)]
pub struct CumulativeRowCount;

impl JoinCostModel for CumulativeRowCount {
    fn base_cost(&self, plan_node: &PlanNode, deriver: &dyn StatsDeriver) -> OptResult<Cost> {
        let mut cost = Cost::from(plan_node.derive_stats(deriver)?.row_count());
        for input in plan_node.inputs() {
            cost += self.base_cost(input, deriver)?;
        }
        Ok(cost)
    }

    fn join_cost(
        &self,
        join: &PlanNode,
        left: Cost,
        right: Cost,
        deriver: &dyn StatsDeriver,
    ) -> OptResult<Cost> {
        Ok(Cost::from(join.derive_stats(deriver)?.row_count()) + left + right)
    }
}
