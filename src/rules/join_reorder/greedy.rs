use log::{debug, trace};
use smallvec::SmallVec;

use crate::cost::{Cost, JoinCostModel};
use crate::error::OptResult;
use crate::expr::{EqualityEdge, Expr};
use crate::plan::PlanNodeRef;
use crate::properties::Schema;
use crate::rules::join_reorder::base::{
    BaseSingleGroupJoinOrderSolver, JoinBuilder, JrNode, ReorderedJoinGroup,
};
use crate::stat::StatsDeriver;

/// Reorders the members of one join group with a greedy algorithm.
///
/// For each member having an equality condition with the current join tree, the cumulative
/// join cost of joining it with the tree is calculated, and the member with the smallest cost
/// is joined with the tree:
///
/// ```text
/// cumulative join cost = CumCost(lhs) + CumCost(rhs) + RowCount(join)
/// ```
///
/// See [`CumulativeRowCount`](crate::cost::CumulativeRowCount) for the cost of a member. When
/// no member is connected with the current tree, the tree is complete and a new tree is
/// started from the cheapest member left. Trees without equality conditions between them are
/// finally combined into a bushy tree of cartesian joins.
pub struct GreedyJoinReorderSolver<'a> {
    base: BaseSingleGroupJoinOrderSolver<'a>,
    eq_edges: Vec<EqualityEdge>,
}

impl<'a> GreedyJoinReorderSolver<'a> {
    pub fn new(
        stats: &'a dyn StatsDeriver,
        cost_model: &'a dyn JoinCostModel,
        join_builder: &'a dyn JoinBuilder,
        eq_edges: Vec<EqualityEdge>,
        other_conds: Vec<Expr>,
    ) -> Self {
        Self {
            base: BaseSingleGroupJoinOrderSolver::new(stats, cost_model, join_builder, other_conds),
            eq_edges,
        }
    }

    /// Joins all `join_node_plans` into one tree.
    ///
    /// Returns `None` for an empty group. Failing to derive statistics of any member or
    /// candidate join aborts the whole solve.
    pub fn solve(
        mut self,
        join_node_plans: Vec<PlanNodeRef>,
    ) -> OptResult<Option<ReorderedJoinGroup>> {
        self.base.init_join_group(join_node_plans)?;

        let mut cartesian_join_group = Vec::new();
        while !self.base.cur_join_group.is_empty() {
            let new_node = self.construct_connected_join_tree()?;
            debug!(
                "Built join tree of connected members with cost {}: {}",
                new_node.cum_cost, new_node.plan
            );
            cartesian_join_group.push(new_node.plan);
        }

        Ok(self
            .base
            .make_bushy_join(cartesian_join_group)
            .map(|plan| ReorderedJoinGroup {
                plan,
                remaining_conds: self.base.other_conds,
            }))
    }

    /// Grows a join tree from the cheapest member until no member left is connected with it.
    fn construct_connected_join_tree(&mut self) -> OptResult<JrNode> {
        let mut cur_join_tree = self.base.cur_join_group.remove(0);
        loop {
            let mut best_cost = Cost::from(f64::MAX);
            let mut best: Option<(usize, PlanNodeRef, Vec<Expr>)> = None;
            for (idx, node) in self.base.cur_join_group.iter().enumerate() {
                let (new_join, remain_others) =
                    match self.check_connection_and_make_join(&cur_join_tree.plan, &node.plan) {
                        Some(join) => join,
                        None => continue,
                    };
                let cur_cost = self
                    .base
                    .calc_join_cum_cost(&new_join, &cur_join_tree, node)?;
                trace!("Candidate join {} has cost {}", new_join, cur_cost);
                if best_cost > cur_cost {
                    best_cost = cur_cost;
                    best = Some((idx, new_join, remain_others));
                }
            }

            // No member left is connected, the sub connected graph has been totally explored.
            let (best_idx, best_join, remain_others) = match best {
                Some(best) => best,
                None => break,
            };
            cur_join_tree = JrNode {
                plan: best_join,
                cum_cost: best_cost,
            };
            self.base.cur_join_group = std::mem::take(&mut self.base.cur_join_group)
                .into_iter()
                .enumerate()
                .filter_map(|(idx, node)| (idx != best_idx).then_some(node))
                .collect();
            self.base.other_conds = remain_others;
        }
        Ok(cur_join_tree)
    }

    /// Joins `left` and `right` on every equality edge connecting them.
    ///
    /// Returns `None` when no edge connects them. Otherwise returns the new join, with pending
    /// conditions evaluable on it attached, together with conditions still pending. Solver state
    /// is left untouched.
    fn check_connection_and_make_join(
        &self,
        left: &PlanNodeRef,
        right: &PlanNodeRef,
    ) -> Option<(PlanNodeRef, Vec<Expr>)> {
        let mut used_edges: SmallVec<[EqualityEdge; 2]> = SmallVec::new();
        for edge in &self.eq_edges {
            if left.schema().contains(edge.left()) && right.schema().contains(edge.right()) {
                used_edges.push(edge.clone());
            } else if right.schema().contains(edge.left()) && left.schema().contains(edge.right())
            {
                used_edges.push(edge.swapped());
            }
        }
        if used_edges.is_empty() {
            return None;
        }

        let merged_schema = Schema::merge(left.schema(), right.schema());
        let (other_conds, remain_other_conds) = self.base.split_other_conds(&merged_schema);
        let new_join = self.base.join_builder.new_join_with_edges(
            left.clone(),
            right.clone(),
            used_edges.into_vec(),
            other_conds,
        );
        Some((new_join, remain_other_conds))
    }
}
