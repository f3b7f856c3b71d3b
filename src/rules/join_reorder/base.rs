use std::rc::Rc;

use log::debug;

use crate::cost::{Cost, JoinCostModel};
use crate::error::OptResult;
use crate::expr::{EqualityEdge, Expr};
use crate::operator::{Join, JoinType};
use crate::plan::{PlanNode, PlanNodeIdGen, PlanNodeRef};
use crate::properties::Schema;
use crate::stat::StatsDeriver;

/// Builds join nodes for join reorder solvers.
pub trait JoinBuilder {
    /// Inner join of `left` and `right` on `eq_edges` and `other_conds`.
    fn new_join_with_edges(
        &self,
        left: PlanNodeRef,
        right: PlanNodeRef,
        eq_edges: Vec<EqualityEdge>,
        other_conds: Vec<Expr>,
    ) -> PlanNodeRef;

    fn new_cartesian_join(&self, left: PlanNodeRef, right: PlanNodeRef) -> PlanNodeRef {
        self.new_join_with_edges(left, right, vec![], vec![])
    }
}

impl JoinBuilder for PlanNodeIdGen {
    fn new_join_with_edges(
        &self,
        left: PlanNodeRef,
        right: PlanNodeRef,
        eq_edges: Vec<EqualityEdge>,
        other_conds: Vec<Expr>,
    ) -> PlanNodeRef {
        let join = Join::new(JoinType::Inner, eq_edges, other_conds);
        Rc::new(PlanNode::new_join(self.next(), join, left, right))
    }
}

/// A join group member, or a join tree built from members, with its cumulative cost.
#[derive(Clone, Debug)]
pub struct JrNode {
    pub plan: PlanNodeRef,
    pub cum_cost: Cost,
}

/// A join group solved into a single join tree.
#[derive(Debug)]
pub struct ReorderedJoinGroup {
    pub plan: PlanNodeRef,
    /// Conditions not evaluable by any join of the group, because they reference columns
    /// produced outside of it.
    pub remaining_conds: Vec<Expr>,
}

/// Collaborators and working state shared by single group join order solvers.
pub struct BaseSingleGroupJoinOrderSolver<'a> {
    pub(super) stats: &'a dyn StatsDeriver,
    pub(super) cost_model: &'a dyn JoinCostModel,
    pub(super) join_builder: &'a dyn JoinBuilder,
    pub(super) cur_join_group: Vec<JrNode>,
    pub(super) other_conds: Vec<Expr>,
}

impl<'a> BaseSingleGroupJoinOrderSolver<'a> {
    pub fn new(
        stats: &'a dyn StatsDeriver,
        cost_model: &'a dyn JoinCostModel,
        join_builder: &'a dyn JoinBuilder,
        other_conds: Vec<Expr>,
    ) -> Self {
        Self {
            stats,
            cost_model,
            join_builder,
            cur_join_group: vec![],
            other_conds,
        }
    }

    /// Derives statistics of every member and puts them into the group, ordered by base cost.
    ///
    /// Members of equal cost keep their input order.
    pub(super) fn init_join_group(&mut self, join_node_plans: Vec<PlanNodeRef>) -> OptResult<()> {
        let mut group = Vec::with_capacity(join_node_plans.len());
        for plan in join_node_plans {
            plan.derive_stats(self.stats)?;
            let cum_cost = self.cost_model.base_cost(&plan, self.stats)?;
            group.push(JrNode { plan, cum_cost });
        }
        // `sort_by` is stable.
        group.sort_by(|a, b| {
            a.cum_cost
                .partial_cmp(&b.cum_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.cur_join_group = group;
        Ok(())
    }

    /// Derives statistics of `join` and computes its cumulative cost.
    pub(super) fn calc_join_cum_cost(
        &self,
        join: &PlanNode,
        left: &JrNode,
        right: &JrNode,
    ) -> OptResult<Cost> {
        join.derive_stats(self.stats)?;
        self.cost_model
            .join_cost(join, left.cum_cost, right.cum_cost, self.stats)
    }

    /// Splits pending conditions into those evaluable on `schema` and the rest.
    pub(super) fn split_other_conds(&self, schema: &Schema) -> (Vec<Expr>, Vec<Expr>) {
        self.other_conds
            .iter()
            .cloned()
            .partition(|cond| schema.contains_all(&cond.columns()))
    }

    /// Combines trees not connected by any equality condition with cartesian joins.
    ///
    /// Trees are joined pairwise, round by round, which gives a bushy tree. Pending conditions
    /// become attached to the first cartesian join evaluating them.
    pub(super) fn make_bushy_join(
        &mut self,
        mut cartesian_join_group: Vec<PlanNodeRef>,
    ) -> Option<PlanNodeRef> {
        if cartesian_join_group.len() > 1 {
            debug!(
                "Joining {} disconnected join trees with cartesian joins",
                cartesian_join_group.len()
            );
        }
        while cartesian_join_group.len() > 1 {
            let mut result_join_group = Vec::with_capacity((cartesian_join_group.len() + 1) / 2);
            let mut trees = cartesian_join_group.into_iter();
            while let Some(left) = trees.next() {
                match trees.next() {
                    Some(right) => result_join_group.push(self.new_cartesian_join(left, right)),
                    None => result_join_group.push(left),
                }
            }
            cartesian_join_group = result_join_group;
        }
        cartesian_join_group.pop()
    }

    fn new_cartesian_join(&mut self, left: PlanNodeRef, right: PlanNodeRef) -> PlanNodeRef {
        let merged_schema = Schema::merge(left.schema(), right.schema());
        let (attached, remaining) = self.split_other_conds(&merged_schema);
        self.other_conds = remaining;
        if attached.is_empty() {
            self.join_builder.new_cartesian_join(left, right)
        } else {
            self.join_builder
                .new_join_with_edges(left, right, vec![], attached)
        }
    }
}
