//! Join reorder rule.
//!
//! A tree of inner joins is flattened into a *join group*: the non inner join inputs of the
//! tree become members, equality conditions between two columns become edges of the join graph,
//! and all other conditions are attached to the first join whose inputs produce every column
//! they reference. The group is then rebuilt in the order chosen by
//! [`GreedyJoinReorderSolver`].

mod base;
pub use base::*;
mod greedy;
pub use greedy::*;

use std::rc::Rc;

use log::debug;

use crate::error::OptResult;
use crate::expr::{Column, EqualityEdge, Expr};
use crate::operator::LogicalOperator::{LogicalFilter, LogicalJoin, LogicalProjection};
use crate::operator::{Filter, JoinType, Projection};
use crate::optimizer::OptimizerContext;
use crate::plan::{Plan, PlanNode, PlanNodeRef};
use crate::rules::Rule;

/// Configuration of [`JoinReorderRule`].
#[derive(Clone, Debug, PartialEq)]
pub struct JoinReorderConfig {
    pub enabled: bool,
    /// Join groups with more members are kept in their original order.
    pub max_group_size: usize,
    /// Adds a projection above a reordered join group when its output column order changed.
    pub restore_column_order: bool,
}

impl Default for JoinReorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_group_size: 64,
            restore_column_order: true,
        }
    }
}

impl JoinReorderConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_max_group_size(mut self, max_group_size: usize) -> Self {
        self.max_group_size = max_group_size;
        self
    }

    pub fn with_restore_column_order(mut self, restore_column_order: bool) -> Self {
        self.restore_column_order = restore_column_order;
        self
    }
}

/// Members and conditions of a flattened inner join tree.
#[derive(Debug, Default)]
struct JoinGroup {
    members: Vec<PlanNodeRef>,
    eq_edges: Vec<EqualityEdge>,
    other_conds: Vec<Expr>,
}

impl JoinGroup {
    fn extract(plan: &PlanNodeRef) -> JoinGroup {
        let mut group = JoinGroup::default();
        group.extract_recursive(plan);

        // An edge must connect two different members, anything else is an ordinary condition.
        let (eq_edges, others): (Vec<_>, Vec<_>) = std::mem::take(&mut group.eq_edges)
            .into_iter()
            .partition(|edge| {
                match (group.member_of(edge.left()), group.member_of(edge.right())) {
                    (Some(l), Some(r)) => l != r,
                    _ => false,
                }
            });
        group.eq_edges = eq_edges;
        group
            .other_conds
            .extend(others.iter().map(EqualityEdge::to_expr));
        group
    }

    fn extract_recursive(&mut self, plan: &PlanNodeRef) {
        match plan.operator() {
            LogicalJoin(join) if join.join_type() == JoinType::Inner => {
                for input in plan.inputs() {
                    self.extract_recursive(input);
                }
                self.eq_edges.extend(join.eq_conditions().iter().cloned());
                self.other_conds
                    .extend(join.other_conditions().iter().cloned());
            }
            _ => self.members.push(plan.clone()),
        }
    }

    fn member_of(&self, column: &Column) -> Option<usize> {
        self.members
            .iter()
            .position(|member| member.schema().contains(column))
    }
}

/// Reorders every group of inner joins in a plan.
pub struct JoinReorderRule;

impl Rule for JoinReorderRule {
    fn name(&self) -> &'static str {
        "JoinReorderRule"
    }

    fn apply(&self, plan: Plan, context: &OptimizerContext) -> OptResult<Plan> {
        Ok(Plan::new(self.optimize_recursive(&plan.root(), context)?))
    }
}

impl JoinReorderRule {
    fn optimize_recursive(
        &self,
        plan: &PlanNodeRef,
        context: &OptimizerContext,
    ) -> OptResult<PlanNodeRef> {
        let is_inner_join = plan
            .operator()
            .as_logical_join()
            .map_or(false, |join| join.join_type() == JoinType::Inner);
        if !is_inner_join {
            let inputs = plan
                .inputs()
                .iter()
                .map(|input| self.optimize_recursive(input, context))
                .collect::<OptResult<Vec<_>>>()?;
            return with_new_inputs(plan, inputs, context);
        }

        let group = JoinGroup::extract(plan);
        let members = group
            .members
            .iter()
            .map(|member| self.optimize_recursive(member, context))
            .collect::<OptResult<Vec<_>>>()?;

        let config = context.join_reorder_config();
        if !config.enabled || members.len() > config.max_group_size {
            debug!(
                "Keeping original order of join group with {} members",
                members.len()
            );
            return replace_members(plan, &mut members.into_iter(), context);
        }

        debug!(
            "Reordering join group with {} members, {} equality edges and {} other conditions",
            members.len(),
            group.eq_edges.len(),
            group.other_conds.len()
        );
        let solver = GreedyJoinReorderSolver::new(
            context.stats_deriver(),
            context.cost_model(),
            context,
            group.eq_edges,
            group.other_conds,
        );
        let reordered = match solver.solve(members)? {
            Some(reordered) => reordered,
            None => return Ok(plan.clone()),
        };

        let mut new_plan = reordered.plan;
        if !reordered.remaining_conds.is_empty() {
            new_plan = Rc::new(PlanNode::new(
                context.next_plan_node_id(),
                LogicalFilter(Filter::new(reordered.remaining_conds)),
                vec![new_plan],
            )?);
        }
        if config.restore_column_order && new_plan.schema() != plan.schema() {
            new_plan = Rc::new(PlanNode::new(
                context.next_plan_node_id(),
                LogicalProjection(Projection::new(plan.schema().columns().to_vec())),
                vec![new_plan],
            )?);
        }
        Ok(new_plan)
    }
}

/// Rebuilds `plan` with `inputs`, or returns it unchanged when inputs are the same.
fn with_new_inputs(
    plan: &PlanNodeRef,
    inputs: Vec<PlanNodeRef>,
    context: &OptimizerContext,
) -> OptResult<PlanNodeRef> {
    let unchanged = plan
        .inputs()
        .iter()
        .zip(inputs.iter())
        .all(|(old, new)| Rc::ptr_eq(old, new));
    if unchanged {
        return Ok(plan.clone());
    }

    Ok(Rc::new(PlanNode::new(
        context.next_plan_node_id(),
        plan.operator().clone(),
        inputs,
    )?))
}

/// Rebuilds a flattened inner join tree, taking members in the order they were extracted.
fn replace_members(
    plan: &PlanNodeRef,
    members: &mut impl Iterator<Item = PlanNodeRef>,
    context: &OptimizerContext,
) -> OptResult<PlanNodeRef> {
    match plan.operator() {
        LogicalJoin(join) if join.join_type() == JoinType::Inner => {
            let inputs = plan
                .inputs()
                .iter()
                .map(|input| replace_members(input, members, context))
                .collect::<OptResult<Vec<_>>>()?;
            with_new_inputs(plan, inputs, context)
        }
        _ => Ok(members.next().unwrap_or_else(|| plan.clone())),
    }
}
