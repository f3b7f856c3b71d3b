use std::rc::Rc;

use crate::cost::{CumulativeRowCount, JoinCostModel};
use crate::error::OptResult;
use crate::expr::{EqualityEdge, Expr};
use crate::plan::{Plan, PlanNodeId, PlanNodeIdGen, PlanNodeRef};
use crate::rules::join_reorder::{JoinBuilder, JoinReorderConfig};
use crate::stat::StatsDeriver;

/// An optimizer turns a plan into a better one.
pub trait Optimizer {
    fn context(&self) -> &OptimizerContext;

    fn find_best_plan(self) -> OptResult<Plan>;
}

/// Collaborators and configuration shared by rules during one optimization.
pub struct OptimizerContext {
    id_gen: PlanNodeIdGen,
    stats_deriver: Rc<dyn StatsDeriver>,
    cost_model: Rc<dyn JoinCostModel>,
    join_reorder_config: JoinReorderConfig,
}

impl OptimizerContext {
    /// Creates a context whose new plan nodes get ids not used by `plan`.
    pub fn new(plan: &Plan, stats_deriver: Rc<dyn StatsDeriver>) -> Self {
        Self {
            id_gen: PlanNodeIdGen::after(plan),
            stats_deriver,
            cost_model: Rc::new(CumulativeRowCount),
            join_reorder_config: JoinReorderConfig::default(),
        }
    }

    pub fn with_cost_model(mut self, cost_model: Rc<dyn JoinCostModel>) -> Self {
        self.cost_model = cost_model;
        self
    }

    pub fn with_join_reorder_config(mut self, config: JoinReorderConfig) -> Self {
        self.join_reorder_config = config;
        self
    }

    pub fn next_plan_node_id(&self) -> PlanNodeId {
        self.id_gen.next()
    }

    pub fn stats_deriver(&self) -> &dyn StatsDeriver {
        &*self.stats_deriver
    }

    pub fn cost_model(&self) -> &dyn JoinCostModel {
        &*self.cost_model
    }

    pub fn join_reorder_config(&self) -> &JoinReorderConfig {
        &self.join_reorder_config
    }
}

impl JoinBuilder for OptimizerContext {
    fn new_join_with_edges(
        &self,
        left: PlanNodeRef,
        right: PlanNodeRef,
        eq_edges: Vec<EqualityEdge>,
        other_conds: Vec<Expr>,
    ) -> PlanNodeRef {
        self.id_gen
            .new_join_with_edges(left, right, eq_edges, other_conds)
    }
}
