use log::debug;

use crate::error::OptResult;
use crate::optimizer::{Optimizer, OptimizerContext};
use crate::plan::Plan;
use crate::rules::Rule;

pub struct HepOptimizer {
    /// Max number of iteration
    max_iter_times: usize,
    rules: Vec<Box<dyn Rule>>,
    plan: Plan,
    context: OptimizerContext,
}

impl Optimizer for HepOptimizer {
    fn context(&self) -> &OptimizerContext {
        &self.context
    }

    fn find_best_plan(mut self) -> OptResult<Plan> {
        for times in 0..self.max_iter_times {
            // The plan no longer changes after iteration
            let mut fixed_point = true;
            for rule in &self.rules {
                debug!("Applying rule {} in iteration {}", rule.name(), times);
                let new_plan = rule.apply(Plan::new(self.plan.root()), &self.context)?;
                if new_plan != self.plan {
                    debug!("Plan after applying rule {} is {}", rule.name(), new_plan);
                    fixed_point = false;
                }
                self.plan = new_plan;
            }

            if fixed_point {
                break;
            }
        }

        Ok(self.plan)
    }
}

impl HepOptimizer {
    pub fn new(
        max_iter_times: usize,
        rules: Vec<Box<dyn Rule>>,
        plan: Plan,
        context: OptimizerContext,
    ) -> Self {
        Self {
            max_iter_times,
            rules,
            plan,
            context,
        }
    }
}
