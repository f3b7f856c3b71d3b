//! Statistics of plan nodes and their derivation.

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::error::{OptError, OptResult};
use crate::expr::Column;
use crate::operator::{JoinType, LogicalOperator};
use crate::plan::PlanNode;

/// Default selectivity of a filter condition whose selectivity can't be estimated.
pub const SELECTION_FACTOR: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Statistics {
    row_count: f64,
    column_ndv: HashMap<Column, f64>,
}

impl Statistics {
    pub fn new(row_count: f64) -> Self {
        Self {
            row_count,
            column_ndv: HashMap::new(),
        }
    }

    pub fn with_column_ndv(mut self, column: Column, ndv: f64) -> Self {
        self.column_ndv.insert(column, ndv);
        self
    }

    pub fn row_count(&self) -> f64 {
        self.row_count
    }

    pub fn column_ndv(&self, column: &Column) -> Option<f64> {
        self.column_ndv.get(column).copied()
    }

    /// Scales to `row_count` rows, capping column ndv at the new row count.
    fn scale_to(&self, row_count: f64) -> Statistics {
        Statistics {
            row_count,
            column_ndv: self
                .column_ndv
                .iter()
                .map(|(c, ndv)| (c.clone(), ndv.min(row_count)))
                .collect(),
        }
    }
}

/// Derives statistics of one plan node from statistics of its inputs.
///
/// Recursion over the plan and memoization are done by [`PlanNode::derive_stats`], an
/// implementation only looks at a single operator.
pub trait StatsDeriver {
    fn derive_stats(&self, plan_node: &PlanNode, input_stats: &[&Statistics])
        -> OptResult<Statistics>;
}

/// Estimates row counts from table statistics stored in a [`Catalog`].
pub struct CatalogStatsDeriver<C> {
    catalog: C,
}

impl<C: Catalog> CatalogStatsDeriver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn derive_join_stats(
        &self,
        plan_node: &PlanNode,
        left: &Statistics,
        right: &Statistics,
    ) -> OptResult<Statistics> {
        let join = plan_node.operator().as_logical_join().ok_or_else(|| {
            OptError::InvalidPlan(format!("{:?} is not a join", plan_node.operator()))
        })?;
        let left_schema = plan_node.inputs()[0].schema();

        let ndv_of = |column: &Column| {
            let (stats, side_rows) = if left_schema.contains(column) {
                (left, left.row_count)
            } else {
                (right, right.row_count)
            };
            stats.column_ndv(column).unwrap_or(side_rows)
        };

        let mut row_count = left.row_count * right.row_count;
        let key_ndv = join
            .eq_conditions()
            .iter()
            .map(|edge| ndv_of(edge.left()).max(ndv_of(edge.right())))
            .fold(0.0, f64::max);
        if !join.eq_conditions().is_empty() {
            row_count /= key_ndv.max(1.0);
        }
        if !join.other_conditions().is_empty() {
            row_count *= SELECTION_FACTOR;
        }
        row_count = match join.join_type() {
            JoinType::Inner => row_count,
            JoinType::Left => row_count.max(left.row_count),
            JoinType::Right => row_count.max(right.row_count),
            JoinType::Full => row_count.max(left.row_count.max(right.row_count)),
        };

        let mut column_ndv = left.column_ndv.clone();
        column_ndv.extend(right.column_ndv.iter().map(|(c, ndv)| (c.clone(), *ndv)));
        Ok(Statistics {
            row_count,
            column_ndv,
        }
        .scale_to(row_count))
    }
}

impl<C: Catalog> StatsDeriver for CatalogStatsDeriver<C> {
    fn derive_stats(
        &self,
        plan_node: &PlanNode,
        input_stats: &[&Statistics],
    ) -> OptResult<Statistics> {
        match plan_node.operator() {
            LogicalOperator::LogicalScan(scan) => {
                let stats = self.catalog.table_stats(scan.table_name()).ok_or_else(|| {
                    OptError::StatisticsNotFound {
                        table: scan.table_name().to_string(),
                    }
                })?;
                Ok(match scan.limit() {
                    Some(limit) => stats.scale_to(stats.row_count.min(limit as f64)),
                    None => stats,
                })
            }
            LogicalOperator::LogicalFilter(filter) => {
                let input = input_stats[0];
                let selectivity = SELECTION_FACTOR.powi(filter.conditions().len() as i32);
                Ok(input.scale_to(input.row_count * selectivity))
            }
            LogicalOperator::LogicalProjection(projection) => {
                let input = input_stats[0];
                Ok(Statistics {
                    row_count: input.row_count,
                    column_ndv: projection
                        .columns()
                        .iter()
                        .filter_map(|c| input.column_ndv(c).map(|ndv| (c.clone(), ndv)))
                        .collect(),
                })
            }
            LogicalOperator::LogicalLimit(limit) => {
                let input = input_stats[0];
                Ok(input.scale_to(input.row_count.min(limit.limit() as f64)))
            }
            LogicalOperator::LogicalJoin(_) => {
                self.derive_join_stats(plan_node, input_stats[0], input_stats[1])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::expr::col;
    use crate::operator::{JoinType, TableScan};
    use crate::plan::{LogicalPlanBuilder, PlanNodeIdGen};

    fn catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.add_table(
            "orders",
            Statistics::new(1000.0).with_column_ndv(Column::new("orders", "cust_id"), 100.0),
        );
        catalog.add_table(
            "customer",
            Statistics::new(100.0).with_column_ndv(Column::new("customer", "id"), 100.0),
        );
        catalog
    }

    #[test]
    fn test_equi_join_row_count() {
        let id_gen = PlanNodeIdGen::new();
        let customer = LogicalPlanBuilder::scan(&id_gen, "customer", ["id"]).root();
        let plan = LogicalPlanBuilder::scan(&id_gen, "orders", ["cust_id"])
            .join(
                JoinType::Inner,
                vec![col("orders", "cust_id").eq(col("customer", "id"))],
                customer,
            )
            .unwrap()
            .build();

        let deriver = CatalogStatsDeriver::new(catalog());
        let stats = plan.root().derive_stats(&deriver).unwrap().clone();
        assert_eq!(1000.0, stats.row_count());
        assert_eq!(Some(100.0), stats.column_ndv(&Column::new("customer", "id")));
    }

    #[test]
    fn test_cartesian_and_filter_row_count() {
        let id_gen = PlanNodeIdGen::new();
        let customer = LogicalPlanBuilder::scan(&id_gen, "customer", ["id"]).root();
        let plan = LogicalPlanBuilder::scan(&id_gen, "orders", ["cust_id"])
            .cross_join(customer)
            .unwrap()
            .filter(vec![col("orders", "cust_id").lt(col("customer", "id"))])
            .unwrap()
            .limit(50_000)
            .unwrap()
            .build();

        let deriver = CatalogStatsDeriver::new(catalog());
        let root = plan.root();
        let stats = root.derive_stats(&deriver).unwrap();
        assert_eq!(50_000.0, stats.row_count());
        let filter_stats = root.inputs()[0].stat().unwrap();
        assert_eq!(80_000.0, filter_stats.row_count());
    }

    #[test]
    fn test_outer_join_keeps_preserved_side() {
        let id_gen = PlanNodeIdGen::new();
        let customer = LogicalPlanBuilder::scan(&id_gen, "customer", ["id"]).root();
        let plan = LogicalPlanBuilder::scan(&id_gen, "orders", ["cust_id"])
            .limit(10)
            .unwrap()
            .join(
                JoinType::Right,
                vec![col("orders", "cust_id").eq(col("customer", "id"))],
                customer,
            )
            .unwrap()
            .build();

        let deriver = CatalogStatsDeriver::new(catalog());
        assert_eq!(100.0, plan.root().derive_stats(&deriver).unwrap().row_count());
    }

    #[test]
    fn test_scan_with_limit() {
        let id_gen = PlanNodeIdGen::new();
        let scan = TableScan::new("orders", ["cust_id"]).with_limit(20);
        let plan = LogicalPlanBuilder::from_scan(&id_gen, scan).build();

        let deriver = CatalogStatsDeriver::new(catalog());
        let root = plan.root();
        let stats = root.derive_stats(&deriver).unwrap();
        assert_eq!(20.0, stats.row_count());
        assert_eq!(Some(20.0), stats.column_ndv(&Column::new("orders", "cust_id")));
    }

    #[test]
    fn test_missing_table_statistics() {
        let id_gen = PlanNodeIdGen::new();
        let plan = LogicalPlanBuilder::scan(&id_gen, "lineitem", ["id"]).build();

        let deriver = CatalogStatsDeriver::new(catalog());
        let err = plan.root().derive_stats(&deriver).unwrap_err();
        assert_eq!(
            Some(&OptError::StatisticsNotFound {
                table: "lineitem".to_string()
            }),
            err.downcast_ref::<OptError>()
        );
        assert!(plan.root().stat().is_none());
    }
}
