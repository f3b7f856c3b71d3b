use std::cell::{Cell, OnceCell};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::mem::swap;
use std::rc::Rc;

use anyhow::ensure;
use itertools::Itertools;

use crate::error::OptResult;
use crate::expr::{Column, Expr};
use crate::operator::LogicalOperator::{
    LogicalFilter, LogicalJoin, LogicalLimit, LogicalProjection, LogicalScan,
};
use crate::operator::{
    Filter, Join, JoinType, Limit, LogicalOperator, LogicalOperatorTrait, Projection, TableScan,
};
use crate::properties::{LogicalProperty, Schema};
use crate::stat::{Statistics, StatsDeriver};

pub type PlanNodeId = u32;

pub type PlanNodeRef = Rc<PlanNode>;

/// Generates unique plan node ids.
#[derive(Debug, Default)]
pub struct PlanNodeIdGen {
    next: Cell<PlanNodeId>,
}

impl PlanNodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts generating after ids already used by `plan`.
    pub fn after(plan: &Plan) -> Self {
        let max_id = plan.bfs_iterator().map(|node| node.id).max().unwrap_or(0);
        Self {
            next: Cell::new(max_id + 1),
        }
    }

    pub fn next(&self) -> PlanNodeId {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }
}

/// One node in a plan.
///
/// Plan nodes are immutable once built, except statistics, which are derived lazily and
/// memoized on the node.
#[derive(Debug)]
pub struct PlanNode {
    id: PlanNodeId,
    operator: LogicalOperator,
    inputs: Vec<PlanNodeRef>,
    logical_prop: LogicalProperty,
    stat: OnceCell<Statistics>,
}

/// The `eq` should ignore `id` and derived statistics.
impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator
            && self.inputs == other.inputs
            && self.logical_prop == other.logical_prop
    }
}

/// A query plan.
///
/// A query plan is a single root dag(directed acyclic graph).
#[derive(PartialEq, Debug)]
pub struct Plan {
    root: PlanNodeRef,
}

/// Breath first iterator of a single root dag plan.
struct BFSPlanNodeIter {
    visited: HashSet<PlanNodeId>,
    cur_level: Vec<PlanNodeRef>,
    next_level: Vec<PlanNodeRef>,
}

impl Iterator for BFSPlanNodeIter {
    type Item = PlanNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur_level.is_empty() {
            swap(&mut self.cur_level, &mut self.next_level);
        }

        if let Some(p) = self.cur_level.pop() {
            for input in &p.inputs {
                if !self.visited.contains(&input.id) {
                    self.next_level.push(input.clone());
                    self.visited.insert(input.id);
                }
            }

            Some(p)
        } else {
            None
        }
    }
}

impl Plan {
    pub fn new(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    pub fn bfs_iterator(&self) -> impl Iterator<Item = PlanNodeRef> {
        let mut visited = HashSet::new();
        visited.insert(self.root.id);

        BFSPlanNodeIter {
            cur_level: vec![self.root.clone()],
            next_level: vec![],
            visited,
        }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl PlanNode {
    /// Creates a plan node, deriving its logical property from `inputs`.
    pub fn new(
        id: PlanNodeId,
        operator: LogicalOperator,
        inputs: Vec<PlanNodeRef>,
    ) -> OptResult<Self> {
        ensure!(
            inputs.len() == operator.arity(),
            "{:?} expects {} inputs, but got {}",
            operator,
            operator.arity(),
            inputs.len()
        );
        let input_props: Vec<&LogicalProperty> = inputs.iter().map(|i| &i.logical_prop).collect();
        let logical_prop = operator.derive_logical_prop(&input_props)?;
        Ok(Self {
            id,
            operator,
            inputs,
            logical_prop,
            stat: OnceCell::new(),
        })
    }

    /// Creates a join node. Joins never fail to derive their logical property.
    pub fn new_join(id: PlanNodeId, join: Join, left: PlanNodeRef, right: PlanNodeRef) -> Self {
        let logical_prop = LogicalProperty::new(Schema::merge(left.schema(), right.schema()));
        Self {
            id,
            operator: LogicalJoin(join),
            inputs: vec![left, right],
            logical_prop,
            stat: OnceCell::new(),
        }
    }

    pub fn operator(&self) -> &LogicalOperator {
        &self.operator
    }

    pub fn id(&self) -> PlanNodeId {
        self.id
    }

    pub fn inputs(&self) -> &[PlanNodeRef] {
        &self.inputs
    }

    pub fn logical_prop(&self) -> &LogicalProperty {
        &self.logical_prop
    }

    pub fn schema(&self) -> &Schema {
        self.logical_prop.schema()
    }

    /// Statistics, if already derived.
    pub fn stat(&self) -> Option<&Statistics> {
        self.stat.get()
    }

    /// Derives statistics of this node and, recursively, of its inputs.
    ///
    /// Derived statistics are memoized, so deriving again is cheap. Nothing is memoized on a
    /// node whose derivation failed.
    pub fn derive_stats(&self, deriver: &dyn StatsDeriver) -> OptResult<&Statistics> {
        if let Some(stat) = self.stat.get() {
            return Ok(stat);
        }

        let input_stats = self
            .inputs
            .iter()
            .map(|input| input.derive_stats(deriver))
            .collect::<OptResult<Vec<_>>>()?;
        let stat = deriver.derive_stats(self, &input_stats)?;
        Ok(self.stat.get_or_init(|| stat))
    }
}

impl Display for PlanNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.operator {
            LogicalScan(scan) => write!(f, "{}", scan.table_name()),
            LogicalFilter(filter) => write!(
                f,
                "Filter[{}]({})",
                filter.conditions().iter().join(", "),
                self.inputs[0]
            ),
            LogicalProjection(projection) => write!(
                f,
                "Projection[{}]({})",
                projection.columns().iter().join(", "),
                self.inputs[0]
            ),
            LogicalLimit(limit) => write!(f, "Limit[{}]({})", limit.limit(), self.inputs[0]),
            LogicalJoin(join) if join.is_cartesian() => {
                write!(f, "CrossJoin({}, {})", self.inputs[0], self.inputs[1])
            }
            LogicalJoin(join) => {
                let conditions = join
                    .eq_conditions()
                    .iter()
                    .map(|edge| edge.to_string())
                    .chain(join.other_conditions().iter().map(|e| e.to_string()))
                    .join(", ");
                write!(
                    f,
                    "{}Join[{}]({}, {})",
                    join.join_type(),
                    conditions,
                    self.inputs[0],
                    self.inputs[1]
                )
            }
        }
    }
}

/// Builds a logical plan bottom up.
///
/// Multi child plans, e.g. join, are built by building the right input first and passing its
/// root.
pub struct LogicalPlanBuilder<'a> {
    root: PlanNodeRef,
    id_gen: &'a PlanNodeIdGen,
}

impl<'a> LogicalPlanBuilder<'a> {
    pub fn scan<S, C, I>(id_gen: &'a PlanNodeIdGen, table_name: S, column_names: I) -> Self
    where
        S: Into<String>,
        C: Into<String>,
        I: IntoIterator<Item = C>,
    {
        Self::from_scan(id_gen, TableScan::new(table_name, column_names))
    }

    pub fn from_scan(id_gen: &'a PlanNodeIdGen, table_scan: TableScan) -> Self {
        let root = Rc::new(PlanNode {
            id: id_gen.next(),
            logical_prop: LogicalProperty::new(Schema::new(table_scan.columns().to_vec())),
            operator: LogicalScan(table_scan),
            inputs: vec![],
            stat: OnceCell::new(),
        });
        Self { root, id_gen }
    }

    fn reset_root(mut self, operator: LogicalOperator, inputs: Vec<PlanNodeRef>) -> OptResult<Self> {
        self.root = Rc::new(PlanNode::new(self.id_gen.next(), operator, inputs)?);
        Ok(self)
    }

    pub fn filter(self, conditions: Vec<Expr>) -> OptResult<Self> {
        let input = self.root.clone();
        self.reset_root(LogicalFilter(Filter::new(conditions)), vec![input])
    }

    pub fn projection(self, columns: Vec<Column>) -> OptResult<Self> {
        let input = self.root.clone();
        self.reset_root(LogicalProjection(Projection::new(columns)), vec![input])
    }

    pub fn limit(self, limit: usize) -> OptResult<Self> {
        let input = self.root.clone();
        self.reset_root(LogicalLimit(Limit::new(limit)), vec![input])
    }

    /// Joins current root with `right` on a conjunction of `conditions`.
    pub fn join(
        self,
        join_type: JoinType,
        conditions: Vec<Expr>,
        right: PlanNodeRef,
    ) -> OptResult<Self> {
        let join = match join_type {
            JoinType::Inner => Join::inner(conditions),
            _ => {
                let inner = Join::inner(conditions);
                Join::new(
                    join_type,
                    inner.eq_conditions().to_vec(),
                    inner.other_conditions().to_vec(),
                )
            }
        };
        let left = self.root.clone();
        self.reset_root(LogicalJoin(join), vec![left, right])
    }

    pub fn cross_join(self, right: PlanNodeRef) -> OptResult<Self> {
        let left = self.root.clone();
        self.reset_root(LogicalJoin(Join::cartesian()), vec![left, right])
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    pub fn build(self) -> Plan {
        Plan { root: self.root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptError;
    use crate::expr::col;

    #[test]
    fn test_build_and_display() {
        let id_gen = PlanNodeIdGen::new();
        let b = LogicalPlanBuilder::scan(&id_gen, "b", ["y"]).root();
        let plan = LogicalPlanBuilder::scan(&id_gen, "a", ["x", "z"])
            .join(JoinType::Inner, vec![col("a", "x").eq(col("b", "y"))], b)
            .unwrap()
            .projection(vec![Column::new("b", "y"), Column::new("a", "x")])
            .unwrap()
            .build();

        assert_eq!(
            "Projection[b.y, a.x](InnerJoin[a.x = b.y](a, b))",
            plan.to_string()
        );
        assert_eq!("[b.y, a.x]", plan.root().schema().to_string());
        assert_eq!(4, plan.bfs_iterator().count());
    }

    #[test]
    fn test_projection_of_unknown_column() {
        let id_gen = PlanNodeIdGen::new();
        let err = LogicalPlanBuilder::scan(&id_gen, "a", ["x"])
            .projection(vec![Column::new("a", "y")])
            .err()
            .unwrap();

        assert_eq!(
            Some(&OptError::ColumnNotFound {
                column: Column::new("a", "y")
            }),
            err.downcast_ref::<OptError>()
        );
    }

    #[test]
    fn test_plan_node_arity() {
        let id_gen = PlanNodeIdGen::new();
        let a = LogicalPlanBuilder::scan(&id_gen, "a", ["x"]).root();
        assert!(PlanNode::new(id_gen.next(), LogicalJoin(Join::cartesian()), vec![a]).is_err());
    }

    #[test]
    fn test_eq_ignores_id() {
        let gen1 = PlanNodeIdGen::new();
        let gen2 = PlanNodeIdGen::new();
        gen2.next();
        let p1 = LogicalPlanBuilder::scan(&gen1, "a", ["x"]).limit(3).unwrap().build();
        let p2 = LogicalPlanBuilder::scan(&gen2, "a", ["x"]).limit(3).unwrap().build();
        assert_ne!(p1.root().id(), p2.root().id());
        assert_eq!(p1, p2);

        let id_gen = PlanNodeIdGen::after(&p2);
        assert_eq!(3, id_gen.next());
    }
}
