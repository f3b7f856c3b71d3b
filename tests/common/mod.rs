#![allow(dead_code)]

use std::collections::HashSet;

use greedy_join_reorder::catalog::InMemoryCatalog;
use greedy_join_reorder::expr::{Column, EqualityEdge, Expr};
use greedy_join_reorder::operator::LogicalOperator;
use greedy_join_reorder::plan::{LogicalPlanBuilder, PlanNodeIdGen, PlanNodeRef};
use greedy_join_reorder::stat::{CatalogStatsDeriver, Statistics};

/// Catalog of tables without column statistics.
pub fn catalog(tables: &[(&str, f64)]) -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    for (name, rows) in tables {
        catalog.add_table(*name, Statistics::new(*rows));
    }
    catalog
}

pub fn stats(tables: &[(&str, f64)]) -> CatalogStatsDeriver<InMemoryCatalog> {
    CatalogStatsDeriver::new(catalog(tables))
}

pub fn scan(id_gen: &PlanNodeIdGen, table: &str, columns: &[&str]) -> PlanNodeRef {
    LogicalPlanBuilder::scan(id_gen, table, columns.iter().copied()).root()
}

pub fn edge(l: (&str, &str), r: (&str, &str)) -> EqualityEdge {
    EqualityEdge::new(Column::new(l.0, l.1), Column::new(r.0, r.1))
}

/// Non join inputs of a join tree, from left to right.
pub fn leaves(plan: &PlanNodeRef) -> Vec<String> {
    match plan.operator() {
        LogicalOperator::LogicalJoin(_) => plan.inputs().iter().flat_map(leaves).collect(),
        _ => vec![plan.to_string()],
    }
}

pub fn join_nodes(plan: &PlanNodeRef) -> Vec<PlanNodeRef> {
    match plan.operator() {
        LogicalOperator::LogicalJoin(_) => {
            let mut joins = vec![plan.clone()];
            for input in plan.inputs() {
                joins.extend(join_nodes(input));
            }
            joins
        }
        _ => vec![],
    }
}

pub fn count_joins_without_edges(plan: &PlanNodeRef) -> usize {
    join_nodes(plan)
        .iter()
        .filter(|join| {
            join.operator()
                .as_logical_join()
                .map_or(false, |j| j.eq_conditions().is_empty())
        })
        .count()
}

fn unordered(edge: &EqualityEdge) -> (Column, Column) {
    if edge.left() <= edge.right() {
        (edge.left().clone(), edge.right().clone())
    } else {
        (edge.right().clone(), edge.left().clone())
    }
}

/// Checks every condition of the join tree is attached exactly once, at the lowest join
/// producing all columns it references.
pub fn assert_predicates_sound(
    plan: &PlanNodeRef,
    expected_edges: &[EqualityEdge],
    expected_others: &[Expr],
) {
    let mut edges = Vec::new();
    let mut others = Vec::new();
    for node in join_nodes(plan) {
        let join = node.operator().as_logical_join().unwrap();
        let (left, right) = (&node.inputs()[0], &node.inputs()[1]);
        for edge in join.eq_conditions() {
            assert!(left.schema().contains(edge.left()), "{} in {}", edge, node);
            assert!(right.schema().contains(edge.right()), "{} in {}", edge, node);
            edges.push(unordered(edge));
        }
        for cond in join.other_conditions() {
            let columns = cond.columns();
            assert!(node.schema().contains_all(&columns), "{} in {}", cond, node);
            for input in node.inputs() {
                if input.operator().as_logical_join().is_some() {
                    assert!(
                        !input.schema().contains_all(&columns),
                        "{} attached later than {}",
                        cond,
                        input
                    );
                }
            }
            others.push(cond.clone());
        }
    }

    let mut expected_edges: Vec<_> = expected_edges.iter().map(unordered).collect();
    expected_edges.sort();
    edges.sort();
    assert_eq!(expected_edges, edges);

    assert_eq!(expected_others.len(), others.len());
    for cond in expected_others {
        assert_eq!(1, others.iter().filter(|c| *c == cond).count(), "{}", cond);
    }
}

/// Checks the plan's output holds exactly the columns of all members.
pub fn assert_complete(plan: &PlanNodeRef, members: &[PlanNodeRef]) {
    let expected: HashSet<Column> = members
        .iter()
        .flat_map(|m| m.schema().columns().iter().cloned())
        .collect();
    let actual: HashSet<Column> = plan.schema().columns().iter().cloned().collect();
    assert_eq!(expected, actual);
    assert_eq!(expected.len(), plan.schema().len());

    let mut expected_leaves: Vec<String> = members.iter().map(|m| m.to_string()).collect();
    let mut actual_leaves = leaves(plan);
    expected_leaves.sort();
    actual_leaves.sort();
    assert_eq!(expected_leaves, actual_leaves);
}
