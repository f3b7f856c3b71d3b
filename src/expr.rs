//! Scalar expressions used as join and filter conditions.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use derive_more::Display;
use strum_macros::{AsRefStr, Display as StrumDisplay};

/// A column reference, qualified by the relation (table or alias) producing it.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Display)]
#[display(fmt = "{}.{}", relation, name)]
pub struct Column {
    relation: String,
    name: String,
}

impl Column {
    pub fn new<R: Into<String>, N: Into<String>>(relation: R, name: N) -> Self {
        Self {
            relation: relation.into(),
            name: name.into(),
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Display)]
pub enum ScalarValue {
    Boolean(bool),
    Int64(i64),
    #[display(fmt = "'{}'", _0)]
    Utf8(String),
}

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, StrumDisplay, AsRefStr)]
pub enum BinaryOp {
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<>")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    LtEq,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    GtEq,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "AND")]
    And,
    #[strum(serialize = "OR")]
    Or,
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Expr {
    Column(Column),
    Literal(ScalarValue),
    BinaryExpr {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull(Box<Expr>),
}

pub fn col<R: Into<String>, N: Into<String>>(relation: R, name: N) -> Expr {
    Expr::Column(Column::new(relation, name))
}

pub fn lit(value: ScalarValue) -> Expr {
    Expr::Literal(value)
}

pub fn binary_expr(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::BinaryExpr {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl Expr {
    pub fn eq(self, other: Expr) -> Expr {
        binary_expr(self, BinaryOp::Eq, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        binary_expr(self, BinaryOp::Lt, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        binary_expr(self, BinaryOp::Gt, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        binary_expr(self, BinaryOp::And, other)
    }

    /// Columns referenced anywhere in this expression.
    pub fn columns(&self) -> HashSet<Column> {
        let mut columns = HashSet::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns(&self, columns: &mut HashSet<Column>) {
        match self {
            Expr::Column(c) => {
                columns.insert(c.clone());
            }
            Expr::Literal(_) => {}
            Expr::BinaryExpr { left, right, .. } => {
                left.collect_columns(columns);
                right.collect_columns(columns);
            }
            Expr::Not(e) | Expr::IsNull(e) => e.collect_columns(columns),
        }
    }

    /// Returns the edge if this expression has the exact form `column = column`.
    pub fn as_column_equality(&self) -> Option<EqualityEdge> {
        match self {
            Expr::BinaryExpr {
                left,
                op: BinaryOp::Eq,
                right,
            } => match (left.as_ref(), right.as_ref()) {
                (Expr::Column(l), Expr::Column(r)) if l != r => {
                    Some(EqualityEdge::new(l.clone(), r.clone()))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Splits a conjunction into its conjuncts.
    pub fn split_conjunction(self) -> Vec<Expr> {
        match self {
            Expr::BinaryExpr {
                left,
                op: BinaryOp::And,
                right,
            } => {
                let mut conjuncts = left.split_conjunction();
                conjuncts.extend(right.split_conjunction());
                conjuncts
            }
            e => vec![e],
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::BinaryExpr { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Not(e) => write!(f, "NOT {}", e),
            Expr::IsNull(e) => write!(f, "{} IS NULL", e),
        }
    }
}

/// Equality predicate between two columns, used as an edge of the join graph.
///
/// The orientation is the one of the predicate it was built from; connectivity checks
/// consider both orientations.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Display)]
#[display(fmt = "{} = {}", left, right)]
pub struct EqualityEdge {
    left: Column,
    right: Column,
}

impl EqualityEdge {
    pub fn new(left: Column, right: Column) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &Column {
        &self.left
    }

    pub fn right(&self) -> &Column {
        &self.right
    }

    pub fn swapped(&self) -> Self {
        Self {
            left: self.right.clone(),
            right: self.left.clone(),
        }
    }

    pub fn to_expr(&self) -> Expr {
        Expr::Column(self.left.clone()).eq(Expr::Column(self.right.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_of_nested_expression() {
        let expr = col("a", "x")
            .lt(col("b", "y"))
            .and(Expr::Not(Box::new(Expr::IsNull(Box::new(col("c", "z"))))));

        let columns = expr.columns();
        assert_eq!(3, columns.len());
        assert!(columns.contains(&Column::new("a", "x")));
        assert!(columns.contains(&Column::new("c", "z")));
    }

    #[test]
    fn test_column_equality() {
        let edge = col("a", "x").eq(col("b", "y")).as_column_equality().unwrap();
        assert_eq!(&Column::new("a", "x"), edge.left());
        assert_eq!(&Column::new("b", "y"), edge.swapped().left());

        assert!(col("a", "x")
            .eq(lit(ScalarValue::Int64(1)))
            .as_column_equality()
            .is_none());
        assert!(col("a", "x").lt(col("b", "y")).as_column_equality().is_none());
        assert!(col("a", "x").eq(col("a", "x")).as_column_equality().is_none());
    }

    #[test]
    fn test_split_conjunction() {
        let expr = col("a", "x")
            .eq(col("b", "y"))
            .and(col("b", "y").gt(lit(ScalarValue::Int64(3))))
            .and(col("c", "z").eq(col("a", "x")));

        let conjuncts = expr.split_conjunction();
        assert_eq!(3, conjuncts.len());
        assert_eq!("(b.y > 3)", conjuncts[1].to_string());
    }
}
