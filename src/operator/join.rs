use strum_macros::{AsRefStr, Display};

use crate::error::OptResult;
use crate::expr::{EqualityEdge, Expr};
use crate::operator::LogicalOperatorTrait;
use crate::properties::{LogicalProperty, Schema};

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Display, AsRefStr)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

/// Logical join operator.
///
/// An inner join without any condition is a cartesian join.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Join {
    join_type: JoinType,
    eq_conditions: Vec<EqualityEdge>,
    other_conditions: Vec<Expr>,
}

impl Join {
    pub fn new(
        join_type: JoinType,
        eq_conditions: Vec<EqualityEdge>,
        other_conditions: Vec<Expr>,
    ) -> Self {
        Self {
            join_type,
            eq_conditions,
            other_conditions,
        }
    }

    /// Inner join on `conditions`; `col = col` conjuncts become equality conditions.
    pub fn inner(conditions: Vec<Expr>) -> Self {
        let mut eq_conditions = Vec::new();
        let mut other_conditions = Vec::new();
        for cond in conditions {
            match cond.as_column_equality() {
                Some(edge) => eq_conditions.push(edge),
                None => other_conditions.push(cond),
            }
        }
        Self::new(JoinType::Inner, eq_conditions, other_conditions)
    }

    pub fn cartesian() -> Self {
        Self::new(JoinType::Inner, vec![], vec![])
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn eq_conditions(&self) -> &[EqualityEdge] {
        &self.eq_conditions
    }

    pub fn other_conditions(&self) -> &[Expr] {
        &self.other_conditions
    }

    pub fn is_cartesian(&self) -> bool {
        self.join_type == JoinType::Inner
            && self.eq_conditions.is_empty()
            && self.other_conditions.is_empty()
    }
}

impl LogicalOperatorTrait for Join {
    fn derive_logical_prop(&self, inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty> {
        Ok(LogicalProperty::new(Schema::merge(
            inputs[0].schema(),
            inputs[1].schema(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit, ScalarValue};

    #[test]
    fn test_inner_join_splits_conditions() {
        let join = Join::inner(vec![
            col("a", "x").eq(col("b", "y")),
            col("a", "x").eq(lit(ScalarValue::Int64(3))),
            col("a", "z").lt(col("b", "w")),
        ]);

        assert_eq!(JoinType::Inner, join.join_type());
        assert_eq!(1, join.eq_conditions().len());
        assert_eq!(2, join.other_conditions().len());
        assert!(!join.is_cartesian());
        assert!(Join::cartesian().is_cartesian());
    }
}
