use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::{OptError, OptResult};
use crate::expr::Column;

/// Ordered set of distinct output columns of an operator.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema, dropping duplicated columns while keeping first occurrences.
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        Self {
            columns: columns.into_iter().unique().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &Column) -> bool {
        self.columns.contains(column)
    }

    /// Tests whether every column in `columns` belongs to this schema.
    pub fn contains_all<'a, I>(&self, columns: I) -> bool
    where
        I: IntoIterator<Item = &'a Column>,
    {
        columns.into_iter().all(|c| self.contains(c))
    }

    pub fn index_of(&self, column: &Column) -> OptResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                OptError::ColumnNotFound {
                    column: column.clone(),
                }
                .into()
            })
    }

    /// Columns of `left` followed by columns of `right`.
    pub fn merge(left: &Schema, right: &Schema) -> Schema {
        Schema::new(left.columns.iter().chain(right.columns.iter()).cloned())
    }

    /// Tests whether both schemas hold the same columns, ignoring order.
    pub fn same_columns(&self, other: &Schema) -> bool {
        self.len() == other.len()
            && self.columns.iter().collect::<HashSet<_>>()
                == other.columns.iter().collect::<HashSet<_>>()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.columns.iter().join(", "))
    }
}
