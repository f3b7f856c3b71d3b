use crate::error::OptResult;
use crate::expr::Column;
use crate::operator::LogicalOperatorTrait;
use crate::properties::{LogicalProperty, Schema};

/// Column projection, also used to reorder columns.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Projection {
    columns: Vec<Column>,
}

impl Projection {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl LogicalOperatorTrait for Projection {
    fn derive_logical_prop(&self, inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty> {
        let input_schema = inputs[0].schema();
        for column in &self.columns {
            input_schema.index_of(column)?;
        }
        Ok(LogicalProperty::new(Schema::new(self.columns.clone())))
    }
}
