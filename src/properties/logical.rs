use std::rc::Rc;

use crate::properties::Schema;

#[derive(Clone, PartialEq, Debug)]
pub struct LogicalProperty {
    schema: Rc<Schema>,
}

impl LogicalProperty {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Rc::new(schema),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
