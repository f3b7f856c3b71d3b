use crate::error::OptResult;
use crate::expr::Column;
use crate::operator::LogicalOperatorTrait;
use crate::properties::{LogicalProperty, Schema};

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct TableScan {
    limit: Option<usize>,
    table_name: String,
    columns: Vec<Column>,
}

impl TableScan {
    /// Scans `column_names` of `table_name`, with columns qualified by the table name.
    pub fn new<S, C, I>(table_name: S, column_names: I) -> Self
    where
        S: Into<String>,
        C: Into<String>,
        I: IntoIterator<Item = C>,
    {
        let table_name = table_name.into();
        let columns = column_names
            .into_iter()
            .map(|c| Column::new(table_name.clone(), c))
            .collect();
        Self {
            limit: None,
            table_name,
            columns,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl LogicalOperatorTrait for TableScan {
    fn derive_logical_prop(&self, _inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty> {
        Ok(LogicalProperty::new(Schema::new(self.columns.clone())))
    }
}
