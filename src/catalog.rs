//! Table statistics lookup.

use std::collections::HashMap;

use crate::stat::Statistics;

/// Catalog provides statistics of base tables.
pub trait Catalog {
    fn table_stats(&self, table_name: &str) -> Option<Statistics>;
}

/// In-memory catalog keyed by table name, populated programmatically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    table_stats: HashMap<String, Statistics>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table<S: Into<String>>(&mut self, table_name: S, stats: Statistics) {
        self.table_stats.insert(table_name.into(), stats);
    }
}

impl Catalog for InMemoryCatalog {
    fn table_stats(&self, table_name: &str) -> Option<Statistics> {
        self.table_stats.get(table_name).cloned()
    }
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn table_stats(&self, table_name: &str) -> Option<Statistics> {
        (**self).table_stats(table_name)
    }
}
