//! Logical relational operators.

mod filter;
pub use filter::*;
mod join;
pub use join::*;
mod limit;
pub use limit::*;
mod logical;
pub use logical::*;
mod projection;
pub use projection::*;
mod table_scan;
pub use table_scan::*;

use crate::error::OptResult;
use crate::properties::LogicalProperty;

/// Behavior shared by all logical operators.
pub trait LogicalOperatorTrait {
    /// Derives output logical property from inputs' logical properties.
    fn derive_logical_prop(&self, inputs: &[&LogicalProperty]) -> OptResult<LogicalProperty>;
}
