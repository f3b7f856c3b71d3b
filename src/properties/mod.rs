//! Properties of relation operators.

mod logical;
pub use logical::*;
mod schema;
pub use schema::*;
