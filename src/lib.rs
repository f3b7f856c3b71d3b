//! ## Background
//!
//! The query optimizer accepts an unoptimized logical query plan, and outputs an optimized
//! plan. Choosing the order in which relations are joined is one of its most important
//! decisions: the size of intermediate results depends on it, and a bad order easily makes a
//! query orders of magnitude slower.
//!
//! Exhaustive search over join orders, either top-down [2] or bottom-up with dynamic
//! programming [1], finds the cheapest order but its cost grows exponentially with the number
//! of joined relations. This crate implements a greedy heuristic instead, which builds a good,
//! though not necessarily optimal, join tree in polynomial time.
//!
//! ## Design
//!
//! * [`rules::join_reorder`] Join reorder rule and the greedy join order solver.
//! * [`heuristic`] Heuristic optimizer running a batch of rewrite rules until fixed point.
//! * [`operator`] Logical relational operators.
//! * [`properties`] Logical properties, e.g. output schema.
//! * [`stat`] Statistics and their derivation, backed by a [`catalog`].
//! * [`cost`] Cost model used to rank join trees.
//!
//! ### Greedy join reorder
//!
//! A tree of inner joins is flattened into a join group. Starting from the cheapest member,
//! the solver repeatedly joins the current tree with the connected member giving the lowest
//! cumulative cost, until no member left shares an equality condition with the tree. Then it
//! starts a new tree from the cheapest member left. Trees not connected with each other are
//! finally combined with cartesian joins.
//!
//! ## Reference
//!
//! 1. Selinger, P. Griffiths, et al. "Access path selection in a relational database management
//! system." Readings in Artificial Intelligence and Databases. Morgan Kaufmann, 1989. 511-522.
//! 2. Graefe, G., 1995. The cascades framework for query optimization. IEEE Data Eng. Bull., 18(3),
//! pp.19-29.

pub mod catalog;
pub mod cost;
pub mod error;
pub mod expr;
pub mod heuristic;
pub mod operator;
pub mod optimizer;
pub mod plan;
pub mod properties;
pub mod rules;
pub mod stat;
