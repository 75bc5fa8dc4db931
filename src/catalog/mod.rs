//! Catalog subsystem: the items that can be sold and the stores that
//! sell them.
//!
//! # Design Decisions
//! - Items carry an optional `/`-separated category path; the stock tree
//!   endpoint groups items by it
//! - Updates go through query parameters, the shape the existing
//!   frontend already sends

pub mod items;
pub mod stores;
pub mod tree;

pub use tree::TreeNode;
