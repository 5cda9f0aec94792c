//! Abstract syntax tree for SQL query expressions.
//!
//! Every production is a struct carrying a [`NodeInfo`] plus its children.
//! Alternation is a `kind` enum, so exactly one alternative is populated.
//! Children are owned exclusively by their parent.

mod node;
mod query;
mod table;
mod value;

pub use node::{Lengther, Node, NodeInfo, NodeType, Positioner, Typer, Valuer};
pub use query::*;
pub use table::*;
pub use value::*;

pub(crate) use node::impl_node;
