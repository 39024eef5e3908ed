//! Graph-building owner of name scopes.
//!
//! A [`Graph`] keeps the current scope of every thread that builds into it, along with a shared
//! table of names already handed out. Scopes entered in graph mode route through
//! [`Graph::name_scope`] so sibling scopes and operations never collide (`conv`, `conv_1`, ...).
mod resolve;
mod state;
mod store;

pub use resolve::resolve_graph_from_values;
pub use store::{Graph, GraphId};
