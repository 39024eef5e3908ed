//! Hierarchical operation naming for a computation-graph runtime.
//!
//! Name scopes nest operation names (`block/attn/matmul`) while a model is being built. The same
//! API serves both execution modes:
//!
//! - **eager**: the scope lives on the [`ExecutionContext`] and names compose verbatim;
//! - **graph-building**: the scope lives on a [`Graph`], which also keeps sibling names unique.
//!
//! Every call takes the context explicitly, and every entered scope is a [`NameScope`] guard that
//! restores the previous name when it is dropped.
//!
//! ```rust,ignore
//! let ctx = ExecutionContext::new();
//! let _guard = ctx.push_graph(Graph::new());
//! let scope = name_scope(&ctx, Some("conv1"), "", &[])?;
//! assert_eq!(scope.current_name().as_str(), "conv1/");
//! ```

pub mod config;
pub mod context;
mod env;
pub mod error;
pub mod graph;
pub mod scope;
pub mod tensor;

pub use config::{ContextConfig, ExecutionMode};
pub use context::{with_thread_context, DefaultGraphGuard, ExecutionContext, ModeGuard};
pub use error::ScopeError;
pub use graph::{resolve_graph_from_values, Graph, GraphId};
pub use scope::{
    compute_child_name, enter_scope, exit_scope, name_scope, with_name_scope, NameScope,
    ScopeName, ScopeRequest, ScopeState,
};
pub use tensor::{EagerTensor, GraphValue, SymbolicTensor};
