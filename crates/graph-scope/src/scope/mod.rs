//! Name scopes: composition, entry, and guaranteed restore.
//!
//! Entering a scope computes the child of the current scope, commits it on the owner selected
//! by the execution mode, and returns a [`NameScope`] guard holding both the new and the previous
//! scope. Dropping the guard (or calling [`NameScope::exit`]) puts the previous scope back.
//!
//! | mode  | owner                                  | uniqueness            |
//! |-------|----------------------------------------|-----------------------|
//! | eager | [`ExecutionContext`](crate::ExecutionContext) | none              |
//! | graph | [`Graph`](crate::Graph) from values or default | `_N` suffix on collision |
mod handle;
mod name;
mod router;

pub use handle::{NameScope, ScopeRequest, ScopeState};
pub use name::{compute_child_name, ScopeName, SEPARATOR};
pub use router::{enter_scope, exit_scope, name_scope, with_name_scope};
