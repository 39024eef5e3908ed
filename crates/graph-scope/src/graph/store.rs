use std::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::thread;

use crate::scope::{compute_child_name, ScopeName, SEPARATOR};
use crate::tensor::SymbolicTensor;

use super::state::{GraphNames, OperationRecord};

static GRAPH_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Process-unique identifier of a [`Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(usize);

impl GraphId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph#{}", self.0)
    }
}

/// Deferred-execution graph as seen by the naming layer.
///
/// All naming state sits behind one mutex, so entering or leaving a scope and reserving a name
/// are each a single critical section.
pub struct Graph {
    names: Mutex<GraphNames>,
    id: GraphId,
}

impl Graph {
    pub fn new() -> Arc<Self> {
        let id = GraphId(GRAPH_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed));
        Arc::new(Graph {
            names: Mutex::new(GraphNames::new()),
            id,
        })
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    // Every mutation is a single assignment or insert, so a poisoned table is still consistent.
    fn names(&self) -> MutexGuard<'_, GraphNames> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current scope of the calling thread in this graph.
    pub fn current_scope(&self) -> ScopeName {
        self.names().current_scope(thread::current().id())
    }

    /// Enters `name` as the calling thread's scope and returns the new scope.
    ///
    /// - an empty name returns to the root scope;
    /// - a name ending in `/` is used verbatim as a fully qualified scope;
    /// - anything else becomes a child of the current scope, suffixed `_N` when a sibling
    ///   scope or operation already uses that name.
    pub fn name_scope(&self, name: &str) -> ScopeName {
        self.enter_scope(name).0
    }

    /// Same as [`Graph::name_scope`] but also hands back the scope it replaced.
    pub(crate) fn enter_scope(&self, name: &str) -> (ScopeName, ScopeName) {
        let thread = thread::current().id();
        let mut names = self.names();
        let previous = names.current_scope(thread);
        let scope = if name.is_empty() {
            ScopeName::root()
        } else if name.ends_with(SEPARATOR) {
            compute_child_name(&previous, Some(name), "")
        } else {
            let candidate = compute_child_name(&previous, Some(name), "");
            let unique = names.uniquify(candidate.without_trailing_separator().to_owned(), true);
            ScopeName::from_path(unique)
        };
        names.set_scope(thread, scope.clone());
        (scope, previous)
    }

    /// Puts the calling thread back into `scope`.
    pub(crate) fn restore_scope(&self, scope: &ScopeName) {
        let thread = thread::current().id();
        self.names().set_scope(thread, scope.clone());
    }

    /// Qualifies `name` with the calling thread's scope and makes it unique in this graph.
    pub fn unique_name(&self, name: &str, mark_as_used: bool) -> String {
        let thread = thread::current().id();
        self.names().unique_name(thread, name, mark_as_used)
    }

    /// Records an operation in the current scope. `name` defaults to `op_type`.
    pub fn create_op(self: &Arc<Self>, op_type: &str, name: Option<&str>) -> SymbolicTensor {
        let requested = name.filter(|name| !name.is_empty()).unwrap_or(op_type);
        let qualified = {
            let thread = thread::current().id();
            let mut names = self.names();
            let qualified = names.unique_name(thread, requested, true);
            names.operations.push(OperationRecord {
                name: qualified.clone(),
                op_type: op_type.to_owned(),
            });
            qualified
        };
        SymbolicTensor::new(Arc::clone(self), qualified, op_type)
    }

    /// Names of the recorded operations, in creation order.
    pub fn operation_names(&self) -> Vec<String> {
        self.names()
            .operations
            .iter()
            .map(|record| record.name.clone())
            .collect()
    }

    /// Names of the recorded operations of one type, in creation order.
    pub fn operations_of_type(&self, op_type: &str) -> Vec<String> {
        self.names()
            .operations
            .iter()
            .filter(|record| record.op_type == op_type)
            .map(|record| record.name.clone())
            .collect()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
