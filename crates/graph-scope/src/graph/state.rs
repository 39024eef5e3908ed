//! Name bookkeeping shared by all threads building into one graph.

use std::collections::HashMap;
use std::thread::ThreadId;

use crate::scope::ScopeName;

/// Mutable naming state protected by the mutex inside [`Graph`](super::store::Graph).
/// Scopes are tracked per thread; the uniqueness table is shared.
pub(super) struct GraphNames {
    pub(super) scopes: HashMap<ThreadId, ScopeName>,
    pub(super) names_in_use: HashMap<String, usize>,
    pub(super) operations: Vec<OperationRecord>,
}

/// Operation recorded through [`Graph::create_op`](super::store::Graph::create_op).
pub(super) struct OperationRecord {
    pub(super) name: String,
    pub(super) op_type: String,
}

impl GraphNames {
    pub(super) fn new() -> Self {
        GraphNames {
            scopes: HashMap::new(),
            names_in_use: HashMap::new(),
            operations: Vec::new(),
        }
    }

    pub(super) fn current_scope(&self, thread: ThreadId) -> ScopeName {
        self.scopes.get(&thread).cloned().unwrap_or_default()
    }

    pub(super) fn set_scope(&mut self, thread: ThreadId, scope: ScopeName) {
        if scope.is_root() {
            self.scopes.remove(&thread);
        } else {
            self.scopes.insert(thread, scope);
        }
    }

    /// Qualifies `name` with the thread's current scope and makes it unique.
    pub(super) fn unique_name(
        &mut self,
        thread: ThreadId,
        name: &str,
        mark_as_used: bool,
    ) -> String {
        let qualified = self.current_scope(thread).join_op(name);
        self.uniquify(qualified, mark_as_used)
    }

    /// Returns `qualified` unchanged on first use, otherwise the first free `qualified_N`.
    ///
    /// Collisions are detected case-insensitively. With `mark_as_used` the returned name is
    /// reserved so later requests skip it.
    pub(super) fn uniquify(&mut self, qualified: String, mark_as_used: bool) -> String {
        let key = qualified.to_lowercase();
        let uses = self.names_in_use.get(&key).copied().unwrap_or(0);
        if mark_as_used {
            self.names_in_use.insert(key.clone(), uses + 1);
        }
        if uses == 0 {
            return qualified;
        }

        let mut suffix = uses;
        let mut candidate = format!("{key}_{suffix}");
        while self.names_in_use.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{key}_{suffix}");
        }
        if mark_as_used {
            self.names_in_use.insert(candidate, 1);
        }
        tracing::trace!(name = %qualified, suffix, "disambiguated graph name");
        format!("{qualified}_{suffix}")
    }
}
