//! Execution context: the execution mode, the eager scope, and the default-graph stack.
//!
//! An [`ExecutionContext`] is passed explicitly to every scope operation. It uses `Cell` and
//! `RefCell` internally, so it is `!Sync` and each thread builds with its own context; eager
//! scopes therefore never leak between threads.
//!
//! ## Default graphs
//!
//! Graph-mode scopes without graph-bound values are entered on the context's default graph:
//! 1. the most recently pushed graph (via [`ExecutionContext::push_graph`]);
//! 2. otherwise a global graph created lazily for this context.
//!
//! ```rust,ignore
//! let ctx = ExecutionContext::new();
//! ctx.with_graph(Graph::new(), || {
//!     // Graph mode; scopes land on the pushed graph.
//!     let scope = name_scope(&ctx, Some("block"), "", &[])?;
//!     Ok(())
//! })
//! ```
//!
//! For code that cannot thread a context through, [`with_thread_context`] exposes one per thread.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use crate::config::{ContextConfig, ExecutionMode};
use crate::error::ScopeError;
use crate::graph::Graph;
use crate::scope::{compute_child_name, ScopeName};

thread_local! {
    static THREAD_CONTEXT: ExecutionContext =
        ExecutionContext::with_config(ContextConfig::from_env());
}

/// Runs `f` with this thread's ambient context, created from the environment on first use.
pub fn with_thread_context<F, R>(f: F) -> R
where
    F: FnOnce(&ExecutionContext) -> R,
{
    THREAD_CONTEXT.with(f)
}

#[derive(Debug)]
pub struct ExecutionContext {
    mode: Cell<ExecutionMode>,
    scope_name: RefCell<ScopeName>,
    graph_stack: RefCell<Vec<Arc<Graph>>>,
    global_graph: RefCell<Option<Arc<Graph>>>,
}

impl ExecutionContext {
    /// Creates an eager context at the root scope.
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    pub fn with_config(config: ContextConfig) -> Self {
        ExecutionContext {
            mode: Cell::new(config.mode),
            scope_name: RefCell::new(ScopeName::root()),
            graph_stack: RefCell::new(Vec::new()),
            global_graph: RefCell::new(None),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode.get()
    }

    pub fn executing_eagerly(&self) -> bool {
        self.mode.get().is_eager()
    }

    pub fn set_mode(&self, mode: ExecutionMode) {
        self.mode.set(mode);
    }

    /// Switches to `mode` until the returned guard is dropped.
    pub fn enter_mode(&self, mode: ExecutionMode) -> ModeGuard<'_> {
        let previous = self.mode.replace(mode);
        ModeGuard {
            ctx: self,
            previous,
            active: true,
        }
    }

    /// Runs `f` with the context switched to `mode`.
    pub fn with_mode<F, R>(&self, mode: ExecutionMode, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let guard = self.enter_mode(mode);
        let result = f();
        drop(guard);
        result
    }

    /// Current eager scope. Graph-mode scopes live on the graph instead.
    pub fn scope_name(&self) -> ScopeName {
        self.scope_name.borrow().clone()
    }

    /// Qualifies an eager operation name with the current eager scope. No dedup is applied.
    pub fn op_name(&self, name: &str) -> String {
        self.scope_name.borrow().join_op(name)
    }

    /// Commits the child scope of the current eager scope and returns `(new, previous)`.
    pub(crate) fn enter_eager_scope(
        &self,
        requested: Option<&str>,
        default_name: &str,
    ) -> (ScopeName, ScopeName) {
        let mut current = self.scope_name.borrow_mut();
        let scope = compute_child_name(&current, requested, default_name);
        let previous = std::mem::replace(&mut *current, scope.clone());
        (scope, previous)
    }

    pub(crate) fn restore_scope_name(&self, scope: ScopeName) {
        *self.scope_name.borrow_mut() = scope;
    }

    /// Installs `graph` as the default graph and switches to graph mode until the guard drops.
    pub fn push_graph(&self, graph: Arc<Graph>) -> DefaultGraphGuard<'_> {
        self.graph_stack.borrow_mut().push(graph);
        let previous_mode = self.mode.replace(ExecutionMode::Graph);
        DefaultGraphGuard {
            ctx: self,
            previous_mode,
            active: true,
        }
    }

    /// Runs `f` with `graph` installed as the default graph.
    pub fn with_graph<F, R>(&self, graph: Arc<Graph>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let guard = self.push_graph(graph);
        let result = f();
        drop(guard);
        result
    }

    /// Graph that receives graph-mode scopes when no value names a graph.
    pub fn default_graph(&self) -> Arc<Graph> {
        if let Some(graph) = self.graph_stack.borrow().last() {
            return Arc::clone(graph);
        }
        let mut global = self.global_graph.borrow_mut();
        Arc::clone(global.get_or_insert_with(Graph::new))
    }

    /// Number of graphs currently pushed with [`ExecutionContext::push_graph`].
    pub fn graph_depth(&self) -> usize {
        self.graph_stack.borrow().len()
    }

    /// Discards the global graph so the next [`ExecutionContext::default_graph`] creates a
    /// fresh one. Fails while any graph is pushed.
    pub fn reset_default_graph(&self) -> Result<(), ScopeError> {
        let depth = self.graph_depth();
        if depth > 0 {
            return Err(ScopeError::NestedDefaultGraph { depth });
        }
        self.global_graph.replace(None);
        Ok(())
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that restores the previous execution mode when dropped.
///
/// Created by [`ExecutionContext::enter_mode`] and [`ExecutionContext::with_mode`].
pub struct ModeGuard<'ctx> {
    ctx: &'ctx ExecutionContext,
    previous: ExecutionMode,
    active: bool,
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.ctx.mode.set(self.previous);
            self.active = false;
        }
    }
}

/// RAII guard that pops the default graph and restores the previous mode when dropped.
///
/// Created by [`ExecutionContext::push_graph`] and [`ExecutionContext::with_graph`]. Ensures the
/// stack unwinds even if the guarded scope panics.
pub struct DefaultGraphGuard<'ctx> {
    ctx: &'ctx ExecutionContext,
    previous_mode: ExecutionMode,
    active: bool,
}

impl Drop for DefaultGraphGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.ctx.graph_stack.borrow_mut().pop();
            self.ctx.mode.set(self.previous_mode);
            self.active = false;
        }
    }
}
