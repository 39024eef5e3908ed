use std::fmt;
use std::sync::Arc;

use crate::config::ExecutionMode;
use crate::context::ExecutionContext;
use crate::error::ScopeError;
use crate::graph::Graph;
use crate::tensor::GraphValue;

use super::name::{effective_name, ScopeName};
use super::router;

/// Arguments for entering a name scope. Consumed by [`ScopeRequest::enter`].
#[derive(Clone, Copy, Default)]
pub struct ScopeRequest<'a> {
    name: Option<&'a str>,
    default_name: &'a str,
    values: &'a [&'a dyn GraphValue],
}

impl<'a> ScopeRequest<'a> {
    pub fn new(name: impl Into<Option<&'a str>>) -> Self {
        ScopeRequest {
            name: name.into(),
            ..ScopeRequest::default()
        }
    }

    /// Name used when the requested one is absent or empty.
    pub fn default_name(mut self, default_name: &'a str) -> Self {
        self.default_name = default_name;
        self
    }

    /// Values whose graph should own the scope in graph mode.
    pub fn values(mut self, values: &'a [&'a dyn GraphValue]) -> Self {
        self.values = values;
        self
    }

    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    pub fn fallback_name(&self) -> &'a str {
        self.default_name
    }

    pub fn graph_values(&self) -> &'a [&'a dyn GraphValue] {
        self.values
    }

    /// The requested name, or the default when the request is absent or empty.
    pub fn effective_name(&self) -> &'a str {
        effective_name(self.name, self.default_name)
    }

    pub fn enter<'ctx>(
        self,
        ctx: &'ctx ExecutionContext,
    ) -> Result<NameScope<'ctx>, ScopeError> {
        router::enter_scope(ctx, self)
    }
}

impl<'a> From<&'a str> for ScopeRequest<'a> {
    fn from(name: &'a str) -> Self {
        ScopeRequest::new(name)
    }
}

impl fmt::Debug for ScopeRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRequest")
            .field("name", &self.name)
            .field("default_name", &self.default_name)
            .field("values", &self.values.len())
            .finish()
    }
}

/// Lifecycle of an entered scope. A [`ScopeRequest`] is the not-yet-entered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Entered,
    Exited,
}

/// Stack that holds the scope: the context's eager field or a graph's name stack.
#[derive(Debug)]
pub(crate) enum ScopeOwner {
    Eager,
    Graph(Arc<Graph>),
}

/// An entered name scope.
///
/// Holds the scope to use for naming operations inside it and the scope to restore on exit.
/// The previous scope is restored on the owner that was entered, by [`NameScope::exit`] or on
/// drop, whichever comes first.
#[derive(Debug)]
pub struct NameScope<'ctx> {
    ctx: &'ctx ExecutionContext,
    owner: ScopeOwner,
    scope_name: ScopeName,
    previous: ScopeName,
    state: ScopeState,
}

impl<'ctx> NameScope<'ctx> {
    pub(crate) fn entered(
        ctx: &'ctx ExecutionContext,
        owner: ScopeOwner,
        scope_name: ScopeName,
        previous: ScopeName,
    ) -> Self {
        NameScope {
            ctx,
            owner,
            scope_name,
            previous,
            state: ScopeState::Entered,
        }
    }

    /// Scope to prefix operation names with while this scope is active.
    pub fn current_name(&self) -> &ScopeName {
        &self.scope_name
    }

    pub fn previous_name(&self) -> &ScopeName {
        &self.previous
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// Mode the scope was entered in.
    pub fn mode(&self) -> ExecutionMode {
        match self.owner {
            ScopeOwner::Eager => ExecutionMode::Eager,
            ScopeOwner::Graph(_) => ExecutionMode::Graph,
        }
    }

    /// Graph holding the scope, for graph-mode scopes.
    pub fn graph(&self) -> Option<&Arc<Graph>> {
        match &self.owner {
            ScopeOwner::Eager => None,
            ScopeOwner::Graph(graph) => Some(graph),
        }
    }

    /// Restores the previous scope. Only the first call has an effect.
    pub fn exit(&mut self) {
        if self.state == ScopeState::Exited {
            return;
        }
        match &self.owner {
            ScopeOwner::Eager => self.ctx.restore_scope_name(self.previous.clone()),
            ScopeOwner::Graph(graph) => graph.restore_scope(&self.previous),
        }
        self.state = ScopeState::Exited;
        tracing::debug!(
            mode = %self.mode(),
            scope = %self.scope_name,
            restored = %self.previous,
            "exited name scope"
        );
    }
}

impl Drop for NameScope<'_> {
    fn drop(&mut self) {
        self.exit();
    }
}

impl fmt::Display for NameScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.scope_name, f)
    }
}

impl AsRef<str> for NameScope<'_> {
    fn as_ref(&self) -> &str {
        self.scope_name.as_str()
    }
}
