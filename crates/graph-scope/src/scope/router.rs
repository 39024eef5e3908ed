//! Routes scope entry to the eager context or to a graph, based on the execution mode.

use crate::context::ExecutionContext;
use crate::error::ScopeError;
use crate::graph::resolve_graph_from_values;
use crate::tensor::GraphValue;

use super::handle::{NameScope, ScopeOwner, ScopeRequest};

/// Enters a name scope on the stack selected by the context's current mode.
///
/// The mode is read on every call, so nested scopes may be entered in different modes.
/// - eager: the scope is composed on the context's eager scope, without uniqueness checks;
/// - graph: the scope is entered on the graph owning `request`'s values, else on the context's
///   default graph, through [`Graph::name_scope`](crate::Graph::name_scope).
///
/// Fails only when the values belong to different graphs; nothing is committed in that case.
pub fn enter_scope<'ctx>(
    ctx: &'ctx ExecutionContext,
    request: ScopeRequest<'_>,
) -> Result<NameScope<'ctx>, ScopeError> {
    if ctx.executing_eagerly() {
        let (scope, previous) = ctx.enter_eager_scope(request.name(), request.fallback_name());
        tracing::debug!(mode = "eager", scope = %scope, previous = %previous, "entered name scope");
        return Ok(NameScope::entered(ctx, ScopeOwner::Eager, scope, previous));
    }

    let graph = match resolve_graph_from_values(request.graph_values())? {
        Some(graph) => graph,
        None => ctx.default_graph(),
    };
    let (scope, previous) = graph.enter_scope(request.effective_name());
    tracing::debug!(
        mode = "graph",
        graph = %graph.id(),
        scope = %scope,
        previous = %previous,
        "entered name scope"
    );
    Ok(NameScope::entered(
        ctx,
        ScopeOwner::Graph(graph),
        scope,
        previous,
    ))
}

/// Restores the scope that was current before `scope` was entered. Repeated calls are no-ops.
pub fn exit_scope(scope: &mut NameScope<'_>) {
    scope.exit();
}

/// Enters a scope named `name`, falling back to `default_name`, owned per `values` in graph mode.
pub fn name_scope<'ctx>(
    ctx: &'ctx ExecutionContext,
    name: Option<&str>,
    default_name: &str,
    values: &[&dyn GraphValue],
) -> Result<NameScope<'ctx>, ScopeError> {
    let request = ScopeRequest::new(name)
        .default_name(default_name)
        .values(values);
    enter_scope(ctx, request)
}

/// Runs `f` inside a name scope; the scope is exited however `f` returns or unwinds.
pub fn with_name_scope<F, R, E>(
    ctx: &ExecutionContext,
    request: ScopeRequest<'_>,
    f: F,
) -> Result<R, E>
where
    F: FnOnce(&NameScope<'_>) -> Result<R, E>,
    E: From<ScopeError>,
{
    let scope = enter_scope(ctx, request)?;
    let result = f(&scope);
    drop(scope);
    result
}
