use std::sync::Arc;

use crate::error::ScopeError;
use crate::tensor::GraphValue;

use super::Graph;

/// Finds the graph that produced `values`.
///
/// Values without a graph (eager tensors) are skipped. Returns `Ok(None)` when no value belongs
/// to a graph, and [`ScopeError::InconsistentGraph`] when they belong to more than one.
pub fn resolve_graph_from_values(
    values: &[&dyn GraphValue],
) -> Result<Option<Arc<Graph>>, ScopeError> {
    let mut resolved: Option<Arc<Graph>> = None;
    for graph in values.iter().filter_map(|value| value.graph()) {
        if let Some(existing) = &resolved {
            if !Arc::ptr_eq(existing, &graph) {
                return Err(ScopeError::InconsistentGraph {
                    expected: existing.id(),
                    found: graph.id(),
                });
            }
            continue;
        }
        resolved = Some(graph);
    }
    Ok(resolved)
}
