use thiserror::Error;

use crate::graph::GraphId;

/// Errors surfaced while entering a name scope or switching default graphs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Values passed to a scope were recorded into more than one graph.
    #[error("values belong to different graphs: {expected} and {found}")]
    InconsistentGraph { expected: GraphId, found: GraphId },
    /// The default graph was reset while graphs were still pushed on the context.
    #[error("cannot reset the default graph while {depth} graph(s) are pushed as default")]
    NestedDefaultGraph { depth: usize },
}
