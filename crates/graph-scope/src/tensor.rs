//! Tensor-like values that name scopes can inspect to find their owning graph.

use std::fmt;
use std::sync::Arc;

use crate::graph::{Graph, GraphId};

/// A value that may have been recorded into a [`Graph`].
pub trait GraphValue {
    /// The graph that produced this value, if any.
    fn graph(&self) -> Option<Arc<Graph>>;
}

/// Output of an operation recorded in a graph.
#[derive(Clone)]
pub struct SymbolicTensor {
    graph: Arc<Graph>,
    name: String,
    op_type: String,
}

impl SymbolicTensor {
    pub(crate) fn new(graph: Arc<Graph>, name: String, op_type: &str) -> Self {
        SymbolicTensor {
            graph,
            name,
            op_type: op_type.to_owned(),
        }
    }

    /// Fully qualified, graph-unique operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    pub fn graph_id(&self) -> GraphId {
        self.graph.id()
    }
}

impl GraphValue for SymbolicTensor {
    fn graph(&self) -> Option<Arc<Graph>> {
        Some(Arc::clone(&self.graph))
    }
}

impl fmt::Debug for SymbolicTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolicTensor")
            .field("name", &self.name)
            .field("op_type", &self.op_type)
            .field("graph", &self.graph.id())
            .finish()
    }
}

/// Value produced by eager execution. It never belongs to a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerTensor {
    name: String,
}

impl EagerTensor {
    pub fn new(name: impl Into<String>) -> Self {
        EagerTensor { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl GraphValue for EagerTensor {
    fn graph(&self) -> Option<Arc<Graph>> {
        None
    }
}
