use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use graph_scope::{
    enter_scope, exit_scope, name_scope, with_name_scope, with_thread_context, ContextConfig,
    EagerTensor, ExecutionContext, ExecutionMode, Graph, ScopeError, ScopeName, ScopeRequest,
    ScopeState,
};

fn graph_context() -> (ExecutionContext, Arc<Graph>) {
    let config = ContextConfig::default().with_mode(ExecutionMode::Graph);
    let ctx = ExecutionContext::with_config(config);
    let graph = ctx.default_graph();
    (ctx, graph)
}

#[test]
fn graph_scope_at_root() -> Result<()> {
    let (ctx, graph) = graph_context();
    let scope = name_scope(&ctx, Some("conv1"), "", &[])?;
    assert_eq!(scope.current_name(), "conv1/");
    assert!(scope.previous_name().is_root());
    assert_eq!(scope.mode(), ExecutionMode::Graph);
    assert!(Arc::ptr_eq(scope.graph().expect("graph scope"), &graph));
    assert_eq!(graph.current_scope(), "conv1/");
    Ok(())
}

#[test]
fn graph_scopes_nest() -> Result<()> {
    let (ctx, graph) = graph_context();
    let outer = name_scope(&ctx, Some("conv1"), "", &[])?;
    let inner = name_scope(&ctx, Some("relu"), "", &[])?;
    assert_eq!(inner.current_name(), "conv1/relu/");
    assert_eq!(inner.previous_name(), outer.current_name());
    assert_eq!(graph.create_op("Relu", None).name(), "conv1/relu/Relu");
    Ok(())
}

#[test]
fn trailing_separator_escapes_nesting() -> Result<()> {
    let (ctx, _graph) = graph_context();
    let _outer = name_scope(&ctx, Some("conv1"), "", &[])?;
    let absolute = name_scope(&ctx, Some("scope2/"), "", &[])?;
    assert_eq!(absolute.current_name(), "scope2/");
    assert_eq!(absolute.previous_name(), "conv1/");
    Ok(())
}

#[test]
fn default_name_fills_in_for_missing_name() -> Result<()> {
    let (ctx, _graph) = graph_context();
    let scope = name_scope(&ctx, None, "add", &[])?;
    assert_eq!(scope.current_name(), "add/");
    Ok(())
}

#[test]
fn eager_and_graph_scopes_are_isolated() -> Result<()> {
    let ctx = ExecutionContext::new();
    let graph = Graph::new();

    let eager = name_scope(&ctx, Some("block"), "", &[])?;
    assert_eq!(eager.current_name(), "block/");
    assert!(graph.current_scope().is_root());

    let _default = ctx.push_graph(Arc::clone(&graph));
    let staged = name_scope(&ctx, Some("block"), "", &[])?;
    assert_eq!(staged.current_name(), "block/");
    assert_eq!(ctx.scope_name(), "block/");
    assert_eq!(graph.current_scope(), "block/");

    drop(staged);
    assert!(graph.current_scope().is_root());
    assert_eq!(ctx.scope_name(), "block/");
    Ok(())
}

#[test]
fn eager_scopes_repeat_without_dedup() -> Result<()> {
    let ctx = ExecutionContext::new();
    let first = name_scope(&ctx, Some("dense"), "", &[])?.current_name().clone();
    let second = name_scope(&ctx, Some("dense"), "", &[])?.current_name().clone();
    assert_eq!(first, second);
    assert_eq!(first, "dense/");
    Ok(())
}

#[test]
fn graph_scopes_dedup_siblings() -> Result<()> {
    let (ctx, _graph) = graph_context();
    let first = name_scope(&ctx, Some("dense"), "", &[])?.current_name().clone();
    let second = name_scope(&ctx, Some("dense"), "", &[])?.current_name().clone();
    assert_eq!(first, "dense/");
    assert_eq!(second, "dense_1/");
    Ok(())
}

#[test]
fn nested_scopes_restore_in_order() -> Result<()> {
    for mode in [ExecutionMode::Eager, ExecutionMode::Graph] {
        let ctx = ExecutionContext::with_config(ContextConfig::default().with_mode(mode));
        let current = || {
            if ctx.executing_eagerly() {
                ctx.scope_name()
            } else {
                ctx.default_graph().current_scope()
            }
        };

        let before = current();
        let mut a = name_scope(&ctx, Some("a"), "", &[])?;
        let after_a = current();
        let mut b = name_scope(&ctx, Some("b"), "", &[])?;
        assert_eq!(current(), "a/b/");

        exit_scope(&mut b);
        assert_eq!(current(), after_a);
        assert_eq!(after_a, *a.current_name());

        exit_scope(&mut a);
        assert_eq!(current(), before);
    }
    Ok(())
}

#[test]
fn exit_twice_is_the_same_as_once() -> Result<()> {
    let ctx = ExecutionContext::new();
    let _outer = name_scope(&ctx, Some("outer"), "", &[])?;
    let mut inner = name_scope(&ctx, Some("inner"), "", &[])?;
    let mut sibling_entered_later = None;

    exit_scope(&mut inner);
    assert_eq!(inner.state(), ScopeState::Exited);
    assert_eq!(ctx.scope_name(), "outer/");

    sibling_entered_later.replace(name_scope(&ctx, Some("sibling"), "", &[])?);
    exit_scope(&mut inner);
    drop(inner);
    assert_eq!(ctx.scope_name(), "outer/sibling/");

    drop(sibling_entered_later);
    assert_eq!(ctx.scope_name(), "outer/");
    Ok(())
}

#[test]
fn panicking_body_still_restores_scope() {
    let ctx = ExecutionContext::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _scope = name_scope(&ctx, Some("doomed"), "", &[]).expect("enter scope");
        assert_eq!(ctx.scope_name(), "doomed/");
        panic!("scope body failed");
    }));
    assert!(outcome.is_err());
    assert!(ctx.scope_name().is_root());
}

#[test]
fn failing_body_exits_through_with_name_scope() {
    let ctx = ExecutionContext::new();
    let result: Result<()> = with_name_scope(&ctx, ScopeRequest::new("layer"), |scope| {
        assert_eq!(scope.current_name(), "layer/");
        assert_eq!(ctx.op_name("matmul"), "layer/matmul");
        Err(anyhow!("body failed"))
    });
    assert!(result.is_err());
    assert!(ctx.scope_name().is_root());
}

#[test]
fn values_pick_the_owning_graph() -> Result<()> {
    let (ctx, default_graph) = graph_context();
    let other = Graph::new();
    let input = other.create_op("Placeholder", Some("x"));
    let host = EagerTensor::new("host");

    let scope = name_scope(&ctx, None, "loss", &[&host, &input])?;
    assert_eq!(scope.current_name(), "loss/");
    assert!(Arc::ptr_eq(scope.graph().expect("graph scope"), &other));
    assert_eq!(other.current_scope(), "loss/");
    assert!(default_graph.current_scope().is_root());

    drop(scope);
    assert!(other.current_scope().is_root());
    Ok(())
}

#[test]
fn values_from_two_graphs_commit_nothing() {
    let (ctx, default_graph) = graph_context();
    let first = Graph::new();
    let second = Graph::new();
    let a = first.create_op("Const", Some("a"));
    let b = second.create_op("Const", Some("b"));

    let err = name_scope(&ctx, Some("mixed"), "", &[&a, &b]).expect_err("mixed graphs");
    assert_eq!(
        err,
        ScopeError::InconsistentGraph {
            expected: first.id(),
            found: second.id(),
        }
    );
    assert!(first.current_scope().is_root());
    assert!(second.current_scope().is_root());
    assert!(default_graph.current_scope().is_root());
    assert!(ctx.scope_name().is_root());
}

#[test]
fn values_are_ignored_in_eager_mode() -> Result<()> {
    let ctx = ExecutionContext::new();
    let first = Graph::new();
    let second = Graph::new();
    let a = first.create_op("Const", None);
    let b = second.create_op("Const", None);

    let scope = name_scope(&ctx, Some("eager"), "", &[&a, &b])?;
    assert_eq!(scope.mode(), ExecutionMode::Eager);
    assert!(scope.graph().is_none());
    assert!(first.current_scope().is_root());
    Ok(())
}

#[test]
fn mode_is_read_on_every_entry() -> Result<()> {
    let ctx = ExecutionContext::new();
    let graph = Graph::new();
    let outer = name_scope(&ctx, Some("outer"), "", &[])?;
    assert_eq!(outer.mode(), ExecutionMode::Eager);

    let inner = ctx.with_graph(Arc::clone(&graph), || name_scope(&ctx, Some("inner"), "", &[]))?;
    assert_eq!(inner.mode(), ExecutionMode::Graph);
    assert_eq!(inner.current_name(), "inner/");
    assert_eq!(graph.current_scope(), "inner/");
    assert!(ctx.executing_eagerly());

    // Exit goes to the graph the scope was entered on, not to the current mode's owner.
    drop(inner);
    assert!(graph.current_scope().is_root());
    assert_eq!(ctx.scope_name(), "outer/");
    Ok(())
}

#[test]
fn graph_scopes_are_tracked_per_thread() -> Result<()> {
    let (ctx, graph) = graph_context();
    let _main = name_scope(&ctx, Some("main"), "", &[])?;

    let worker_graph = Arc::clone(&graph);
    let worker_scope = thread::spawn(move || -> Result<ScopeName, ScopeError> {
        let ctx = ExecutionContext::new();
        let _default = ctx.push_graph(worker_graph);
        let scope = name_scope(&ctx, Some("worker"), "", &[])?;
        Ok(scope.current_name().clone())
    })
    .join()
    .map_err(|_| anyhow!("worker thread panicked"))??;

    assert_eq!(worker_scope, "worker/");
    assert_eq!(graph.current_scope(), "main/");
    assert_eq!(graph.name_scope("worker"), "main/worker/");
    Ok(())
}

#[test]
fn sibling_names_stay_unique_across_threads() -> Result<()> {
    let graph = Graph::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let graph = Arc::clone(&graph);
            thread::spawn(move || -> Result<ScopeName, ScopeError> {
                let ctx = ExecutionContext::new();
                let _default = ctx.push_graph(graph);
                let scope = name_scope(&ctx, Some("shard"), "", &[])?;
                Ok(scope.current_name().clone())
            })
        })
        .collect();

    let mut scopes = Vec::new();
    for handle in handles {
        scopes.push(handle.join().map_err(|_| anyhow!("worker panicked"))??);
    }
    scopes.sort();
    assert_eq!(scopes, ["shard/", "shard_1/", "shard_2/", "shard_3/"]);
    Ok(())
}

#[test]
fn scope_request_enters_directly() -> Result<()> {
    let ctx = ExecutionContext::new();
    let request = ScopeRequest::default().default_name("block");
    assert_eq!(request.effective_name(), "block");
    let scope = request.enter(&ctx)?;
    assert_eq!(scope.to_string(), "block/");
    assert_eq!(scope.as_ref(), "block/");

    let mut scope = enter_scope(&ctx, ScopeRequest::from("attn"))?;
    assert_eq!(scope.current_name(), "block/attn/");
    scope.exit();
    assert_eq!(ctx.scope_name(), "block/");
    Ok(())
}

#[test]
fn thread_context_supports_scopes() -> Result<()> {
    with_thread_context(|ctx| -> Result<()> {
        let _mode = ctx.enter_mode(ExecutionMode::Eager);
        let before = ctx.scope_name();
        {
            let scope = name_scope(ctx, Some("ambient"), "", &[])?;
            assert_eq!(scope.current_name().as_str(), before.join_op("ambient/"));
        }
        assert_eq!(ctx.scope_name(), before);
        Ok(())
    })
}
