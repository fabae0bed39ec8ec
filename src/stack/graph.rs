//! Dependency resolution.
//!
//! Dependency edges are explicit in the data model rather than implied by
//! declaration order: functions depend on their layers, and a bucket's
//! notification configuration depends on the bucket plus every function it
//! invokes. Grants travel with their function's execution identity, so
//! permissions exist before a function can be triggered.

use std::collections::BTreeSet;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use crate::errors::StackError;
use crate::stack::builder::StackBuilder;

/// One materialization step; indices refer into the stack's resource
/// tables. `Notifications` covers every subscription on one bucket, since
/// a bucket's notification configuration is written as a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    Layer(usize),
    Bucket(usize),
    Function(usize),
    Notifications(usize),
}

pub(super) fn deployment_plan(builder: &StackBuilder) -> Result<Vec<DeployStep>, StackError> {
    let mut graph: DiGraph<DeployStep, ()> = DiGraph::new();

    let layer_nodes: Vec<_> = (0..builder.layers.len())
        .map(|i| graph.add_node(DeployStep::Layer(i)))
        .collect();
    let bucket_nodes: Vec<_> = (0..builder.buckets.len())
        .map(|i| graph.add_node(DeployStep::Bucket(i)))
        .collect();
    let function_nodes: Vec<_> = (0..builder.functions.len())
        .map(|i| graph.add_node(DeployStep::Function(i)))
        .collect();

    // Edges point dependency-first: a layer precedes each function using it.
    for (function_index, function) in builder.functions.iter().enumerate() {
        for &layer_index in &function.layers {
            graph.add_edge(layer_nodes[layer_index], function_nodes[function_index], ());
        }
    }

    let subscribed_buckets: BTreeSet<usize> =
        builder.subscriptions.iter().map(|s| s.bucket).collect();
    for bucket_index in subscribed_buckets {
        let node = graph.add_node(DeployStep::Notifications(bucket_index));
        graph.add_edge(bucket_nodes[bucket_index], node, ());
        for subscription in &builder.subscriptions {
            if subscription.bucket == bucket_index {
                graph.add_edge(function_nodes[subscription.function], node, ());
            }
        }
    }

    // Node insertion order is fixed, so the resolved order is
    // deterministic across runs of the same declarations.
    let order = toposort(&graph, None)
        .map_err(|_| StackError::Validation("resource dependency cycle".to_string()))?;

    Ok(order.into_iter().map(|node| graph[node]).collect())
}
