//! Declaration validation.
//!
//! Runs against the complete builder contents before anything is
//! finalized. Every check here blocks synthesis and materialization
//! entirely; there is no partial acceptance.

use std::collections::HashSet;
use std::time::Duration;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;

use crate::core::names;
use crate::errors::StackError;
use crate::resources::policy::{BEDROCK_INVOKE_MODEL, POLLY_SYNTHESIZE_SPEECH};
use crate::resources::subscription::prefixes_overlap;
use crate::stack::builder::StackBuilder;

const MAX_TIMEOUT: Duration = Duration::from_secs(900);

pub(super) fn validate(builder: &StackBuilder) -> Result<(), StackError> {
    check_names(builder)?;
    check_functions(builder)?;
    check_prefix_filters(builder)?;
    check_storage_grants(builder)?;
    check_trigger_cycles(builder)?;
    Ok(())
}

fn invalid(message: String) -> StackError {
    StackError::Validation(message)
}

fn check_names(builder: &StackBuilder) -> Result<(), StackError> {
    if builder.name.is_empty() {
        return Err(invalid("stack name must not be empty".to_string()));
    }

    let mut function_names = HashSet::new();
    for function in &builder.functions {
        if !names::is_valid_function_name(&function.name) {
            return Err(invalid(format!(
                "function name '{}' is not a valid Lambda function name",
                function.name
            )));
        }
        if !function_names.insert(function.name.as_str()) {
            return Err(invalid(format!(
                "duplicate function name '{}'",
                function.name
            )));
        }
    }

    let mut bucket_names = HashSet::new();
    for bucket in &builder.buckets {
        if !names::is_valid_bucket_name(&bucket.name) {
            return Err(invalid(format!(
                "bucket name '{}' is not a valid S3 bucket name",
                bucket.name
            )));
        }
        if !bucket_names.insert(bucket.name.as_str()) {
            return Err(invalid(format!("duplicate bucket name '{}'", bucket.name)));
        }
    }

    let mut layer_names = HashSet::new();
    for layer in &builder.layers {
        if !names::is_valid_function_name(&layer.name) {
            return Err(invalid(format!(
                "layer name '{}' is not a valid layer name",
                layer.name
            )));
        }
        if !layer_names.insert(layer.name.as_str()) {
            return Err(invalid(format!("duplicate layer name '{}'", layer.name)));
        }
    }

    // Logical IDs are derived from resource names, so a name shared
    // across kinds would merge two resources in the template.
    let mut logical_ids = HashSet::new();
    let all_names = builder
        .layers
        .iter()
        .map(|l| l.name.as_str())
        .chain(builder.buckets.iter().map(|b| b.name.as_str()))
        .chain(builder.functions.iter().map(|f| f.name.as_str()));
    for name in all_names {
        if !logical_ids.insert(names::logical_id(&builder.name, name)) {
            return Err(invalid(format!(
                "resource name '{name}' produces a logical id already in use"
            )));
        }
    }

    Ok(())
}

fn check_functions(builder: &StackBuilder) -> Result<(), StackError> {
    for function in &builder.functions {
        if function.entry.is_empty() {
            return Err(invalid(format!(
                "function '{}' has no entry point",
                function.name
            )));
        }
        if function.handler.is_empty() {
            return Err(invalid(format!(
                "function '{}' has no handler reference",
                function.name
            )));
        }
        if function.timeout.is_zero() || function.timeout > MAX_TIMEOUT {
            return Err(invalid(format!(
                "function '{}' timeout {:?} is outside 1s..=900s",
                function.name, function.timeout
            )));
        }

        for &layer_index in &function.layers {
            let Some(layer) = builder.layers.get(layer_index) else {
                return Err(invalid(format!(
                    "function '{}' references an undeclared layer",
                    function.name
                )));
            };
            if !layer.is_compatible_with(function.runtime) {
                return Err(invalid(format!(
                    "layer '{}' does not support runtime {} required by function '{}'",
                    layer.name,
                    function.runtime.as_str(),
                    function.name
                )));
            }
        }

        // Capability exclusivity: model invocation XOR speech synthesis.
        if function.holds_grant(BEDROCK_INVOKE_MODEL) && function.holds_grant(POLLY_SYNTHESIZE_SPEECH)
        {
            return Err(invalid(format!(
                "function '{}' holds both model-invocation and speech-synthesis grants",
                function.name
            )));
        }
    }
    Ok(())
}

fn check_prefix_filters(builder: &StackBuilder) -> Result<(), StackError> {
    for subscription in &builder.subscriptions {
        let prefix = subscription.prefix.as_str();
        let malformed = prefix.is_empty()
            || prefix.starts_with('/')
            || prefix.contains('*')
            || prefix.chars().any(char::is_whitespace);
        if malformed {
            return Err(invalid(format!(
                "malformed subscription prefix filter '{prefix}'"
            )));
        }
    }

    // S3 rejects overlapping filters for the same event type on one bucket.
    for (i, a) in builder.subscriptions.iter().enumerate() {
        for b in &builder.subscriptions[i + 1..] {
            if a.bucket == b.bucket
                && a.event == b.event
                && prefixes_overlap(&a.prefix, &b.prefix)
            {
                return Err(invalid(format!(
                    "subscription prefixes '{}' and '{}' overlap on bucket '{}'",
                    a.prefix, b.prefix, builder.buckets[a.bucket].name
                )));
            }
        }
    }

    Ok(())
}

/// Any function wired to a bucket (by trigger or declared write) must hold
/// an explicit read/write grant on that bucket's ARN. Access is never
/// implicit, and a grant on some other bucket does not count.
fn check_storage_grants(builder: &StackBuilder) -> Result<(), StackError> {
    for subscription in &builder.subscriptions {
        let function = &builder.functions[subscription.function];
        let bucket = &builder.buckets[subscription.bucket];
        if !function.holds_grant_on("s3:GetObject", &bucket.arn()) {
            return Err(invalid(format!(
                "function '{}' is subscribed to bucket '{}' without a read/write grant on it",
                function.name, bucket.name
            )));
        }
    }

    for function in &builder.functions {
        for write in &function.writes {
            let bucket = &builder.buckets[write.bucket];
            if !function.holds_grant_on("s3:PutObject", &bucket.arn()) {
                return Err(invalid(format!(
                    "function '{}' declares writes to bucket '{}' without a read/write grant on it",
                    function.name, bucket.name
                )));
            }
        }
    }

    Ok(())
}

/// Reject trigger cycles: an edge runs from writer to subscriber whenever
/// a declared write prefix lands inside (or contains) a subscription
/// filter on the same bucket. A cycle in that graph means objects would
/// re-trigger their own producers forever.
fn check_trigger_cycles(builder: &StackBuilder) -> Result<(), StackError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<_> = (0..builder.functions.len())
        .map(|i| graph.add_node(i))
        .collect();

    for (writer_index, function) in builder.functions.iter().enumerate() {
        for write in &function.writes {
            for subscription in &builder.subscriptions {
                if subscription.bucket == write.bucket
                    && prefixes_overlap(&write.prefix, &subscription.prefix)
                {
                    if subscription.function == writer_index {
                        return Err(invalid(format!(
                            "function '{}' writes under its own trigger prefix '{}'",
                            function.name, subscription.prefix
                        )));
                    }
                    graph.add_edge(nodes[writer_index], nodes[subscription.function], ());
                }
            }
        }
    }

    if is_cyclic_directed(&graph) {
        return Err(invalid(
            "storage subscriptions and declared writes form a trigger cycle".to_string(),
        ));
    }

    Ok(())
}
