//! The orchestration layer: declaration builder, validation, dependency
//! resolution, and template synthesis.

mod builder;
mod graph;
mod synth;
mod validate;

pub use builder::{BucketId, FunctionId, FunctionSpec, LayerId, StackBuilder};
pub use graph::DeployStep;

use crate::resources::{Bucket, EventSubscription, Function, LayerVersion};

/// A finalized deployment description. Produced by `StackBuilder::build`
/// after validation; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    region: String,
    account_id: String,
    buckets: Vec<Bucket>,
    layers: Vec<LayerVersion>,
    functions: Vec<Function>,
    subscriptions: Vec<EventSubscription>,
    plan: Vec<DeployStep>,
}

impl Stack {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn layers(&self) -> &[LayerVersion] {
        &self.layers
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn subscriptions(&self) -> &[EventSubscription] {
        &self.subscriptions
    }

    /// Resource creation order resolved from the dependency graph.
    pub fn plan(&self) -> &[DeployStep] {
        &self.plan
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Subscriptions wired to the named function.
    pub fn subscriptions_for(&self, function_name: &str) -> Vec<&EventSubscription> {
        let Some(index) = self.functions.iter().position(|f| f.name == function_name) else {
            return Vec::new();
        };
        self.subscriptions
            .iter()
            .filter(|s| s.function == index)
            .collect()
    }
}
