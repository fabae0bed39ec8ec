use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::config::DeployConfig;
use crate::errors::StackError;
use crate::resources::{
    Bucket, BucketEncryption, EventKind, EventSubscription, Function, LambdaRuntime, LayerVersion,
    PolicyStatement, WriteDeclaration,
};
use crate::stack::{Stack, graph, validate};

/// Handle to a declared bucket, only obtainable from `add_bucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketId(pub(super) usize);

/// Handle to a declared function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionId(pub(super) usize);

/// Handle to a declared layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerId(pub(super) usize);

/// Declaration input for a compute unit.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub entry: String,
    pub handler: String,
    pub runtime: LambdaRuntime,
    pub timeout: Duration,
    pub layers: Vec<LayerId>,
    pub environment: BTreeMap<String, String>,
}

impl FunctionSpec {
    pub fn new(
        name: &str,
        entry: &str,
        handler: &str,
        runtime: LambdaRuntime,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.to_string(),
            entry: entry.to_string(),
            handler: handler.to_string(),
            runtime,
            timeout,
            layers: Vec::new(),
            environment: BTreeMap::new(),
        }
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }
}

/// Explicit builder context for one stack.
///
/// Every declaration goes through this type; `build` validates the whole
/// description at once and finalizes it into an immutable [`Stack`]. A
/// single invalid declaration fails the entire build, so nothing is ever
/// materialized from a partially valid description.
#[derive(Debug)]
pub struct StackBuilder {
    pub(super) name: String,
    pub(super) description: Option<String>,
    pub(super) region: String,
    pub(super) account_id: String,
    pub(super) buckets: Vec<Bucket>,
    pub(super) layers: Vec<LayerVersion>,
    pub(super) functions: Vec<Function>,
    pub(super) subscriptions: Vec<EventSubscription>,
}

impl StackBuilder {
    pub fn new(name: &str, config: &DeployConfig) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            region: config.region.clone(),
            account_id: config.account_id.clone(),
            buckets: Vec::new(),
            layers: Vec::new(),
            functions: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn add_bucket(&mut self, name: &str, encryption: BucketEncryption) -> BucketId {
        self.buckets.push(Bucket {
            name: name.to_string(),
            encryption,
        });
        BucketId(self.buckets.len() - 1)
    }

    pub fn add_layer(
        &mut self,
        name: &str,
        entry: &str,
        compatible_runtimes: &[LambdaRuntime],
    ) -> LayerId {
        self.layers.push(LayerVersion {
            name: name.to_string(),
            entry: entry.to_string(),
            compatible_runtimes: compatible_runtimes.to_vec(),
        });
        LayerId(self.layers.len() - 1)
    }

    pub fn add_function(&mut self, spec: FunctionSpec) -> FunctionId {
        self.functions.push(Function {
            name: spec.name,
            entry: spec.entry,
            handler: spec.handler,
            runtime: spec.runtime,
            timeout: spec.timeout,
            layers: spec.layers.into_iter().map(|l| l.0).collect(),
            environment: spec.environment,
            policies: Vec::new(),
            writes: Vec::new(),
        });
        FunctionId(self.functions.len() - 1)
    }

    /// Attach the model-invocation capability to one function. The only
    /// way a function gains `bedrock:InvokeModel`.
    pub fn grant_invoke_model(&mut self, function: FunctionId) {
        self.functions[function.0]
            .policies
            .push(PolicyStatement::invoke_model());
    }

    /// Attach the speech-synthesis capability to one function.
    pub fn grant_speech_synthesis(&mut self, function: FunctionId) {
        self.functions[function.0]
            .policies
            .push(PolicyStatement::synthesize_speech());
    }

    /// Grant a function read/write access to a bucket, scoped to that
    /// bucket's ARN and objects.
    pub fn grant_read_write(&mut self, function: FunctionId, bucket: BucketId) {
        let statement = PolicyStatement::bucket_read_write(&self.buckets[bucket.0]);
        self.functions[function.0].policies.push(statement);
    }

    /// Subscribe a function to object-created events under `prefix`.
    ///
    /// The single place subscriptions are constructed: every trigger in a
    /// stack goes through here, so multiple functions can share a bucket
    /// under disjoint prefixes without duplicating wiring.
    pub fn on_object_created(&mut self, function: FunctionId, bucket: BucketId, prefix: &str) {
        self.subscriptions.push(EventSubscription {
            bucket: bucket.0,
            function: function.0,
            event: EventKind::ObjectCreated,
            prefix: prefix.to_string(),
        });
    }

    /// Record that a function writes objects under `prefix`. Validation
    /// uses these declarations to reject trigger cycles.
    pub fn declares_write(&mut self, function: FunctionId, bucket: BucketId, prefix: &str) {
        self.functions[function.0].writes.push(WriteDeclaration {
            bucket: bucket.0,
            prefix: prefix.to_string(),
        });
    }

    /// Validate every declaration and finalize the stack.
    ///
    /// # Errors
    ///
    /// Returns `StackError::Validation` on the first violated invariant;
    /// no partially valid stack is ever produced.
    pub fn build(self) -> Result<Stack, StackError> {
        validate::validate(&self)?;
        let plan = graph::deployment_plan(&self)?;
        Ok(Stack {
            name: self.name,
            description: self.description,
            region: self.region,
            account_id: self.account_id,
            buckets: self.buckets,
            layers: self.layers,
            functions: self.functions,
            subscriptions: self.subscriptions,
            plan,
        })
    }
}
