//! In-memory cloud provider.
//!
//! Records every materialized resource and routes simulated object writes
//! through the stored notification configurations, so tests can exercise
//! deployment atomicity and event wiring without AWS.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::deploy::provider::{CloudProvider, ResolvedSubscription};
use crate::errors::StackError;
use crate::resources::{Bucket, EventKind, Function, LayerVersion};

/// One simulated function invocation caused by an object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Default)]
struct State {
    layers: Vec<String>,
    buckets: Vec<String>,
    functions: Vec<Function>,
    notifications: BTreeMap<String, Vec<ResolvedSubscription>>,
    invocations: Vec<Invocation>,
}

/// Test double for [`CloudProvider`]. `fail_on` injects a failure when
/// the named resource is created, for rollback tests.
#[derive(Debug, Default)]
pub struct MemoryCloud {
    state: Mutex<State>,
    fail_on: Option<String>,
}

impl MemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that fails creation of the resource with this name.
    pub fn failing_on(name: &str) -> Self {
        Self {
            state: Mutex::new(State::default()),
            fail_on: Some(name.to_string()),
        }
    }

    fn check_failure(&self, name: &str) -> Result<(), StackError> {
        match &self.fail_on {
            Some(target) if target == name => Err(StackError::Deploy(format!(
                "injected failure creating '{name}'"
            ))),
            _ => Ok(()),
        }
    }

    /// Simulate an object write and deliver object-created events to the
    /// subscribed functions. Returns the invoked function names.
    pub fn put_object(&self, bucket: &str, key: &str) -> Vec<String> {
        let mut state = self.state.lock().expect("provider state poisoned");
        let invoked: Vec<String> = state
            .notifications
            .get(bucket)
            .map(|subscriptions| {
                subscriptions
                    .iter()
                    .filter(|s| s.event == EventKind::ObjectCreated && key.starts_with(&s.prefix))
                    .map(|s| s.function_name.clone())
                    .collect()
            })
            .unwrap_or_default();

        for function in &invoked {
            state.invocations.push(Invocation {
                function: function.clone(),
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        invoked
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.state.lock().expect("provider state poisoned").layers.clone()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.state.lock().expect("provider state poisoned").buckets.clone()
    }

    pub fn function_names(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("provider state poisoned")
            .functions
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn subscriptions_for(&self, bucket: &str) -> Vec<ResolvedSubscription> {
        self.state
            .lock()
            .expect("provider state poisoned")
            .notifications
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state
            .lock()
            .expect("provider state poisoned")
            .invocations
            .clone()
    }

    /// True when no resource of any kind remains.
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock().expect("provider state poisoned");
        state.layers.is_empty()
            && state.buckets.is_empty()
            && state.functions.is_empty()
            && state.notifications.is_empty()
    }
}

#[async_trait]
impl CloudProvider for MemoryCloud {
    async fn publish_layer(&self, layer: &LayerVersion) -> Result<(), StackError> {
        self.check_failure(&layer.name)?;
        let mut state = self.state.lock().expect("provider state poisoned");
        if state.layers.contains(&layer.name) {
            return Err(StackError::Deploy(format!(
                "layer '{}' already exists",
                layer.name
            )));
        }
        state.layers.push(layer.name.clone());
        Ok(())
    }

    async fn delete_layer(&self, layer: &LayerVersion) -> Result<(), StackError> {
        let mut state = self.state.lock().expect("provider state poisoned");
        state.layers.retain(|l| l != &layer.name);
        Ok(())
    }

    async fn create_bucket(&self, bucket: &Bucket) -> Result<(), StackError> {
        self.check_failure(&bucket.name)?;
        let mut state = self.state.lock().expect("provider state poisoned");
        if state.buckets.contains(&bucket.name) {
            return Err(StackError::Deploy(format!(
                "bucket '{}' already exists",
                bucket.name
            )));
        }
        state.buckets.push(bucket.name.clone());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &Bucket) -> Result<(), StackError> {
        let mut state = self.state.lock().expect("provider state poisoned");
        state.buckets.retain(|b| b != &bucket.name);
        Ok(())
    }

    async fn create_function(
        &self,
        function: &Function,
        _layers: &[&LayerVersion],
    ) -> Result<(), StackError> {
        self.check_failure(&function.name)?;
        let mut state = self.state.lock().expect("provider state poisoned");
        if state.functions.iter().any(|f| f.name == function.name) {
            return Err(StackError::Deploy(format!(
                "function '{}' already exists",
                function.name
            )));
        }
        state.functions.push(function.clone());
        Ok(())
    }

    async fn delete_function(&self, function: &Function) -> Result<(), StackError> {
        let mut state = self.state.lock().expect("provider state poisoned");
        state.functions.retain(|f| f.name != function.name);
        Ok(())
    }

    async fn put_bucket_notifications(
        &self,
        bucket: &Bucket,
        subscriptions: &[ResolvedSubscription],
    ) -> Result<(), StackError> {
        let mut state = self.state.lock().expect("provider state poisoned");
        if !state.buckets.contains(&bucket.name) {
            return Err(StackError::Deploy(format!(
                "bucket '{}' does not exist",
                bucket.name
            )));
        }
        state
            .notifications
            .insert(bucket.name.clone(), subscriptions.to_vec());
        Ok(())
    }

    async fn clear_bucket_notifications(&self, bucket: &Bucket) -> Result<(), StackError> {
        let mut state = self.state.lock().expect("provider state poisoned");
        state.notifications.remove(&bucket.name);
        Ok(())
    }
}
