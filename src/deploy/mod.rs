//! Materialization: apply a finalized stack to a cloud provider,
//! all-or-nothing.

mod aws;
mod memory;
mod provider;

pub use aws::AwsCloud;
pub use memory::{Invocation, MemoryCloud};
pub use provider::{CloudProvider, ResolvedSubscription};

use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::StackError;
use crate::stack::{DeployStep, Stack};

/// Outcome of a successful deployment.
#[derive(Debug, Clone)]
pub struct DeploymentRecord {
    pub deployment_id: Uuid,
    pub stack_name: String,
    pub region: String,
    /// Human-readable names of the materialized resources, in creation
    /// order.
    pub resources: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Applies a stack's deployment plan to one provider.
///
/// Single-attempt and fail-fast: the first failing step stops the
/// deployment, everything created before it is deleted in reverse order,
/// and the original error is surfaced.
pub struct Deployer<'a, P: CloudProvider> {
    provider: &'a P,
}

impl<'a, P: CloudProvider> Deployer<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Materialize every resource in the stack's resolved order.
    ///
    /// # Errors
    ///
    /// Returns the first provider error after rolling back all resources
    /// created by this deployment.
    pub async fn deploy(&self, stack: &Stack) -> Result<DeploymentRecord, StackError> {
        let deployment_id = Uuid::new_v4();
        info!(
            deployment_id = %deployment_id,
            stack = stack.name(),
            region = stack.region(),
            steps = stack.plan().len(),
            "Starting deployment"
        );

        let mut created: Vec<DeployStep> = Vec::new();
        for &step in stack.plan() {
            if let Err(e) = self.apply(stack, step).await {
                error!(
                    deployment_id = %deployment_id,
                    resource = %step_name(stack, step),
                    "Step failed, rolling back {} resources: {}",
                    created.len(),
                    e
                );
                self.rollback(stack, &created).await;
                return Err(e);
            }
            info!(resource = %step_name(stack, step), "Materialized");
            created.push(step);
        }

        Ok(DeploymentRecord {
            deployment_id,
            stack_name: stack.name().to_string(),
            region: stack.region().to_string(),
            resources: created.iter().map(|&s| step_name(stack, s)).collect(),
            completed_at: Utc::now(),
        })
    }

    async fn apply(&self, stack: &Stack, step: DeployStep) -> Result<(), StackError> {
        match step {
            DeployStep::Layer(i) => self.provider.publish_layer(&stack.layers()[i]).await,
            DeployStep::Bucket(i) => self.provider.create_bucket(&stack.buckets()[i]).await,
            DeployStep::Function(i) => {
                let function = &stack.functions()[i];
                let layers: Vec<_> = function.layers.iter().map(|&l| &stack.layers()[l]).collect();
                self.provider.create_function(function, &layers).await
            }
            DeployStep::Notifications(i) => {
                let bucket = &stack.buckets()[i];
                let subscriptions: Vec<ResolvedSubscription> = stack
                    .subscriptions()
                    .iter()
                    .filter(|s| s.bucket == i)
                    .map(|s| ResolvedSubscription {
                        function_name: stack.functions()[s.function].name.clone(),
                        event: s.event,
                        prefix: s.prefix.clone(),
                    })
                    .collect();
                self.provider
                    .put_bucket_notifications(bucket, &subscriptions)
                    .await
            }
        }
    }

    /// Delete previously created resources in reverse order. Rollback
    /// failures are logged and skipped so the remaining resources still
    /// get a deletion attempt.
    async fn rollback(&self, stack: &Stack, created: &[DeployStep]) {
        for &step in created.iter().rev() {
            let result = match step {
                DeployStep::Layer(i) => self.provider.delete_layer(&stack.layers()[i]).await,
                DeployStep::Bucket(i) => self.provider.delete_bucket(&stack.buckets()[i]).await,
                DeployStep::Function(i) => {
                    self.provider.delete_function(&stack.functions()[i]).await
                }
                DeployStep::Notifications(i) => {
                    self.provider
                        .clear_bucket_notifications(&stack.buckets()[i])
                        .await
                }
            };
            match result {
                Ok(()) => info!(resource = %step_name(stack, step), "Rolled back"),
                Err(e) => error!(
                    resource = %step_name(stack, step),
                    "Rollback failed, continuing: {}", e
                ),
            }
        }
    }
}

fn step_name(stack: &Stack, step: DeployStep) -> String {
    match step {
        DeployStep::Layer(i) => format!("layer {}", stack.layers()[i].name),
        DeployStep::Bucket(i) => format!("bucket {}", stack.buckets()[i].name),
        DeployStep::Function(i) => format!("function {}", stack.functions()[i].name),
        DeployStep::Notifications(i) => {
            format!("notifications for bucket {}", stack.buckets()[i].name)
        }
    }
}
