use async_trait::async_trait;

use crate::errors::StackError;
use crate::resources::{Bucket, EventKind, Function, LayerVersion};

/// A subscription with its function reference resolved to a name, ready
/// to hand to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubscription {
    pub function_name: String,
    pub event: EventKind,
    pub prefix: String,
}

/// Seam between the orchestration layer and the cloud.
///
/// Each create operation has a matching delete so the deployer can roll a
/// failed deployment back to nothing. Implementations must treat each
/// call as a single attempt; retry policy is deliberately absent.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    async fn publish_layer(&self, layer: &LayerVersion) -> Result<(), StackError>;
    async fn delete_layer(&self, layer: &LayerVersion) -> Result<(), StackError>;

    async fn create_bucket(&self, bucket: &Bucket) -> Result<(), StackError>;
    async fn delete_bucket(&self, bucket: &Bucket) -> Result<(), StackError>;

    /// Create a function together with its execution identity and every
    /// attached grant. `layers` carries the resolved layer declarations
    /// in attachment order.
    async fn create_function(
        &self,
        function: &Function,
        layers: &[&LayerVersion],
    ) -> Result<(), StackError>;
    async fn delete_function(&self, function: &Function) -> Result<(), StackError>;

    /// Replace the bucket's notification configuration with the given
    /// subscriptions.
    async fn put_bucket_notifications(
        &self,
        bucket: &Bucket,
        subscriptions: &[ResolvedSubscription],
    ) -> Result<(), StackError>;
    async fn clear_bucket_notifications(&self, bucket: &Bucket) -> Result<(), StackError>;
}
