//! Configuration records for the declared cloud resources.
//!
//! These are deployment-description entities, not runtime state: a `Stack`
//! owns one vector per kind and cross-references them by index.

pub mod bucket;
pub mod function;
pub mod layer;
pub mod policy;
pub mod subscription;

pub use bucket::{Bucket, BucketEncryption};
pub use function::{Function, LambdaRuntime, WriteDeclaration};
pub use layer::LayerVersion;
pub use policy::{Effect, PolicyStatement};
pub use subscription::{EventKind, EventSubscription};
