//! Template synthesis.
//!
//! Renders a finalized stack as a CloudFormation-flavored JSON document.
//! Output is byte-identical across repeated synthesis of the same
//! declarations: logical IDs are content-derived and the resource map is
//! key-ordered.

use serde_json::{Map, Value, json};

use crate::core::names::logical_id;
use crate::errors::StackError;
use crate::stack::{DeployStep, Stack};

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

impl Stack {
    /// Render the deployment description as a JSON template value.
    pub fn template(&self) -> Result<Value, StackError> {
        let mut resources = Map::new();

        for step in self.plan() {
            let (id, resource) = match *step {
                DeployStep::Layer(i) => self.layer_resource(i),
                DeployStep::Bucket(i) => self.bucket_resource(i),
                DeployStep::Function(i) => self.function_resource(i),
                DeployStep::Notifications(i) => self.notification_resource(i),
            };
            if resources.insert(id.clone(), resource).is_some() {
                return Err(StackError::Synthesis(format!(
                    "logical id collision on '{id}'"
                )));
            }
        }

        Ok(json!({
            "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
            "Description": self.description().unwrap_or_default(),
            "Resources": Value::Object(resources),
        }))
    }

    /// Render the template as pretty-printed JSON.
    pub fn synthesize(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string_pretty(&self.template()?)?)
    }

    fn layer_resource(&self, index: usize) -> (String, Value) {
        let layer = &self.layers()[index];
        let resource = json!({
            "Type": "AWS::Lambda::LayerVersion",
            "Properties": {
                "LayerName": &layer.name,
                "CompatibleRuntimes": layer
                    .compatible_runtimes
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>(),
                "Content": { "Entry": &layer.entry },
            },
        });
        (logical_id(self.name(), &layer.name), resource)
    }

    fn bucket_resource(&self, index: usize) -> (String, Value) {
        let bucket = &self.buckets()[index];
        let resource = json!({
            "Type": "AWS::S3::Bucket",
            "Properties": {
                "BucketName": &bucket.name,
                "BucketEncryption": {
                    "SSEAlgorithm": bucket.encryption.sse_algorithm(),
                },
            },
        });
        (logical_id(self.name(), &bucket.name), resource)
    }

    fn function_resource(&self, index: usize) -> (String, Value) {
        let function = &self.functions()[index];
        let layers: Vec<String> = function
            .layers
            .iter()
            .map(|&l| logical_id(self.name(), &self.layers()[l].name))
            .collect();
        let policies: Vec<Value> = function.policies.iter().map(|p| p.to_json()).collect();

        let resource = json!({
            "Type": "AWS::Lambda::Function",
            "Properties": {
                "FunctionName": &function.name,
                "Handler": &function.handler,
                "Runtime": function.runtime.as_str(),
                "Timeout": function.timeout.as_secs(),
                "Code": { "Entry": &function.entry },
                "Layers": layers,
                "Environment": &function.environment,
                "Policies": policies,
            },
        });
        (logical_id(self.name(), &function.name), resource)
    }

    fn notification_resource(&self, bucket_index: usize) -> (String, Value) {
        let bucket = &self.buckets()[bucket_index];
        let configurations: Vec<Value> = self
            .subscriptions()
            .iter()
            .filter(|s| s.bucket == bucket_index)
            .map(|s| {
                json!({
                    "Event": s.event.as_str(),
                    "Prefix": &s.prefix,
                    "Function": logical_id(self.name(), &self.functions()[s.function].name),
                })
            })
            .collect();

        let resource = json!({
            "Type": "AWS::S3::BucketNotification",
            "Properties": {
                "Bucket": logical_id(self.name(), &bucket.name),
                "LambdaConfigurations": configurations,
            },
        });
        let id = logical_id(self.name(), &format!("{}-notifications", bucket.name));
        (id, resource)
    }
}
