//! AWS implementation of the provider seam.
//!
//! One client per service the stack touches. Function code and layer
//! content are expected as prebuilt `bundle.zip` archives inside each
//! declaration's entry directory; packaging is out of scope here.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_lambda::primitives::Blob;
use serde_json::json;
use tracing::info;

use crate::core::config::DeployConfig;
use crate::deploy::provider::{CloudProvider, ResolvedSubscription};
use crate::errors::StackError;
use crate::resources::{Bucket, Function, LayerVersion};

const LAMBDA_BASIC_EXECUTION_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// Statement id for the S3 invoke permission backing one subscription.
/// Indexed per bucket so several subscriptions on the same bucket never
/// collide, even when they target the same function.
fn invoke_statement_id(bucket: &Bucket, index: usize) -> String {
    format!("s3-invoke-{}-{index}", bucket.name)
}

/// Real cloud provider backed by the S3, Lambda, and IAM SDK clients.
pub struct AwsCloud {
    s3: aws_sdk_s3::Client,
    lambda: aws_sdk_lambda::Client,
    iam: aws_sdk_iam::Client,
    account_id: String,
    region: String,
    /// Layer name -> published version, needed to delete on rollback.
    layer_versions: Mutex<HashMap<String, i64>>,
}

impl AwsCloud {
    /// Build clients from the default credential chain, pinned to the
    /// configured region.
    pub async fn connect(config: &DeployConfig) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        Self {
            s3: aws_sdk_s3::Client::new(&shared),
            lambda: aws_sdk_lambda::Client::new(&shared),
            iam: aws_sdk_iam::Client::new(&shared),
            account_id: config.account_id.clone(),
            region: config.region.clone(),

            layer_versions: Mutex::new(HashMap::new()),
        }
    }

    fn role_name(function: &Function) -> String {
        format!("{}-role", function.name)
    }

    fn role_arn(&self, function: &Function) -> String {
        format!(
            "arn:aws:iam::{}:role/{}",
            self.account_id,
            Self::role_name(function)
        )
    }

    fn function_arn(&self, function_name: &str) -> String {
        format!(
            "arn:aws:lambda:{}:{}:function:{}",
            self.region, self.account_id, function_name
        )
    }

    fn bundle(entry: &str) -> Result<Blob, StackError> {
        let path = Path::new(entry).join("bundle.zip");
        let bytes = std::fs::read(&path)
            .map_err(|e| StackError::Deploy(format!("reading {}: {}", path.display(), e)))?;
        Ok(Blob::new(bytes))
    }

    async fn create_execution_role(&self, function: &Function) -> Result<(), StackError> {
        let assume_role = json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Principal": { "Service": "lambda.amazonaws.com" },
                "Action": "sts:AssumeRole",
            }],
        });

        self.iam
            .create_role()
            .role_name(Self::role_name(function))
            .assume_role_policy_document(assume_role.to_string())
            .send()
            .await
            .map_err(|e| StackError::Deploy(format!("creating role: {e:?}")))?;

        self.iam
            .attach_role_policy()
            .role_name(Self::role_name(function))
            .policy_arn(LAMBDA_BASIC_EXECUTION_ARN)
            .send()
            .await
            .map_err(|e| StackError::Deploy(format!("attaching execution policy: {e:?}")))?;

        for (index, statement) in function.policies.iter().enumerate() {
            let document = json!({
                "Version": "2012-10-17",
                "Statement": [statement.to_json()],
            });
            self.iam
                .put_role_policy()
                .role_name(Self::role_name(function))
                .policy_name(format!("{}-{index}", function.name))
                .policy_document(document.to_string())
                .send()
                .await
                .map_err(|e| StackError::Deploy(format!("attaching grant: {e:?}")))?;
        }

        Ok(())
    }
}

#[async_trait]
impl CloudProvider for AwsCloud {
    async fn publish_layer(&self, layer: &LayerVersion) -> Result<(), StackError> {
        let runtimes: Vec<aws_sdk_lambda::types::Runtime> = layer
            .compatible_runtimes
            .iter()
            .map(|r| aws_sdk_lambda::types::Runtime::from(r.as_str()))
            .collect();

        let response = self
            .lambda
            .publish_layer_version()
            .layer_name(&layer.name)
            .set_compatible_runtimes(Some(runtimes))
            .content(
                aws_sdk_lambda::types::LayerVersionContentInput::builder()
                    .zip_file(Self::bundle(&layer.entry)?)
                    .build(),
            )
            .send()
            .await?;

        self.layer_versions
            .lock()
            .expect("layer version map poisoned")
            .insert(layer.name.clone(), response.version());
        info!(layer = %layer.name, version = response.version(), "Published layer");
        Ok(())
    }

    async fn delete_layer(&self, layer: &LayerVersion) -> Result<(), StackError> {
        let version = self
            .layer_versions
            .lock()
            .expect("layer version map poisoned")
            .remove(&layer.name)
            .ok_or_else(|| {
                StackError::Deploy(format!("no published version recorded for '{}'", layer.name))
            })?;
        self.lambda
            .delete_layer_version()
            .layer_name(&layer.name)
            .version_number(version)
            .send()
            .await?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &Bucket) -> Result<(), StackError> {
        let mut request = self.s3.create_bucket().bucket(&bucket.name);
        // us-east-1 rejects an explicit location constraint
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                aws_sdk_s3::types::CreateBucketConfiguration::builder()
                    .location_constraint(aws_sdk_s3::types::BucketLocationConstraint::from(
                        self.region.as_str(),
                    ))
                    .build(),
            );
        }
        request.send().await?;

        let sse = match bucket.encryption.sse_algorithm() {
            "aws:kms" => aws_sdk_s3::types::ServerSideEncryption::AwsKms,
            _ => aws_sdk_s3::types::ServerSideEncryption::Aes256,
        };
        let by_default = aws_sdk_s3::types::ServerSideEncryptionByDefault::builder()
            .sse_algorithm(sse)
            .build()
            .map_err(|e| StackError::Deploy(format!("encryption config: {e}")))?;
        let configuration = aws_sdk_s3::types::ServerSideEncryptionConfiguration::builder()
            .rules(
                aws_sdk_s3::types::ServerSideEncryptionRule::builder()
                    .apply_server_side_encryption_by_default(by_default)
                    .build(),
            )
            .build()
            .map_err(|e| StackError::Deploy(format!("encryption config: {e}")))?;

        self.s3
            .put_bucket_encryption()
            .bucket(&bucket.name)
            .server_side_encryption_configuration(configuration)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &Bucket) -> Result<(), StackError> {
        self.s3.delete_bucket().bucket(&bucket.name).send().await?;
        Ok(())
    }

    async fn create_function(
        &self,
        function: &Function,
        layers: &[&LayerVersion],
    ) -> Result<(), StackError> {
        self.create_execution_role(function).await?;

        // New roles are not immediately visible to Lambda
        tokio::time::sleep(std::time::Duration::from_secs(8)).await;

        let layer_arns: Vec<String> = {
            let versions = self
                .layer_versions
                .lock()
                .expect("layer version map poisoned");
            layers
                .iter()
                .map(|layer| {
                    versions
                        .get(&layer.name)
                        .map(|version| {
                            format!(
                                "arn:aws:lambda:{}:{}:layer:{}:{}",
                                self.region, self.account_id, layer.name, version
                            )
                        })
                        .ok_or_else(|| {
                            StackError::Deploy(format!(
                                "layer '{}' was not published before function '{}'",
                                layer.name, function.name
                            ))
                        })
                })
                .collect::<Result<_, _>>()?
        };

        let environment = aws_sdk_lambda::types::Environment::builder()
            .set_variables(Some(function.environment.clone().into_iter().collect()))
            .build();

        self.lambda
            .create_function()
            .function_name(&function.name)
            .runtime(aws_sdk_lambda::types::Runtime::from(
                function.runtime.as_str(),
            ))
            .handler(&function.handler)
            .role(self.role_arn(function))
            .timeout(i32::try_from(function.timeout.as_secs()).unwrap_or(900))
            .set_layers(Some(layer_arns))
            .environment(environment)
            .code(
                aws_sdk_lambda::types::FunctionCode::builder()
                    .zip_file(Self::bundle(&function.entry)?)
                    .build(),
            )
            .send()
            .await?;
        Ok(())
    }

    async fn delete_function(&self, function: &Function) -> Result<(), StackError> {
        self.lambda
            .delete_function()
            .function_name(&function.name)
            .send()
            .await?;

        for index in 0..function.policies.len() {
            self.iam
                .delete_role_policy()
                .role_name(Self::role_name(function))
                .policy_name(format!("{}-{index}", function.name))
                .send()
                .await
                .map_err(|e| StackError::Deploy(format!("deleting grant: {e:?}")))?;
        }
        self.iam
            .detach_role_policy()
            .role_name(Self::role_name(function))
            .policy_arn(LAMBDA_BASIC_EXECUTION_ARN)
            .send()
            .await
            .map_err(|e| StackError::Deploy(format!("detaching execution policy: {e:?}")))?;
        self.iam
            .delete_role()
            .role_name(Self::role_name(function))
            .send()
            .await
            .map_err(|e| StackError::Deploy(format!("deleting role: {e:?}")))?;
        Ok(())
    }

    async fn put_bucket_notifications(
        &self,
        bucket: &Bucket,
        subscriptions: &[ResolvedSubscription],
    ) -> Result<(), StackError> {
        let mut configurations = Vec::with_capacity(subscriptions.len());
        for (index, subscription) in subscriptions.iter().enumerate() {
            // S3 needs permission to invoke the target function before the
            // notification configuration referencing it is accepted.
            self.lambda
                .add_permission()
                .function_name(&subscription.function_name)
                .statement_id(invoke_statement_id(bucket, index))
                .action("lambda:InvokeFunction")
                .principal("s3.amazonaws.com")
                .source_arn(bucket.arn())
                .send()
                .await?;

            let filter = aws_sdk_s3::types::NotificationConfigurationFilter::builder()
                .key(
                    aws_sdk_s3::types::S3KeyFilter::builder()
                        .filter_rules(
                            aws_sdk_s3::types::FilterRule::builder()
                                .name(aws_sdk_s3::types::FilterRuleName::Prefix)
                                .value(&subscription.prefix)
                                .build(),
                        )
                        .build(),
                )
                .build();

            configurations.push(
                aws_sdk_s3::types::LambdaFunctionConfiguration::builder()
                    .lambda_function_arn(self.function_arn(&subscription.function_name))
                    .events(aws_sdk_s3::types::Event::from(subscription.event.as_str()))
                    .filter(filter)
                    .build()
                    .map_err(|e| StackError::Deploy(format!("notification config: {e}")))?,
            );
        }

        self.s3
            .put_bucket_notification_configuration()
            .bucket(&bucket.name)
            .notification_configuration(
                aws_sdk_s3::types::NotificationConfiguration::builder()
                    .set_lambda_function_configurations(Some(configurations))
                    .build(),
            )
            .send()
            .await?;
        Ok(())
    }

    async fn clear_bucket_notifications(&self, bucket: &Bucket) -> Result<(), StackError> {
        self.s3
            .put_bucket_notification_configuration()
            .bucket(&bucket.name)
            .notification_configuration(
                aws_sdk_s3::types::NotificationConfiguration::builder().build(),
            )
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::BucketEncryption;

    #[test]
    fn invoke_statement_ids_are_unique_per_subscription() {
        let bucket = Bucket {
            name: "acct-gen-ai-bedrock-lab".to_string(),
            encryption: BucketEncryption::S3Managed,
        };
        let first = invoke_statement_id(&bucket, 0);
        let second = invoke_statement_id(&bucket, 1);
        assert_ne!(first, second);
        assert_eq!(first, "s3-invoke-acct-gen-ai-bedrock-lab-0");
    }
}
