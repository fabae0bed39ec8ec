use std::env;

/// The region the lab stack is deployed to.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Deployment-time configuration: the account the stack is materialized
/// into and the target region.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub account_id: String,
    pub region: String,
}

impl DeployConfig {
    pub fn new(account_id: &str, region: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            region: region.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            account_id: env::var("AWS_ACCOUNT_ID").map_err(|e| format!("AWS_ACCOUNT_ID: {}", e))?,
            region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
        })
    }
}
