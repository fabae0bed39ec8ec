use anyhow::Result;
use bedrock_lab::core::config::DeployConfig;
use bedrock_lab::deploy::{AwsCloud, Deployer};
use bedrock_lab::stacks::gen_ai_bedrock_stack;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    bedrock_lab::setup_logging();

    let config = DeployConfig::from_env().map_err(anyhow::Error::msg)?;
    let stack = gen_ai_bedrock_stack(&config)?;
    info!(
        stack = stack.name(),
        region = stack.region(),
        template_bytes = stack.synthesize()?.len(),
        "Synthesized stack"
    );

    let cloud = AwsCloud::connect(&config).await;
    let record = Deployer::new(&cloud).deploy(&stack).await?;
    info!(
        deployment_id = %record.deployment_id,
        resources = record.resources.len(),
        completed_at = %record.completed_at,
        "Deployment complete"
    );
    Ok(())
}
