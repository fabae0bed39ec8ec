use anyhow::Result;
use bedrock_lab::core::config::DeployConfig;
use bedrock_lab::stacks::gen_ai_bedrock_stack;

fn main() -> Result<()> {
    bedrock_lab::setup_logging();

    let config = DeployConfig::from_env().map_err(anyhow::Error::msg)?;
    let stack = gen_ai_bedrock_stack(&config)?;
    println!("{}", stack.synthesize()?);
    Ok(())
}
