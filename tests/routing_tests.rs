use bedrock_lab::core::config::DeployConfig;
use bedrock_lab::deploy::{Deployer, MemoryCloud};
use bedrock_lab::resources::policy::{BEDROCK_INVOKE_MODEL, POLLY_SYNTHESIZE_SPEECH};
use bedrock_lab::stacks::{
    AUDIO_FUNCTION, INPUT_SUMMARISE_PREFIX, REPLY_FUNCTION, SUMMARISE_FUNCTION,
    gen_ai_bedrock_stack,
};

fn config() -> DeployConfig {
    DeployConfig::new("123456789012", "us-east-1")
}

async fn deployed_cloud() -> MemoryCloud {
    let cloud = MemoryCloud::new();
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    Deployer::new(&cloud).deploy(&stack).await.unwrap();
    cloud
}

const BUCKET: &str = "123456789012-gen-ai-bedrock-lab";

#[tokio::test]
async fn summarise_input_invokes_only_the_summarizer() {
    let cloud = deployed_cloud().await;

    let invoked = cloud.put_object(BUCKET, "input/summarise/foo.txt");
    assert_eq!(invoked, vec![SUMMARISE_FUNCTION.to_string()]);

    // Exactly one invocation, and neither of the other two functions
    let invocations = cloud.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].function, SUMMARISE_FUNCTION);
    assert_eq!(invocations[0].key, "input/summarise/foo.txt");
}

#[tokio::test]
async fn summary_output_invokes_only_the_audio_converter() {
    let cloud = deployed_cloud().await;

    let invoked = cloud.put_object(BUCKET, "output/summary/foo.mp3-input.txt");
    assert_eq!(invoked, vec![AUDIO_FUNCTION.to_string()]);
}

#[tokio::test]
async fn keys_outside_declared_prefixes_invoke_nothing() {
    let cloud = deployed_cloud().await;

    assert!(cloud.put_object(BUCKET, "input/other/foo.txt").is_empty());
    assert!(cloud.put_object(BUCKET, "output/audio/foo.mp3").is_empty());
    assert!(cloud.put_object(BUCKET, "unrelated.txt").is_empty());
    assert!(cloud.invocations().is_empty());
}

#[tokio::test]
async fn pipeline_chain_fires_stage_by_stage() {
    let cloud = deployed_cloud().await;

    // Stage one: raw text arrives
    let first = cloud.put_object(BUCKET, "input/summarise/report.txt");
    assert_eq!(first, vec![SUMMARISE_FUNCTION.to_string()]);

    // Stage two: the summarizer's write lands under output/summary
    let second = cloud.put_object(BUCKET, "output/summary/report.txt");
    assert_eq!(second, vec![AUDIO_FUNCTION.to_string()]);

    // Stage three: the audio artifact triggers nothing further
    let third = cloud.put_object(BUCKET, "output/audio/report.mp3");
    assert!(third.is_empty());
}

#[test]
fn reply_function_has_no_subscriptions() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    assert!(stack.subscriptions_for(REPLY_FUNCTION).is_empty());
    assert_eq!(stack.subscriptions_for(SUMMARISE_FUNCTION).len(), 1);
    assert_eq!(stack.subscriptions_for(AUDIO_FUNCTION).len(), 1);
}

#[test]
fn summariser_subscription_filter_is_exact() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    let subscriptions = stack.subscriptions_for(SUMMARISE_FUNCTION);
    assert_eq!(subscriptions[0].prefix, INPUT_SUMMARISE_PREFIX);
}

#[test]
fn granted_actions_match_declared_capabilities_exactly() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();

    let reply = stack.function(REPLY_FUNCTION).unwrap();
    assert_eq!(reply.granted_actions(), vec![BEDROCK_INVOKE_MODEL]);

    let summarise = stack.function(SUMMARISE_FUNCTION).unwrap();
    assert_eq!(
        summarise.granted_actions(),
        vec![
            BEDROCK_INVOKE_MODEL,
            "s3:GetObject",
            "s3:PutObject",
            "s3:DeleteObject",
            "s3:ListBucket",
        ]
    );

    let audio = stack.function(AUDIO_FUNCTION).unwrap();
    assert_eq!(
        audio.granted_actions(),
        vec![
            POLLY_SYNTHESIZE_SPEECH,
            "s3:GetObject",
            "s3:PutObject",
            "s3:DeleteObject",
            "s3:ListBucket",
        ]
    );

    // No cross-capability leakage
    assert!(!reply.holds_grant(POLLY_SYNTHESIZE_SPEECH));
    assert!(!audio.holds_grant(BEDROCK_INVOKE_MODEL));
}
