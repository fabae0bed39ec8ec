//! The Gen AI Bedrock lab stack.
//!
//! Pipeline: an object written under `input/summarise` triggers the
//! summarizer, which writes its result under `output/summary`; that write
//! triggers the audio converter, which writes the spoken version under
//! `output/audio`. The complaint-reply function sits outside the chain
//! and is invoked on demand.

use std::time::Duration;

use crate::core::config::DeployConfig;
use crate::core::names::lab_bucket_name;
use crate::errors::StackError;
use crate::resources::{BucketEncryption, LambdaRuntime};
use crate::stack::{FunctionSpec, Stack, StackBuilder};

pub const REPLY_FUNCTION: &str = "bedrock-reply-to-complaint";
pub const SUMMARISE_FUNCTION: &str = "bedrock-summarise-text";
pub const AUDIO_FUNCTION: &str = "convert-text-to-audio";

pub const INPUT_SUMMARISE_PREFIX: &str = "input/summarise";
pub const OUTPUT_SUMMARY_PREFIX: &str = "output/summary";
pub const OUTPUT_AUDIO_PREFIX: &str = "output/audio";

/// Declare the lab deployment: one encrypted bucket, the shared Bedrock
/// SDK layer, and the three functions with their grants and triggers.
///
/// # Errors
///
/// Returns `StackError::Validation` if any declaration is invalid; the
/// whole stack is rejected as a unit.
pub fn gen_ai_bedrock_stack(config: &DeployConfig) -> Result<Stack, StackError> {
    let mut stack =
        StackBuilder::new("gen-ai-bedrock", config).with_description("Bedrock stack for Gen AI");

    let bedrock_layer = stack.add_layer(
        "bedrock-sdk",
        "src/layers/bedrock",
        &[LambdaRuntime::Python311],
    );

    let reply_to_complaint = stack.add_function(
        FunctionSpec::new(
            REPLY_FUNCTION,
            "src/lambdas/reply_to_complaint",
            "handler",
            LambdaRuntime::Python311,
            Duration::from_secs(30),
        )
        .with_layer(bedrock_layer),
    );
    stack.grant_invoke_model(reply_to_complaint);

    let bucket = stack.add_bucket(
        &lab_bucket_name(&config.account_id),
        BucketEncryption::S3Managed,
    );

    let summarise_text = stack.add_function(
        FunctionSpec::new(
            SUMMARISE_FUNCTION,
            "src/lambdas/summarise_text",
            "handler",
            LambdaRuntime::Python311,
            Duration::from_secs(90),
        )
        .with_layer(bedrock_layer),
    );
    stack.grant_invoke_model(summarise_text);
    stack.grant_read_write(summarise_text, bucket);
    stack.on_object_created(summarise_text, bucket, INPUT_SUMMARISE_PREFIX);
    stack.declares_write(summarise_text, bucket, OUTPUT_SUMMARY_PREFIX);

    let convert_to_audio = stack.add_function(FunctionSpec::new(
        AUDIO_FUNCTION,
        "src/lambdas/convert_to_audio",
        "handler",
        LambdaRuntime::Python311,
        Duration::from_secs(30),
    ));
    stack.grant_speech_synthesis(convert_to_audio);
    stack.grant_read_write(convert_to_audio, bucket);
    stack.on_object_created(convert_to_audio, bucket, OUTPUT_SUMMARY_PREFIX);
    stack.declares_write(convert_to_audio, bucket, OUTPUT_AUDIO_PREFIX);

    stack.build()
}
