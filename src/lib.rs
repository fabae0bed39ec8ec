/// bedrock-lab - declarative orchestration for the Gen AI Bedrock pipeline.
///
/// This crate describes, validates, and materializes a small serverless
/// deployment: one encrypted S3 bucket, three Lambda functions, a shared
/// Bedrock SDK layer, least-privilege IAM grants, and prefix-filtered
/// object-created subscriptions chaining the bucket to two of the functions.
///
/// # Architecture
///
/// The system uses:
/// - A `StackBuilder` context that collects resource declarations and
///   finalizes them into an immutable `Stack`
/// - Validation that rejects every invalid declaration before any cloud
///   call is made (duplicate names, malformed prefixes, trigger cycles,
///   missing storage grants)
/// - A `petgraph`-backed dependency graph resolved to a deterministic
///   deployment order
/// - A `CloudProvider` seam with a real AWS implementation and an
///   in-memory one for tests
/// - All-or-nothing materialization: a failed step rolls back everything
///   created before it
///
/// # Example
///
/// ```no_run
/// use bedrock_lab::core::config::DeployConfig;
/// use bedrock_lab::stacks::gen_ai_bedrock_stack;
///
/// let config = DeployConfig::new("123456789012", "us-east-1");
/// let stack = gen_ai_bedrock_stack(&config).expect("stack declarations are valid");
/// println!("{}", stack.synthesize().expect("template"));
/// ```
// Module declarations
pub mod core;
pub mod deploy;
pub mod errors;
pub mod resources;
pub mod stack;
pub mod stacks;

/// Configure structured logging with JSON format for deployment tooling.
///
/// Sets up tracing-subscriber with a JSON formatter so synth/deploy runs
/// produce machine-readable logs. Call once at the start of each binary.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry().with(fmt_layer).init();
}
