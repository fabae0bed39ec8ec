use bedrock_lab::core::config::DeployConfig;
use bedrock_lab::core::names::lab_bucket_name;
use bedrock_lab::stack::DeployStep;
use bedrock_lab::stacks::{AUDIO_FUNCTION, REPLY_FUNCTION, SUMMARISE_FUNCTION, gen_ai_bedrock_stack};

fn config() -> DeployConfig {
    DeployConfig::new("123456789012", "us-east-1")
}

#[test]
fn synthesis_is_deterministic() {
    let first = gen_ai_bedrock_stack(&config()).unwrap().synthesize().unwrap();
    let second = gen_ai_bedrock_stack(&config()).unwrap().synthesize().unwrap();
    assert_eq!(first, second);
}

#[test]
fn bucket_name_is_derived_from_the_account() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    assert_eq!(stack.buckets().len(), 1);
    assert_eq!(stack.buckets()[0].name, "123456789012-gen-ai-bedrock-lab");

    let other = gen_ai_bedrock_stack(&DeployConfig::new("999999999999", "us-east-1")).unwrap();
    assert_eq!(other.buckets()[0].name, lab_bucket_name("999999999999"));
}

#[test]
fn template_contains_every_declared_resource() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    let template = stack.template().unwrap();
    let resources = template["Resources"].as_object().unwrap();

    let mut counts = std::collections::HashMap::new();
    for resource in resources.values() {
        *counts
            .entry(resource["Type"].as_str().unwrap().to_string())
            .or_insert(0) += 1;
    }

    assert_eq!(counts["AWS::Lambda::LayerVersion"], 1);
    assert_eq!(counts["AWS::S3::Bucket"], 1);
    assert_eq!(counts["AWS::Lambda::Function"], 3);
    assert_eq!(counts["AWS::S3::BucketNotification"], 1);
    assert_eq!(resources.len(), 6);
}

#[test]
fn capability_grants_keep_their_wildcard_scope() {
    // The broad `*` scope on the two capability actions is intentional
    // and must survive synthesis unchanged
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    let template = stack.template().unwrap();
    let resources = template["Resources"].as_object().unwrap();

    let mut wildcard_statements = 0;
    for resource in resources.values() {
        if resource["Type"] != "AWS::Lambda::Function" {
            continue;
        }
        for policy in resource["Properties"]["Policies"].as_array().unwrap() {
            let actions = policy["Action"].as_array().unwrap();
            let is_capability = actions
                .iter()
                .any(|a| a == "bedrock:InvokeModel" || a == "polly:SynthesizeSpeech");
            if is_capability {
                assert_eq!(policy["Resource"].as_array().unwrap(), &vec!["*"]);
                wildcard_statements += 1;
            }
        }
    }
    assert_eq!(wildcard_statements, 3);
}

#[test]
fn template_carries_declared_timeouts_and_runtime() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    let template = stack.template().unwrap();
    let resources = template["Resources"].as_object().unwrap();

    for resource in resources.values() {
        if resource["Type"] != "AWS::Lambda::Function" {
            continue;
        }
        let properties = &resource["Properties"];
        assert_eq!(properties["Runtime"], "python3.11");
        assert_eq!(properties["Handler"], "handler");
        let expected_timeout = match properties["FunctionName"].as_str().unwrap() {
            SUMMARISE_FUNCTION => 90,
            REPLY_FUNCTION | AUDIO_FUNCTION => 30,
            other => panic!("unexpected function '{other}'"),
        };
        assert_eq!(properties["Timeout"], expected_timeout);
    }
}

#[test]
fn resource_records_serialize_directly() {
    // The declarative records double as their own serialized form, so
    // they can be dumped for inspection without going through a template
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    let function = stack.function(SUMMARISE_FUNCTION).unwrap();

    let value = serde_json::to_value(function).unwrap();
    assert_eq!(value["name"], SUMMARISE_FUNCTION);
    assert_eq!(value["runtime"], "Python311");
    assert!(
        value["policies"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["actions"].as_array().unwrap().contains(&"bedrock:InvokeModel".into()))
    );

    let bucket = serde_json::to_value(&stack.buckets()[0]).unwrap();
    assert_eq!(bucket["name"], "123456789012-gen-ai-bedrock-lab");
}

#[test]
fn plan_orders_dependencies_before_dependents() {
    let stack = gen_ai_bedrock_stack(&config()).unwrap();
    let plan = stack.plan();

    let position = |step: &DeployStep| plan.iter().position(|s| s == step).unwrap();

    // The shared layer precedes both functions that attach it
    let layer = position(&DeployStep::Layer(0));
    for (index, function) in stack.functions().iter().enumerate() {
        if !function.layers.is_empty() {
            assert!(layer < position(&DeployStep::Function(index)));
        }
    }

    // The bucket and every subscribed function precede the notification
    // configuration
    let notifications = position(&DeployStep::Notifications(0));
    assert!(position(&DeployStep::Bucket(0)) < notifications);
    for subscription in stack.subscriptions() {
        assert!(position(&DeployStep::Function(subscription.function)) < notifications);
    }

    // One step per resource
    assert_eq!(plan.len(), 6);
}
