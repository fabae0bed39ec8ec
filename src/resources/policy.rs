use serde::Serialize;
use serde_json::{Value, json};

use crate::resources::bucket::Bucket;

/// Action granting invocation of provider-managed foundation models.
pub const BEDROCK_INVOKE_MODEL: &str = "bedrock:InvokeModel";

/// Action granting text-to-speech synthesis.
pub const POLLY_SYNTHESIZE_SPEECH: &str = "polly:SynthesizeSpeech";

/// A least-privilege grant attached to exactly one function's execution
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: &[&str]) -> Self {
        Self {
            effect: Effect::Allow,
            actions: actions.iter().map(|a| (*a).to_string()).collect(),
            resources: resources.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    /// Model invocation. Resource scope `*`: provider-managed model APIs
    /// carry no resource-level restriction.
    pub fn invoke_model() -> Self {
        Self::allow(&[BEDROCK_INVOKE_MODEL], &["*"])
    }

    /// Speech synthesis, same broad resource scope as `invoke_model`.
    pub fn synthesize_speech() -> Self {
        Self::allow(&[POLLY_SYNTHESIZE_SPEECH], &["*"])
    }

    /// Read/write access to one bucket and its objects. Storage access is
    /// always granted explicitly, never inferred from a subscription.
    pub fn bucket_read_write(bucket: &Bucket) -> Self {
        Self::allow(
            &[
                "s3:GetObject",
                "s3:PutObject",
                "s3:DeleteObject",
                "s3:ListBucket",
            ],
            &[&bucket.arn(), &bucket.objects_arn()],
        )
    }

    /// True when the statement grants `action`.
    pub fn grants(&self, action: &str) -> bool {
        self.effect == Effect::Allow && self.actions.iter().any(|a| a == action)
    }

    /// True when the statement grants `action` on `resource`, either by
    /// exact ARN or the `*` wildcard.
    pub fn grants_on(&self, action: &str, resource: &str) -> bool {
        self.grants(action) && self.resources.iter().any(|r| r == resource || r == "*")
    }

    /// IAM policy-document form of the statement.
    pub fn to_json(&self) -> Value {
        json!({
            "Effect": self.effect.as_str(),
            "Action": &self.actions,
            "Resource": &self.resources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::bucket::BucketEncryption;

    #[test]
    fn capability_grants_are_minimal() {
        let invoke = PolicyStatement::invoke_model();
        assert_eq!(invoke.actions, vec![BEDROCK_INVOKE_MODEL]);
        assert_eq!(invoke.resources, vec!["*"]);

        let speech = PolicyStatement::synthesize_speech();
        assert_eq!(speech.actions, vec![POLLY_SYNTHESIZE_SPEECH]);
        assert!(speech.grants(POLLY_SYNTHESIZE_SPEECH));
        assert!(!speech.grants(BEDROCK_INVOKE_MODEL));
    }

    #[test]
    fn bucket_grant_is_scoped_to_the_bucket() {
        let bucket = Bucket {
            name: "acct-gen-ai-bedrock-lab".to_string(),
            encryption: BucketEncryption::S3Managed,
        };
        let grant = PolicyStatement::bucket_read_write(&bucket);
        assert_eq!(
            grant.resources,
            vec![
                "arn:aws:s3:::acct-gen-ai-bedrock-lab",
                "arn:aws:s3:::acct-gen-ai-bedrock-lab/*",
            ]
        );
        assert!(grant.grants_on("s3:GetObject", &bucket.arn()));
        assert!(!grant.grants_on("s3:GetObject", "arn:aws:s3:::some-other-bucket"));
    }

    #[test]
    fn wildcard_resource_grants_on_anything() {
        let invoke = PolicyStatement::invoke_model();
        assert!(invoke.grants_on(BEDROCK_INVOKE_MODEL, "arn:aws:s3:::any-bucket"));
        assert!(!invoke.grants_on("s3:GetObject", "arn:aws:s3:::any-bucket"));
    }
}
