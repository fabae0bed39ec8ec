use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::resources::policy::PolicyStatement;

/// A declared compute unit: configuration only, the handler code itself is
/// opaque to the orchestration layer.
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    /// Directory holding the function source; `AwsCloud` uploads
    /// `<entry>/bundle.zip`.
    pub entry: String,
    pub handler: String,
    pub runtime: LambdaRuntime,
    pub timeout: Duration,
    /// Indices into the stack's layer table.
    pub layers: Vec<usize>,
    pub environment: BTreeMap<String, String>,
    /// Grants attached to this function's execution identity.
    pub policies: Vec<PolicyStatement>,
    /// Key prefixes this function writes under, per bucket. These are the
    /// explicit data-flow edges the trigger-cycle check runs over.
    pub writes: Vec<WriteDeclaration>,
}

/// Declared write target: `(bucket index, key prefix)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteDeclaration {
    pub bucket: usize,
    pub prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LambdaRuntime {
    Python311,
    Python312,
}

impl LambdaRuntime {
    pub fn as_str(self) -> &'static str {
        match self {
            LambdaRuntime::Python311 => "python3.11",
            LambdaRuntime::Python312 => "python3.12",
        }
    }
}

impl Function {
    /// Flat set of actions granted to this function, in declaration order.
    pub fn granted_actions(&self) -> Vec<&str> {
        self.policies
            .iter()
            .filter(|p| p.effect == crate::resources::policy::Effect::Allow)
            .flat_map(|p| p.actions.iter().map(String::as_str))
            .collect()
    }

    pub fn holds_grant(&self, action: &str) -> bool {
        self.policies.iter().any(|p| p.grants(action))
    }

    /// True when some attached statement grants `action` on `resource`.
    pub fn holds_grant_on(&self, action: &str, resource: &str) -> bool {
        self.policies.iter().any(|p| p.grants_on(action, resource))
    }
}
