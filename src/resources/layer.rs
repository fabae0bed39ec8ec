use serde::Serialize;

use crate::resources::function::LambdaRuntime;

/// A shared dependency layer attachable to multiple functions (the
/// Bedrock SDK bundle in the lab stack).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerVersion {
    pub name: String,
    /// Directory holding the layer content; `AwsCloud` uploads
    /// `<entry>/bundle.zip`.
    pub entry: String,
    pub compatible_runtimes: Vec<LambdaRuntime>,
}

impl LayerVersion {
    pub fn is_compatible_with(&self, runtime: LambdaRuntime) -> bool {
        self.compatible_runtimes.contains(&runtime)
    }
}
