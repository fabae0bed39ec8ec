//! Resource naming rules.
//!
//! Two jobs live here: validating the names declarations carry (Lambda and
//! S3 impose different charsets) and deriving deterministic identifiers so
//! repeated synthesis of the same declarations produces identical output.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Fixed suffix of the lab bucket; the full name is account-scoped.
pub const BUCKET_SUFFIX: &str = "gen-ai-bedrock-lab";

static FUNCTION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid regex"));

static BUCKET_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid regex"));

/// Name of the result bucket for a given account.
pub fn lab_bucket_name(account_id: &str) -> String {
    format!("{account_id}-{BUCKET_SUFFIX}")
}

pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME_RE.is_match(name)
}

pub fn is_valid_bucket_name(name: &str) -> bool {
    BUCKET_NAME_RE.is_match(name)
}

/// Logical template identifier for a resource.
///
/// PascalCased resource name plus the first eight hex characters of
/// `sha256("{stack}/{resource}")`. Stable across synthesis runs for the
/// same stack and resource names.
pub fn logical_id(stack_name: &str, resource_name: &str) -> String {
    let digest = Sha256::digest(format!("{stack_name}/{resource_name}").as_bytes());
    format!("{}{}", pascal_case(resource_name), &hex::encode(digest)[..8])
}

fn pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_name_is_account_scoped() {
        assert_eq!(
            lab_bucket_name("123456789012"),
            "123456789012-gen-ai-bedrock-lab"
        );
    }

    #[test]
    fn logical_id_is_deterministic() {
        let a = logical_id("gen-ai-bedrock", "bedrock-summarise-text");
        let b = logical_id("gen-ai-bedrock", "bedrock-summarise-text");
        assert_eq!(a, b);
        assert!(a.starts_with("BedrockSummariseText"));
    }

    #[test]
    fn logical_id_differs_per_stack() {
        let a = logical_id("stack-one", "result-bucket");
        let b = logical_id("stack-two", "result-bucket");
        assert_ne!(a, b);
    }

    #[test]
    fn function_name_rules() {
        assert!(is_valid_function_name("bedrock-reply-to-complaint"));
        assert!(!is_valid_function_name(""));
        assert!(!is_valid_function_name("has spaces"));
        assert!(!is_valid_function_name(&"x".repeat(65)));
    }

    #[test]
    fn bucket_name_rules() {
        assert!(is_valid_bucket_name("123456789012-gen-ai-bedrock-lab"));
        assert!(!is_valid_bucket_name("UPPER-case"));
        assert!(!is_valid_bucket_name("ab"));
        assert!(!is_valid_bucket_name("-leading-hyphen"));
    }
}
