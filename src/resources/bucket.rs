use serde::Serialize;

/// An object-storage container, encrypted at rest, partitioned by key
/// prefix into pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub encryption: BucketEncryption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BucketEncryption {
    /// SSE-S3 (AES-256), the mode the lab bucket uses.
    S3Managed,
    /// SSE-KMS with the account default key.
    KmsManaged,
}

impl BucketEncryption {
    pub fn sse_algorithm(self) -> &'static str {
        match self {
            BucketEncryption::S3Managed => "AES256",
            BucketEncryption::KmsManaged => "aws:kms",
        }
    }
}

impl Bucket {
    pub fn arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.name)
    }

    /// ARN pattern covering every object in the bucket.
    pub fn objects_arn(&self) -> String {
        format!("arn:aws:s3:::{}/*", self.name)
    }
}
