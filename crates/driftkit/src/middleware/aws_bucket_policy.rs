//! Inline S3 bucket policies
//!
//! A bucket may carry its policy inline in state while the live side lists
//! bucket policies as standalone `aws_s3_bucket_policy` resources. The inline
//! policy is moved into a standalone resource in the state set. Live buckets
//! may echo the same policy inline, so it is stripped from them too.

use super::{contains, Middleware};
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::schema::metadata::{AWS_S3_BUCKET, AWS_S3_BUCKET_POLICY};
use serde_json::Value;

pub struct AwsBucketPolicyExpander;

impl Middleware for AwsBucketPolicyExpander {
    fn name(&self) -> &'static str {
        "AwsBucketPolicyExpander"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        // Already reported through the standalone policy resource.
        for bucket in remote.iter_mut().filter(|r| r.ty() == AWS_S3_BUCKET) {
            if bucket.attributes_mut().remove(&["policy"]).is_some() {
                log::debug!("Stripped inline policy from live {bucket}");
            }
        }

        let mut expanded = Vec::new();

        for bucket in state.iter_mut().filter(|r| r.ty() == AWS_S3_BUCKET) {
            let policy = match bucket.attributes().get(&["policy"]) {
                None => continue,
                Some(Value::String(policy)) => policy.clone(),
                Some(other) => {
                    return Err(Error::Reconcile {
                        resource: bucket.to_string(),
                        message: format!("policy must be a JSON string, got {other}"),
                    });
                }
            };
            bucket.attributes_mut().remove(&["policy"]);
            if policy.is_empty() {
                continue;
            }

            let mut bucket_policy = Resource::new(AWS_S3_BUCKET_POLICY, bucket.id());
            bucket_policy
                .attributes_mut()
                .set(&["bucket"], Value::String(bucket.id().to_string()));
            bucket_policy
                .attributes_mut()
                .set(&["policy"], Value::String(policy));
            expanded.push(bucket_policy);
        }

        for bucket_policy in expanded {
            if contains(state, &bucket_policy) {
                log::debug!("{bucket_policy} already declared, keeping the declared one");
                continue;
            }
            log::debug!("Expanding inline policy into {bucket_policy}");
            state.push(bucket_policy);
        }
        Ok(())
    }
}
