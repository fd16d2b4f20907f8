//! Default VPCs
//!
//! AWS creates a default VPC in every region. Unless it is declared, it is
//! not drift and is dropped from the live set.

use super::Middleware;
use crate::error::Result;
use crate::resource::{Resource, ResourceKey};
use crate::schema::metadata::AWS_VPC;
use std::collections::HashSet;

pub struct AwsDefaultVpc;

impl Middleware for AwsDefaultVpc {
    fn name(&self) -> &'static str {
        "AwsDefaultVpc"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let declared: HashSet<ResourceKey> = state
            .iter()
            .filter(|r| r.ty() == AWS_VPC)
            .map(Resource::key)
            .collect();

        remote.retain(|res| {
            let is_default = res.ty() == AWS_VPC
                && res.attributes().get_bool(&["is_default"]) == Some(true)
                && !declared.contains(&res.key());
            if is_default {
                log::debug!("Ignoring default VPC {res}");
            }
            !is_default
        });
        Ok(())
    }
}
