//! Instance groups created by a managed instance group manager
//!
//! Declaring a `google_compute_instance_group_manager` makes the provider
//! create instance groups that never appear in state. Matching live groups
//! are imported into the state set by name so they are not reported as
//! unmanaged.

use super::{contains, Middleware};
use crate::error::Result;
use crate::resource::Resource;
use crate::schema::metadata::{GOOGLE_COMPUTE_INSTANCE_GROUP, GOOGLE_COMPUTE_INSTANCE_GROUP_MANAGER};

pub struct GoogleComputeInstanceGroupManagerInstances;

impl Middleware for GoogleComputeInstanceGroupManagerInstances {
    fn name(&self) -> &'static str {
        "GoogleComputeInstanceGroupManagerInstances"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let groups: Vec<&Resource> = remote
            .iter()
            .filter(|r| r.ty() == GOOGLE_COMPUTE_INSTANCE_GROUP)
            .collect();

        let mut imported: Vec<Resource> = Vec::new();
        for manager in state
            .iter()
            .filter(|r| r.ty() == GOOGLE_COMPUTE_INSTANCE_GROUP_MANAGER)
        {
            let Some(name) = manager.attributes().get_string(&["name"]) else {
                continue;
            };

            for group in &groups {
                if group.attributes().get_string(&["name"]) != Some(name) {
                    continue;
                }
                if contains(state, group) || contains(&imported, group) {
                    continue;
                }
                log::debug!("Importing {group} managed by {manager} into state");
                imported.push((*group).clone());
            }
        }

        state.extend(imported);
        Ok(())
    }
}
