//! Resource-set middlewares
//!
//! Middlewares reconcile provider-specific shape mismatches between the live
//! and declared sets before they are compared, e.g. a declared manager whose
//! members only exist as separate live objects. They run strictly in
//! registration order, each seeing the effects of the previous ones, and the
//! first failure aborts the run.

pub mod aws_bucket_policy;
pub mod aws_default_vpc;
pub mod google_instance_group;

pub use aws_bucket_policy::AwsBucketPolicyExpander;
pub use aws_default_vpc::AwsDefaultVpc;
pub use google_instance_group::GoogleComputeInstanceGroupManagerInstances;

use crate::error::{Error, Result};
use crate::resource::Resource;

/// An in-place transform over both resource sets.
///
/// Implementations must be idempotent: running one twice leaves the sets as
/// running it once did.
pub trait Middleware: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Transform the sets in place.
    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()>;
}

/// Ordered list of middlewares.
#[derive(Default)]
pub struct Chain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl Chain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain holding the built-in middlewares in their fixed order.
    pub fn default_chain() -> Self {
        Self::new()
            .with(GoogleComputeInstanceGroupManagerInstances)
            .with(AwsBucketPolicyExpander)
            .with(AwsDefaultVpc)
    }

    /// Append a middleware.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.push(Box::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: Box<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run every middleware in order, stopping at the first failure.
    pub fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        for middleware in &self.middlewares {
            log::debug!("Running middleware {}", middleware.name());
            middleware
                .execute(remote, state)
                .map_err(|e| Error::middleware(middleware.name(), e))?;
        }
        Ok(())
    }
}

/// Whether a resource with the identity of `res` is in `resources`.
pub(crate) fn contains(resources: &[Resource], res: &Resource) -> bool {
    resources.iter().any(|r| r.ty == res.ty && r.id == res.id)
}
