//! Error types for drift analysis.
//!
//! Only global, non-recoverable conditions are errors. Local conditions
//! (a bad ignore rule, a forbidden resource type) are absorbed and reported
//! as log lines or alerts instead.

use thiserror::Error;

/// Failure of a single enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    /// The provider refused to list the type; recorded as an alert
    #[error("access denied while listing {resource_type}")]
    AccessDenied {
        /// Resource type being listed
        resource_type: String,
    },

    /// Any other failure; aborts the scan
    #[error("listing {resource_type} failed: {message}")]
    Failed {
        /// Resource type being listed
        resource_type: String,
        /// Description of the failure
        message: String,
    },
}

/// Errors that can abort a drift analysis run.
#[derive(Debug, Error)]
pub enum Error {
    /// A middleware failed; the run is aborted before any comparison.
    #[error("middleware {name} failed: {source}")]
    Middleware {
        /// Name of the failing middleware
        name: &'static str,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },

    /// A middleware found resource sets it cannot reconcile
    #[error("cannot reconcile {resource}: {message}")]
    Reconcile {
        /// `type.id` of the offending resource
        resource: String,
        /// What was wrong with it
        message: String,
    },

    /// Enumeration failed for a reason other than access denial
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),

    /// Worker pool could not be created
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Wrap an error raised by the named middleware.
    pub fn middleware(name: &'static str, source: Error) -> Self {
        Error::Middleware {
            name,
            source: Box::new(source),
        }
    }
}

/// Result type for drift analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middleware_error_message() {
        let err = Error::middleware(
            "AwsBucketPolicyExpander",
            Error::Reconcile {
                resource: "aws_s3_bucket.foo".to_string(),
                message: "policy is not a string".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "middleware AwsBucketPolicyExpander failed: cannot reconcile aws_s3_bucket.foo: policy is not a string"
        );
    }

    #[test]
    fn test_middleware_error_source() {
        use std::error::Error as _;

        let err = Error::middleware(
            "Test",
            Error::Reconcile {
                resource: "aws_vpc.vpc-1".to_string(),
                message: "boom".to_string(),
            },
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_enumeration_error_is_transparent() {
        let err: Error = EnumerationError::Failed {
            resource_type: "aws_vpc".to_string(),
            message: "throttled".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "listing aws_vpc failed: throttled");
    }
}
