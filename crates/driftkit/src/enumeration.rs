//! Live resource enumeration
//!
//! Each [`Enumerator`] lists one resource type of one provider. The
//! [`RemoteScanner`] runs them on a rayon pool and only hands back a result
//! once every worker finished, so analysis always sees a complete set.

use crate::alerter::{Alert, Alerter, Alerts};
use crate::error::{EnumerationError, Result};
use crate::resource::{sort_resources, Resource};
use rayon::prelude::*;

/// Lists live resources of a single type.
pub trait Enumerator: Send + Sync {
    /// Provider name, e.g. "aws"
    fn provider(&self) -> &str;

    /// Resource type this enumerator lists
    fn resource_type(&self) -> &str;

    /// List every live resource of the type.
    fn enumerate(&self) -> std::result::Result<Vec<Resource>, EnumerationError>;
}

/// Enumerator over an already collected resource list.
#[derive(Debug, Clone)]
pub struct StaticEnumerator {
    provider: String,
    resource_type: String,
    resources: Vec<Resource>,
    denied: bool,
}

impl StaticEnumerator {
    pub fn new(
        provider: impl Into<String>,
        resource_type: impl Into<String>,
        resources: Vec<Resource>,
    ) -> Self {
        Self {
            provider: provider.into(),
            resource_type: resource_type.into(),
            resources,
            denied: false,
        }
    }

    /// Enumerator whose listing is refused by the provider.
    pub fn denied(provider: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            denied: true,
            ..Self::new(provider, resource_type, Vec::new())
        }
    }
}

impl Enumerator for StaticEnumerator {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn enumerate(&self) -> std::result::Result<Vec<Resource>, EnumerationError> {
        if self.denied {
            return Err(EnumerationError::AccessDenied {
                resource_type: self.resource_type.clone(),
            });
        }
        Ok(self.resources.clone())
    }
}

/// Callback invoked each time an enumerator completes.
///
/// Called from worker threads.
pub trait ScanProgress: Sync {
    fn tick(&self);
}

/// Progress callback that does nothing
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn tick(&self) {}
}

/// Resources and alerts collected by a scan.
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Live resources sorted by `(type, id)`
    pub resources: Vec<Resource>,
    pub alerts: Alerts,
}

/// Runs enumerators in parallel.
#[derive(Default)]
pub struct RemoteScanner {
    enumerators: Vec<Box<dyn Enumerator>>,
    jobs: usize,
}

impl std::fmt::Debug for RemoteScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteScanner")
            .field("enumerators", &self.enumerators.len())
            .field("jobs", &self.jobs)
            .finish()
    }
}

impl RemoteScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of worker threads (0 lets rayon decide).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn add(&mut self, enumerator: Box<dyn Enumerator>) {
        self.enumerators.push(enumerator);
    }

    pub fn len(&self) -> usize {
        self.enumerators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enumerators.is_empty()
    }

    /// Run every enumerator and merge their resources.
    ///
    /// Access denials become alerts; any other enumeration failure aborts
    /// the scan with the first failure in registration order.
    pub fn scan(&self, progress: &dyn ScanProgress) -> Result<ScanOutput> {
        let alerter = Alerter::new();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;

        let results: Vec<_> = pool.install(|| {
            self.enumerators
                .par_iter()
                .map(|enumerator| {
                    let result = run_enumerator(enumerator.as_ref(), &alerter);
                    progress.tick();
                    result
                })
                .collect()
        });

        let mut resources = Vec::new();
        for result in results {
            resources.extend(result?);
        }
        sort_resources(&mut resources);

        let alerts = alerter.into_alerts();
        log::debug!(
            "Scanned {} resources with {} enumerators ({} alerted types)",
            resources.len(),
            self.enumerators.len(),
            alerts.len()
        );
        Ok(ScanOutput { resources, alerts })
    }
}

fn run_enumerator(
    enumerator: &dyn Enumerator,
    alerter: &Alerter,
) -> std::result::Result<Vec<Resource>, EnumerationError> {
    log::debug!(
        "Enumerating {} ({})",
        enumerator.resource_type(),
        enumerator.provider()
    );
    match enumerator.enumerate() {
        Ok(resources) => Ok(resources),
        Err(EnumerationError::AccessDenied { resource_type }) => {
            log::debug!("Listing {resource_type} is forbidden");
            let alert = Alert::access_denied(enumerator.provider(), &resource_type);
            alerter.send_alert(resource_type, alert);
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl ScanProgress for Counter {
        fn tick(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Broken;

    impl Enumerator for Broken {
        fn provider(&self) -> &str {
            "aws"
        }

        fn resource_type(&self) -> &str {
            "aws_instance"
        }

        fn enumerate(&self) -> std::result::Result<Vec<Resource>, EnumerationError> {
            Err(EnumerationError::Failed {
                resource_type: "aws_instance".to_string(),
                message: "throttled".to_string(),
            })
        }
    }

    fn scanner() -> RemoteScanner {
        let mut scanner = RemoteScanner::new().with_jobs(4);
        scanner.add(Box::new(StaticEnumerator::new(
            "aws",
            "aws_vpc",
            vec![Resource::new("aws_vpc", "vpc-2"), Resource::new("aws_vpc", "vpc-1")],
        )));
        scanner.add(Box::new(StaticEnumerator::new(
            "aws",
            "aws_s3_bucket",
            vec![Resource::new("aws_s3_bucket", "logs")],
        )));
        scanner.add(Box::new(StaticEnumerator::denied("aws", "aws_iam_access_key")));
        scanner
    }

    #[test]
    fn test_scan_merges_and_sorts() {
        let output = scanner().scan(&NoProgress).unwrap();
        let keys: Vec<String> = output.resources.iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["aws_s3_bucket.logs", "aws_vpc.vpc-1", "aws_vpc.vpc-2"]);
    }

    #[test]
    fn test_access_denied_becomes_alert() {
        let output = scanner().scan(&NoProgress).unwrap();
        assert_eq!(output.alerts.len(), 1);
        let alerts = &output.alerts["aws_iam_access_key"];
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].should_ignore_resource);
    }

    #[test]
    fn test_progress_ticks_once_per_enumerator() {
        let counter = Counter(AtomicUsize::new(0));
        scanner().scan(&counter).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_other_failures_are_fatal() {
        let mut scanner = scanner();
        scanner.add(Box::new(Broken));
        let err = scanner.scan(&NoProgress).unwrap_err();
        assert!(matches!(
            err,
            Error::Enumeration(EnumerationError::Failed { .. })
        ));
    }

    #[test]
    fn test_empty_scanner() {
        let output = RemoteScanner::new().scan(&NoProgress).unwrap();
        assert!(output.resources.is_empty());
        assert!(output.alerts.is_empty());
    }
}
