//! Non-fatal alerts raised while collecting resources
//!
//! Enumeration runs in parallel, so the [`Alerter`] accepts alerts from any
//! thread. It is finalized into a plain [`Alerts`] map before analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Alerts keyed by resource type.
pub type Alerts = BTreeMap<String, Vec<Alert>>;

/// A partial-failure notice attached to the analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Human-readable message
    pub message: String,
    /// Resources of the alerted type must not be reported as deleted
    #[serde(skip)]
    pub should_ignore_resource: bool,
}

impl Alert {
    /// Informational alert that does not change how resources are reported.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            should_ignore_resource: false,
        }
    }

    /// Listing `resource_type` was refused by the provider.
    pub fn access_denied(provider: &str, resource_type: &str) -> Self {
        Self {
            message: format!(
                "Ignoring {resource_type} from drift calculation: Listing {resource_type} is forbidden ({provider})."
            ),
            should_ignore_resource: true,
        }
    }
}

/// Thread-safe alert accumulator.
#[derive(Debug, Default)]
pub struct Alerter {
    alerts: Mutex<Alerts>,
}

impl Alerter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an alert under `key`.
    pub fn send_alert(&self, key: impl Into<String>, alert: Alert) {
        let key = key.into();
        log::debug!("Alert for {key}: {}", alert.message);
        // A poisoned lock still holds every alert pushed so far.
        let mut alerts = self
            .alerts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        alerts.entry(key).or_default().push(alert);
    }

    /// Finish accumulation and hand the alerts over.
    pub fn into_alerts(self) -> Alerts {
        self.alerts
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Whether resources of `ty` must be kept out of the deleted set.
pub fn should_ignore_type(alerts: &Alerts, ty: &str) -> bool {
    alerts
        .get(ty)
        .is_some_and(|list| list.iter().any(|a| a.should_ignore_resource))
}
