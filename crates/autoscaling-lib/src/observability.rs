//! Structured logging for workflow events
//!
//! Events carry identifiers and binding values as tracing fields. The
//! bearer credential is never logged.

use tracing::{debug, info};

use crate::models::{AutoscalingBinding, OverrideFlags};

/// Structured logger for one configure-autoscaling run
#[derive(Clone)]
pub struct WorkflowLogger {
    app_name: String,
    service_name: String,
}

impl WorkflowLogger {
    pub fn new(app_name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            service_name: service_name.into(),
        }
    }

    /// Log the control-plane lookup result
    pub fn log_binding_resolved(&self, binding_guid: &str, matches: usize) {
        debug!(
            event = "service_binding_resolved",
            app = %self.app_name,
            service = %self.service_name,
            binding_guid = %binding_guid,
            matches = matches,
            "Resolved service binding"
        );
    }

    /// Log the binding as read from the Autoscaling API
    pub fn log_binding_fetched(&self, url: &str, binding: &AutoscalingBinding) {
        debug!(
            event = "autoscaling_binding_fetched",
            app = %self.app_name,
            service = %self.service_name,
            url = %url,
            min_instances = binding.min_instances,
            max_instances = binding.max_instances,
            cpu_min_threshold = binding.cpu_min_threshold,
            cpu_max_threshold = binding.cpu_max_threshold,
            enabled = binding.enabled,
            "Fetched current autoscaling binding"
        );
    }

    pub fn log_overrides(&self, overrides: &OverrideFlags) {
        debug!(
            event = "overrides_applied",
            app = %self.app_name,
            min_instances = ?overrides.min_instances,
            max_instances = ?overrides.max_instances,
            cpu_min_threshold = ?overrides.cpu_min_threshold,
            cpu_max_threshold = ?overrides.cpu_max_threshold,
            "Applied overrides"
        );
    }

    /// Log the binding that was accepted by the Autoscaling API
    pub fn log_binding_submitted(&self, url: &str, binding: &AutoscalingBinding) {
        info!(
            event = "autoscaling_binding_submitted",
            app = %self.app_name,
            service = %self.service_name,
            url = %url,
            app_guid = %binding.app_guid,
            min_instances = binding.min_instances,
            max_instances = binding.max_instances,
            cpu_min_threshold = binding.cpu_min_threshold,
            cpu_max_threshold = binding.cpu_max_threshold,
            enabled = binding.enabled,
            "Autoscaling binding updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_logger_creation() {
        let logger = WorkflowLogger::new("app-name", "service-name");
        assert_eq!(logger.app_name, "app-name");
        assert_eq!(logger.service_name, "service-name");
    }
}
