//! Wire and domain types shared across the crate

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Autoscaling policy attached to one app/service binding
///
/// Field names are the Autoscaling API wire contract. The API does not echo
/// `app_guid` back on reads, so it defaults to empty when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalingBinding {
    #[serde(default)]
    pub app_guid: String,
    pub min_instances: u32,
    pub max_instances: u32,
    pub cpu_min_threshold: u32,
    pub cpu_max_threshold: u32,
    #[serde(default)]
    pub enabled: bool,
}

impl AutoscalingBinding {
    /// Check `min <= max` for the instance count and the CPU threshold pairs
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.min_instances > self.max_instances {
            return Err(WorkflowError::InstanceRange {
                min: self.min_instances,
                max: self.max_instances,
            });
        }

        if self.cpu_min_threshold > self.cpu_max_threshold {
            return Err(WorkflowError::ThresholdRange {
                min: self.cpu_min_threshold,
                max: self.cpu_max_threshold,
            });
        }

        Ok(())
    }
}

/// Requested changes to an [`AutoscalingBinding`]; `None` keeps the current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideFlags {
    pub min_instances: Option<u32>,
    pub max_instances: Option<u32>,
    pub cpu_min_threshold: Option<u32>,
    pub cpu_max_threshold: Option<u32>,
}

impl OverrideFlags {
    /// Build overrides from command-line flag values, where `0` means "not set"
    pub fn from_flag_values(
        min_instances: u32,
        max_instances: u32,
        cpu_min_threshold: u32,
        cpu_max_threshold: u32,
    ) -> Self {
        fn non_zero(value: u32) -> Option<u32> {
            (value != 0).then_some(value)
        }

        Self {
            min_instances: non_zero(min_instances),
            max_instances: non_zero(max_instances),
            cpu_min_threshold: non_zero(cpu_min_threshold),
            cpu_max_threshold: non_zero(cpu_max_threshold),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite each field of `binding` that has an override
    pub fn apply(&self, binding: &mut AutoscalingBinding) {
        if let Some(value) = self.min_instances {
            binding.min_instances = value;
        }
        if let Some(value) = self.max_instances {
            binding.max_instances = value;
        }
        if let Some(value) = self.cpu_min_threshold {
            binding.cpu_min_threshold = value;
        }
        if let Some(value) = self.cpu_max_threshold {
            binding.cpu_max_threshold = value;
        }
    }
}

/// Paged resource list returned by the control plane's v2 API
///
/// Accepts both the capitalized and the lowercase key spelling.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList<E = serde::de::IgnoredAny> {
    #[serde(rename = "Resources", alias = "resources")]
    pub resources: Vec<Resource<E>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource<E = serde::de::IgnoredAny> {
    #[serde(rename = "Metadata", alias = "metadata")]
    pub metadata: ResourceMetadata,
    #[serde(rename = "Entity", alias = "entity")]
    pub entity: Option<E>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceMetadata {
    #[serde(rename = "GUID", alias = "guid")]
    pub guid: String,
}

/// Result of `GET /v2/service_bindings`
pub type ServiceBindingQueryResult = ResourceList;

/// Entity fields of a `/v2/service_instances` resource
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInstanceEntity {
    #[serde(default)]
    pub dashboard_url: Option<String>,
}
