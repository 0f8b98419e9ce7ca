//! Binding configuration workflow
//!
//! One run performs three sequential calls:
//! 1. resolve the service binding GUID on the control plane
//! 2. read the current binding from the Autoscaling API
//! 3. write the updated binding back, after overrides and validation

#[cfg(test)]
mod tests;

use url::Url;

use crate::client::HttpTransport;
use crate::error::{Hop, WorkflowError};
use crate::models::{AutoscalingBinding, OverrideFlags, ServiceBindingQueryResult};
use crate::observability::WorkflowLogger;
use crate::session::WorkflowContext;

/// Control-plane query for the binding between an app and a service instance
pub fn service_bindings_url(
    api_endpoint: &str,
    app_guid: &str,
    service_instance_guid: &str,
) -> Result<String, WorkflowError> {
    let mut url = Url::parse(api_endpoint)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .ok_or_else(|| WorkflowError::InvalidApiEndpoint(api_endpoint.to_string()))?;

    url.set_path("/v2/service_bindings");
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("q", &format!("app_guid:{}", app_guid))
        .append_pair("q", &format!("service_instance_guid:{}", service_instance_guid));

    Ok(url.into())
}

/// Autoscaling API URL for a binding, rooted at the dashboard's scheme and host
pub fn autoscaling_binding_url(dashboard_url: &str, binding_guid: &str) -> Result<String, WorkflowError> {
    let mut url = Url::parse(dashboard_url)
        .ok()
        .filter(Url::has_host)
        .ok_or_else(|| WorkflowError::InvalidDashboardUrl(dashboard_url.to_string()))?;

    // Only scheme and host (with port) are kept
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_query(None);
    url.set_fragment(None);
    url.set_path(&format!("/api/bindings/{}", binding_guid));

    Ok(url.into())
}

/// Look up the GUID of the single binding between the context's app and service
pub async fn resolve_binding_guid<T: HttpTransport>(
    ctx: &WorkflowContext<T>,
) -> Result<String, WorkflowError> {
    let url = service_bindings_url(&ctx.api_endpoint, &ctx.app_guid, &ctx.service_guid)?;

    let result: ServiceBindingQueryResult = ctx
        .client
        .get(&url)
        .await
        .map_err(WorkflowError::remote(Hop::ServiceBinding))?;

    match <[_; 1]>::try_from(result.resources) {
        Ok([binding]) => Ok(binding.metadata.guid),
        Err(resources) => Err(WorkflowError::BindingResolution {
            app_name: ctx.app_name.clone(),
            service_name: ctx.service_name.clone(),
            matches: resources.len(),
        }),
    }
}

/// Apply `overrides` to the app's Autoscaling binding and re-enable it
///
/// Nothing is written unless both `min <= max` invariants hold after the
/// overrides. Returns the binding as submitted.
pub async fn configure_autoscaling<T: HttpTransport>(
    ctx: &WorkflowContext<T>,
    overrides: &OverrideFlags,
) -> Result<AutoscalingBinding, WorkflowError> {
    let logger = WorkflowLogger::new(&ctx.app_name, &ctx.service_name);

    let binding_guid = resolve_binding_guid(ctx).await?;
    logger.log_binding_resolved(&binding_guid, 1);

    let url = autoscaling_binding_url(&ctx.dashboard_url, &binding_guid)?;

    let mut binding: AutoscalingBinding = ctx
        .client
        .get(&url)
        .await
        .map_err(WorkflowError::remote(Hop::AutoscalingApi))?;
    logger.log_binding_fetched(&url, &binding);

    overrides.apply(&mut binding);
    logger.log_overrides(overrides);

    binding.validate()?;

    // Reads do not echo the app GUID; configuring always (re)enables
    binding.app_guid = ctx.app_guid.clone();
    binding.enabled = true;

    ctx.client
        .post(&url, &binding)
        .await
        .map_err(WorkflowError::remote(Hop::AutoscalingApi))?;
    logger.log_binding_submitted(&url, &binding);

    Ok(binding)
}
