//! configure-autoscaling command

use anyhow::Result;
use autoscaling_lib::{
    configure_autoscaling as run_workflow, CfConfigSession, OverrideFlags, WorkflowContext,
};
use std::path::Path;
use tracing::debug;

use crate::output::{print_binding, print_success, OutputFormat};

/// Reconfigure and enable the Autoscaling binding between an app and a service instance
pub async fn configure_autoscaling(
    cf_home: Option<&Path>,
    app_name: &str,
    service_name: &str,
    overrides: OverrideFlags,
    format: OutputFormat,
) -> Result<()> {
    let session = CfConfigSession::load(cf_home)?;
    let ctx = WorkflowContext::resolve(&session, app_name, service_name).await?;
    debug!(
        app_guid = %ctx.app_guid,
        service_guid = %ctx.service_guid,
        overrides = !overrides.is_empty(),
        "Resolved workflow context"
    );

    let binding = run_workflow(&ctx, &overrides).await?;

    if let OutputFormat::Table = format {
        print_success(&format!(
            "Autoscaling enabled for app {} bound to {}",
            app_name, service_name
        ));
    }
    print_binding(&binding, format)
}
