//! Session lookups and the per-run workflow context
//!
//! A [`SessionLookups`] implementation answers who is logged in, where the
//! control plane lives and what the app and service instance are. The
//! workflow only sees the resolved [`WorkflowContext`].

mod cf_config;


pub use cf_config::{CfConfig, CfConfigSession, SpaceFields};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::client::JsonClient;

/// Service instance metadata needed by the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceModel {
    pub guid: String,
    pub dashboard_url: String,
}

/// App metadata needed by the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppModel {
    pub guid: String,
}

/// Remote session lookups provided by the host environment
#[async_trait]
pub trait SessionLookups: Send + Sync {
    async fn is_logged_in(&self) -> Result<bool>;

    /// Credential for the `Authorization` header, already carrying its scheme
    async fn access_token(&self) -> Result<String>;

    /// Control-plane API endpoint
    async fn api_endpoint(&self) -> Result<String>;

    async fn get_service(&self, name: &str) -> Result<ServiceModel>;

    async fn get_app(&self, name: &str) -> Result<AppModel>;

    async fn is_ssl_disabled(&self) -> Result<bool>;
}

/// Identifiers and credentials for one configure-autoscaling run
pub struct WorkflowContext<T = reqwest::Client> {
    pub app_name: String,
    pub service_name: String,
    pub app_guid: String,
    pub service_guid: String,
    pub dashboard_url: String,
    pub api_endpoint: String,
    pub client: JsonClient<T>,
}

impl WorkflowContext<reqwest::Client> {
    /// Resolve the context from session lookups
    ///
    /// Lookups run in a fixed order and the first failure ends resolution.
    pub async fn resolve<S>(session: &S, app_name: &str, service_name: &str) -> Result<Self>
    where
        S: SessionLookups + ?Sized,
    {
        if !session.is_logged_in().await? {
            bail!("you need to log in");
        }

        let access_token = session
            .access_token()
            .await
            .context("couldn't get access token")?;

        let service = session
            .get_service(service_name)
            .await
            .with_context(|| format!("couldn't get service named {}", service_name))?;

        let api_endpoint = session
            .api_endpoint()
            .await
            .context("couldn't get API end-point")?;

        let app = session
            .get_app(app_name)
            .await
            .with_context(|| format!("couldn't get app {}", app_name))?;

        let skip_ssl_validation = session
            .is_ssl_disabled()
            .await
            .context("couldn't check if ssl verification is disabled")?;

        let client = JsonClient::new(access_token, skip_ssl_validation)
            .context("couldn't create HTTP client")?;

        Ok(Self {
            app_name: app_name.to_string(),
            service_name: service_name.to_string(),
            app_guid: app.guid,
            service_guid: service.guid,
            dashboard_url: service.dashboard_url,
            api_endpoint,
            client,
        })
    }
}
