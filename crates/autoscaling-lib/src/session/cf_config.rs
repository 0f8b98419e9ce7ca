//! Session lookups backed by the Cloud Foundry CLI configuration

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use super::{AppModel, ServiceModel, SessionLookups};
use crate::client::JsonClient;
use crate::models::{Resource, ResourceList, ServiceInstanceEntity};

/// Subset of `.cf/config.json` used for session lookups
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfConfig {
    /// Control-plane API endpoint
    #[serde(default)]
    pub target: String,
    /// Bearer credential, stored with its `bearer ` prefix
    #[serde(default)]
    pub access_token: String,
    #[serde(default, rename = "SSLDisabled")]
    pub ssl_disabled: bool,
    #[serde(default)]
    pub space_fields: SpaceFields,
}

/// Targeted space
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpaceFields {
    #[serde(default, rename = "GUID")]
    pub guid: String,
    #[serde(default, rename = "Name")]
    pub name: String,
}

impl CfConfig {
    /// Load the configuration under `cf_home`, or the home directory
    ///
    /// A missing file yields an empty, logged-out configuration.
    pub fn load(cf_home: Option<&Path>) -> Result<Self> {
        let config_path = Self::config_path(cf_home)?;

        if !config_path.exists() {
            debug!(path = %config_path.display(), "CF config not found");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read CF config {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse CF config {}", config_path.display()))
    }

    /// Get the configuration file path
    pub fn config_path(cf_home: Option<&Path>) -> Result<PathBuf> {
        let home = match cf_home {
            Some(path) => path.to_path_buf(),
            None => dirs_next::home_dir().context("Could not determine home directory")?,
        };
        Ok(home.join(".cf").join("config.json"))
    }
}

/// [`SessionLookups`] over the CF CLI configuration and the v2 control-plane API
pub struct CfConfigSession {
    config: CfConfig,
    client: JsonClient,
}

impl CfConfigSession {
    pub fn new(config: CfConfig) -> Result<Self> {
        let client = JsonClient::new(config.access_token.clone(), config.ssl_disabled)
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub fn load(cf_home: Option<&Path>) -> Result<Self> {
        Self::new(CfConfig::load(cf_home)?)
    }

    /// Query `path` for a resource named `name` in the targeted space
    ///
    /// Returns `None` unless exactly one resource matches.
    async fn find_single<E>(&self, path: &str, name: &str) -> Result<Option<Resource<E>>>
    where
        E: DeserializeOwned + Send,
    {
        let space_guid = &self.config.space_fields.guid;
        if space_guid.is_empty() {
            bail!("no space targeted");
        }

        let mut url = Url::parse(&self.api_endpoint().await?)
            .map_err(|_| anyhow!("invalid API URL from cli: {}", self.config.target))?;
        url.set_path(path);
        url.query_pairs_mut()
            .clear()
            .append_pair("q", &format!("name:{}", name))
            .append_pair("q", &format!("space_guid:{}", space_guid));

        let list: ResourceList<E> = self.client.get(url.as_str()).await?;
        debug!(
            path = %path,
            name = %name,
            space = %self.config.space_fields.name,
            matches = list.resources.len(),
            "Looked up resource"
        );

        let mut resources = list.resources;
        if resources.len() != 1 {
            return Ok(None);
        }
        Ok(resources.pop())
    }
}

#[async_trait]
impl SessionLookups for CfConfigSession {
    async fn is_logged_in(&self) -> Result<bool> {
        Ok(!self.config.access_token.is_empty())
    }

    async fn access_token(&self) -> Result<String> {
        if self.config.access_token.is_empty() {
            bail!("no access token in CF config");
        }
        Ok(self.config.access_token.clone())
    }

    async fn api_endpoint(&self) -> Result<String> {
        if self.config.target.is_empty() {
            bail!("no API endpoint targeted");
        }
        Ok(self.config.target.clone())
    }

    async fn get_service(&self, name: &str) -> Result<ServiceModel> {
        let resource = self
            .find_single::<ServiceInstanceEntity>("/v2/service_instances", name)
            .await?
            .ok_or_else(|| anyhow!("service instance {} not found", name))?;

        let dashboard_url = resource
            .entity
            .and_then(|entity| entity.dashboard_url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow!("service instance {} has no dashboard URL", name))?;

        Ok(ServiceModel {
            guid: resource.metadata.guid,
            dashboard_url,
        })
    }

    async fn get_app(&self, name: &str) -> Result<AppModel> {
        let resource = self
            .find_single::<serde::de::IgnoredAny>("/v2/apps", name)
            .await?
            .ok_or_else(|| anyhow!("app {} not found", name))?;

        Ok(AppModel {
            guid: resource.metadata.guid,
        })
    }

    async fn is_ssl_disabled(&self) -> Result<bool> {
        Ok(self.config.ssl_disabled)
    }
}
