use a2t_core::types::{Capabilities, LimitsConfig, DEFAULT_GROUPS_PATH, DEFAULT_TOOLS_PATH};
use a2t_core::ToolProvider;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_tools_path")]
    pub tools: String,

    #[serde(default = "default_groups_path")]
    pub groups: String,
}

fn default_tools_path() -> String {
    DEFAULT_TOOLS_PATH.to_string()
}

fn default_groups_path() -> String {
    DEFAULT_GROUPS_PATH.to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            tools: default_tools_path(),
            groups: default_groups_path(),
        }
    }
}

/// Feature overrides. Unset values keep what the provider declares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub search: Option<bool>,

    #[serde(default)]
    pub dynamic_tools: Option<bool>,
}

/// Page sizes used when a list request carries no `limit`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_tool_limit")]
    pub default_tool_limit: usize,

    #[serde(default = "default_group_limit")]
    pub default_group_limit: usize,
}

fn default_tool_limit() -> usize {
    100
}

fn default_group_limit() -> usize {
    50
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_tool_limit: default_tool_limit(),
            default_group_limit: default_group_limit(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        let config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")?
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Self::default()
        };

        config.validate()?;

        Ok(config)
    }

    /// Check that endpoint paths can be mounted
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("endpoints.tools", &self.endpoints.tools),
            ("endpoints.groups", &self.endpoints.groups),
        ] {
            if !path.starts_with('/') || path.len() < 2 {
                bail!("{} must be an absolute path like \"/tools\", got {:?}", name, path);
            }
            if path.ends_with('/') || path.contains('{') || path.contains('}') {
                bail!("{} must not end with '/' or contain route parameters: {:?}", name, path);
            }
        }

        if self.endpoints.tools == self.endpoints.groups {
            bail!("endpoints.tools and endpoints.groups must differ");
        }

        Ok(())
    }

    /// Overlay this configuration onto a provider's capabilities
    pub fn apply(&self, capabilities: Capabilities) -> Capabilities {
        let mut capabilities = capabilities.with_tools_path(&self.endpoints.tools);

        if capabilities.features.groups {
            capabilities = capabilities.with_groups(&self.endpoints.groups);
        }
        if let Some(search) = self.features.search {
            capabilities.features.search = search;
        }
        if let Some(dynamic_tools) = self.features.dynamic_tools {
            capabilities.features.dynamic_tools = dynamic_tools;
        }
        if self.limits != LimitsConfig::default() {
            capabilities = capabilities.with_limits(self.limits);
        }

        capabilities
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ToolProvider>,
    pub listing: ListingConfig,
}

impl AppState {
    pub fn new(provider: Arc<dyn ToolProvider>, listing: ListingConfig) -> Self {
        Self { provider, listing }
    }
}
