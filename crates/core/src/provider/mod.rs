// Provider contract: the capability surface a tool catalog must satisfy

use crate::error::{A2tError, A2tResult};
use crate::meta::MetaResponse;
use crate::query::PageRequest;
use crate::types::{Capabilities, ExecuteResponse, Group, GroupsResponse, ToolsResponse};
use std::future::Future;

mod memory;
mod registry;

pub use memory::{GroupedProvider, SimpleProvider};
pub use registry::ToolRegistry;

/// Parameters passed to a tool, as received in the request body
pub type ToolParams = serde_json::Map<String, serde_json::Value>;

/// What an executor hands back on success
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub result: serde_json::Value,
    /// Catalog-change hint the executor wants delivered with the result
    pub meta: Option<MetaResponse>,
}

impl ToolOutput {
    pub fn new(result: impl Into<serde_json::Value>) -> Self {
        Self {
            result: result.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: MetaResponse) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl From<serde_json::Value> for ToolOutput {
    fn from(result: serde_json::Value) -> Self {
        Self::new(result)
    }
}

/// Failure raised by a tool executor. Always reported to the caller as
/// an `execution_error`, never as a fault.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
}

/// The function behind a registered tool
#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, params: ToolParams) -> Result<ToolOutput, ToolError>;
}

#[async_trait::async_trait]
impl<F, Fut> ToolExecutor for F
where
    F: Fn(ToolParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
{
    async fn execute(&self, params: ToolParams) -> Result<ToolOutput, ToolError> {
        (self)(params).await
    }
}

/// Base tier: capability negotiation, tool listing and execution
#[async_trait::async_trait]
pub trait ToolProvider: Send + Sync {
    /// Capabilities advertised at the well-known path
    fn get_capabilities(&self) -> &Capabilities;

    /// List tools, optionally restricted to one group and filtered by a
    /// search query. An unknown group yields an empty page.
    async fn list_tools(
        &self,
        group_id: Option<&str>,
        query: &str,
        page: PageRequest,
    ) -> A2tResult<ToolsResponse>;

    /// Execute a tool by exact name. Unknown tools and executor failures
    /// come back as error responses, not as `Err`.
    async fn execute_tool(&self, name: &str, params: ToolParams) -> A2tResult<ExecuteResponse>;

    /// Group tier of this provider, if it has one
    fn as_group_provider(&self) -> Option<&dyn GroupProvider> {
        None
    }
}

/// Group tier: hierarchical namespaces on top of the base tier
#[async_trait::async_trait]
pub trait GroupProvider: ToolProvider {
    /// List groups, optionally only the children of `parent_id`
    async fn list_groups(
        &self,
        parent_id: Option<&str>,
        query: &str,
        page: PageRequest,
    ) -> A2tResult<GroupsResponse>;

    async fn get_group(&self, group_id: &str) -> A2tResult<Group>;

    async fn list_group_tools(
        &self,
        group_id: &str,
        query: &str,
        page: PageRequest,
    ) -> A2tResult<ToolsResponse> {
        self.list_tools(Some(group_id), query, page).await
    }

    /// Execute a tool addressed through its group
    async fn execute_group_tool(
        &self,
        group_id: &str,
        name: &str,
        params: ToolParams,
    ) -> A2tResult<ExecuteResponse>;
}

impl dyn ToolProvider {
    /// Runtime capability check for group-tier calls
    pub fn require_groups(&self) -> A2tResult<&dyn GroupProvider> {
        self.as_group_provider()
            .ok_or_else(A2tError::groups_not_supported)
    }
}
