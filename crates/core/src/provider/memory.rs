// In-memory reference providers

use super::{GroupProvider, ToolExecutor, ToolParams, ToolProvider, ToolRegistry};
use crate::error::{A2tError, A2tResult, ErrorCode};
use crate::query::{filter_and_paginate, PageRequest};
use crate::types::{Capabilities, ExecuteResponse, Group, GroupsResponse, Tool, ToolsResponse};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Base-tier provider backed by a `ToolRegistry`
pub struct SimpleProvider {
    capabilities: Capabilities,
    registry: ToolRegistry,
}

impl SimpleProvider {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            registry: ToolRegistry::new(),
        }
    }

    /// Register a tool with the function that runs it
    pub fn register_tool<E>(&self, tool: Tool, executor: E) -> A2tResult<()>
    where
        E: ToolExecutor + 'static,
    {
        self.registry.register_tool(tool, Arc::new(executor))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    fn list(&self, group_id: Option<&str>, query: &str, page: PageRequest) -> ToolsResponse {
        let result = filter_and_paginate(
            self.registry.tools(),
            |tool: &Tool| group_id.map_or(true, |id| tool.in_group(id)),
            query,
            page,
        );

        tracing::debug!(
            "Listed tools (group: {:?}, query: {:?}): {} of {}",
            group_id,
            query,
            result.items.len(),
            result.total
        );

        ToolsResponse {
            tools: result.items,
            total: result.total,
            offset: page.offset,
            limit: page.limit,
        }
    }

    async fn execute(&self, name: &str, params: ToolParams) -> ExecuteResponse {
        let Some((_, executor)) = self.registry.resolve(name) else {
            tracing::debug!("Execute requested for unknown tool {}", name);
            return error_response(A2tError::ToolNotFound(name.to_string()));
        };

        run_executor(&self.capabilities, name, executor, params).await
    }
}

#[async_trait::async_trait]
impl ToolProvider for SimpleProvider {
    fn get_capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn list_tools(
        &self,
        group_id: Option<&str>,
        query: &str,
        page: PageRequest,
    ) -> A2tResult<ToolsResponse> {
        Ok(self.list(group_id.filter(|id| !id.is_empty()), query, page))
    }

    async fn execute_tool(&self, name: &str, params: ToolParams) -> A2tResult<ExecuteResponse> {
        Ok(self.execute(name, params).await)
    }
}

/// Provider with group support layered over `SimpleProvider`
pub struct GroupedProvider {
    inner: SimpleProvider,
}

impl GroupedProvider {
    /// Create a provider; the groups feature is switched on if the given
    /// capabilities do not already declare it.
    pub fn new(capabilities: Capabilities) -> Self {
        let capabilities = if capabilities.features.groups {
            capabilities
        } else {
            let endpoint = capabilities.endpoints.groups.clone().unwrap_or_default();
            capabilities.with_groups(endpoint)
        };

        Self {
            inner: SimpleProvider::new(capabilities),
        }
    }

    pub fn register_tool<E>(&self, tool: Tool, executor: E) -> A2tResult<()>
    where
        E: ToolExecutor + 'static,
    {
        self.inner.register_tool(tool, executor)
    }

    pub fn register_group(&self, group: Group) -> A2tResult<()> {
        self.inner.registry.register_group(group)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.inner.registry
    }
}

#[async_trait::async_trait]
impl ToolProvider for GroupedProvider {
    fn get_capabilities(&self) -> &Capabilities {
        self.inner.get_capabilities()
    }

    async fn list_tools(
        &self,
        group_id: Option<&str>,
        query: &str,
        page: PageRequest,
    ) -> A2tResult<ToolsResponse> {
        self.inner.list_tools(group_id, query, page).await
    }

    async fn execute_tool(&self, name: &str, params: ToolParams) -> A2tResult<ExecuteResponse> {
        self.inner.execute_tool(name, params).await
    }

    fn as_group_provider(&self) -> Option<&dyn GroupProvider> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl GroupProvider for GroupedProvider {
    async fn list_groups(
        &self,
        parent_id: Option<&str>,
        query: &str,
        page: PageRequest,
    ) -> A2tResult<GroupsResponse> {
        let parent_id = parent_id.filter(|id| !id.is_empty());
        let result = filter_and_paginate(
            self.inner.registry.groups(),
            |group: &Group| parent_id.map_or(true, |id| group.is_child_of(id)),
            query,
            page,
        );

        tracing::debug!(
            "Listed groups (parent: {:?}, query: {:?}): {} of {}",
            parent_id,
            query,
            result.items.len(),
            result.total
        );

        Ok(GroupsResponse {
            groups: result.items,
            total: result.total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn get_group(&self, group_id: &str) -> A2tResult<Group> {
        self.inner
            .registry
            .get_group(group_id)
            .ok_or_else(|| A2tError::GroupNotFound(group_id.to_string()))
    }

    async fn execute_group_tool(
        &self,
        group_id: &str,
        name: &str,
        params: ToolParams,
    ) -> A2tResult<ExecuteResponse> {
        if !self.inner.registry.contains_group(group_id) {
            return Ok(error_response(A2tError::GroupNotFound(
                group_id.to_string(),
            )));
        }

        let member = self
            .inner
            .registry
            .get_tool(name)
            .is_some_and(|tool| tool.in_group(group_id));
        if !member {
            tracing::debug!("Tool {} is not in group {}", name, group_id);
            return Ok(ExecuteResponse::failure(
                ErrorCode::ToolNotFound,
                format!("Tool not found in group {}: {}", group_id, name),
            ));
        }

        Ok(self.inner.execute(name, params).await)
    }
}

fn error_response(err: A2tError) -> ExecuteResponse {
    ExecuteResponse::failure(err.code(), err.to_string())
}

/// Run an executor, converting every failure (including a panic) into an
/// `execution_error` response.
async fn run_executor(
    capabilities: &Capabilities,
    name: &str,
    executor: Arc<dyn ToolExecutor>,
    params: ToolParams,
) -> ExecuteResponse {
    tracing::debug!("Executing tool {}", name);

    let outcome = AssertUnwindSafe(executor.execute(params)).catch_unwind().await;

    match outcome {
        Ok(Ok(output)) => {
            let response = ExecuteResponse::success(output.result);
            match output.meta {
                Some(meta) if capabilities.features.dynamic_tools => response.with_meta(meta),
                Some(meta) => {
                    tracing::warn!(
                        "Dropping {} meta from tool {}: dynamic tools are disabled",
                        meta.tag(),
                        name
                    );
                    response
                }
                None => response,
            }
        }
        Ok(Err(err)) => {
            tracing::warn!("Tool {} failed: {}", name, err);
            ExecuteResponse::failure(ErrorCode::ExecutionError, err.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::warn!("Tool {} panicked: {}", name, message);
            ExecuteResponse::failure(ErrorCode::ExecutionError, message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaResponse;
    use crate::provider::{ToolError, ToolOutput};
    use serde_json::json;
    use std::time::Duration;

    fn number(params: &ToolParams, key: &str) -> f64 {
        params.get(key).and_then(|v| v.as_f64()).unwrap_or_default()
    }

    fn advanced_provider(capabilities: Capabilities) -> GroupedProvider {
        let provider = GroupedProvider::new(capabilities);

        provider
            .register_group(Group::new("math", "Mathematics", "Mathematical operations"))
            .unwrap();
        provider
            .register_group(Group::new(
                "string",
                "String Operations",
                "Tools for manipulating strings",
            ))
            .unwrap();
        provider
            .register_group(
                Group::new("trig", "Trigonometry", "Angles and triangles").with_parent("math"),
            )
            .unwrap();

        provider
            .register_tool(
                Tool::new("add", "Add two numbers")
                    .with_property("a", "number", "First number", true)
                    .with_property("b", "number", "Second number", true)
                    .with_group("math"),
                |params: ToolParams| async move {
                    Ok::<_, ToolError>(ToolOutput::new(number(&params, "a") + number(&params, "b")))
                },
            )
            .unwrap();
        provider
            .register_tool(
                Tool::new("uppercase", "Convert text to uppercase")
                    .with_property("text", "string", "Text to convert", true)
                    .with_group("string"),
                |params: ToolParams| async move {
                    let text = params.get("text").and_then(|v| v.as_str()).unwrap_or_default();
                    Ok::<_, ToolError>(ToolOutput::new(text.to_uppercase()))
                },
            )
            .unwrap();
        provider
            .register_tool(
                Tool::new("discover", "Discover additional math tools").with_group("math"),
                |_params: ToolParams| async move {
                    let subtract = Tool::new("subtract", "Subtract two numbers")
                        .with_property("a", "number", "First number", true)
                        .with_group("math");
                    Ok::<_, ToolError>(
                        ToolOutput::new("Discovered 1 new math tool")
                            .with_meta(MetaResponse::tools_added([subtract])),
                    )
                },
            )
            .unwrap();
        provider
            .register_tool(
                Tool::new("fail", "Always fails"),
                |_params: ToolParams| async move {
                    Err::<ToolOutput, _>(ToolError::failed("division by zero"))
                },
            )
            .unwrap();

        provider
    }

    fn names(response: &ToolsResponse) -> Vec<&str> {
        response.tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_tools_by_group() {
        let provider = advanced_provider(Capabilities::new());

        let math = provider
            .list_tools(Some("math"), "", PageRequest::all())
            .await
            .unwrap();
        assert_eq!(names(&math), vec!["add", "discover"]);
        assert_eq!(math.total, 2);

        let string = provider
            .list_tools(Some("string"), "", PageRequest::all())
            .await
            .unwrap();
        assert_eq!(names(&string), vec!["uppercase"]);

        // Empty group id means no group filter
        let all = provider
            .list_tools(Some(""), "", PageRequest::all())
            .await
            .unwrap();
        assert_eq!(all.total, 4);
    }

    #[tokio::test]
    async fn test_list_tools_unknown_group_is_empty() {
        let provider = advanced_provider(Capabilities::new());
        let response = provider
            .list_tools(Some("nope"), "", PageRequest::new(0, 10))
            .await
            .unwrap();
        assert!(response.tools.is_empty());
        assert_eq!(response.total, 0);
    }

    #[tokio::test]
    async fn test_list_tools_search_and_page() {
        let provider = advanced_provider(Capabilities::new());

        let response = provider
            .list_tools(None, "ADD", PageRequest::new(0, 100))
            .await
            .unwrap();
        // "discover" matches through "additional" in its description
        assert_eq!(names(&response), vec!["add", "discover"]);

        let response = provider
            .list_tools(None, "", PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(names(&response), vec!["discover", "fail"]);
        assert_eq!(response.total, 4);
        assert_eq!(response.offset, 1);
        assert_eq!(response.limit, 2);

        let response = provider
            .list_tools(None, "", PageRequest::new(10, 2))
            .await
            .unwrap();
        assert!(response.tools.is_empty());
        assert_eq!(response.total, 4);
    }

    #[tokio::test]
    async fn test_list_tools_is_idempotent() {
        let provider = advanced_provider(Capabilities::new());
        let first = provider
            .list_tools(None, "o", PageRequest::new(1, 2))
            .await
            .unwrap();
        for _ in 0..5 {
            let again = provider
                .list_tools(None, "o", PageRequest::new(1, 2))
                .await
                .unwrap();
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let provider = advanced_provider(Capabilities::new());
        let mut params = ToolParams::new();
        params.insert("a".into(), json!(10));
        params.insert("b".into(), json!(5));

        let response = provider.execute_tool("add", params).await.unwrap();
        assert_eq!(response.result, Some(json!(15.0)));
        assert!(response.error.is_none());
        assert!(response.meta.is_none());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let provider = advanced_provider(Capabilities::new());
        let response = provider
            .execute_tool("nonexistent", ToolParams::new())
            .await
            .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::ToolNotFound);
        assert_eq!(error.message, "Tool not found: nonexistent");
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_execute_failure_is_captured() {
        let provider = advanced_provider(Capabilities::new());
        let response = provider.execute_tool("fail", ToolParams::new()).await.unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::ExecutionError);
        assert_eq!(error.message, "division by zero");
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_execute_panic_is_captured() {
        let provider = SimpleProvider::new(Capabilities::new());
        provider
            .register_tool(Tool::new("boom", "Panics"), |_params: ToolParams| async move {
                if true {
                    panic!("executor blew up");
                }
                Ok::<_, ToolError>(ToolOutput::new(json!(null)))
            })
            .unwrap();

        let response = provider.execute_tool("boom", ToolParams::new()).await.unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::ExecutionError);
        assert_eq!(error.message, "executor blew up");

        // The registry is still usable afterwards
        let listing = provider
            .list_tools(None, "", PageRequest::all())
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn test_meta_attached_with_dynamic_tools() {
        let provider = advanced_provider(Capabilities::new().with_dynamic_tools());
        let response = provider
            .execute_tool("discover", ToolParams::new())
            .await
            .unwrap();

        assert_eq!(response.result, Some(json!("Discovered 1 new math tool")));
        let meta = response.meta.unwrap();
        assert_eq!(meta.tag(), "tools_added");
        let tools = meta.tools().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "subtract");
        assert_eq!(tools[0].description, "Subtract two numbers");
        assert_eq!(tools[0].input_schema.required, vec!["a"]);
    }

    #[tokio::test]
    async fn test_meta_dropped_without_dynamic_tools() {
        let provider = advanced_provider(Capabilities::new());
        let response = provider
            .execute_tool("discover", ToolParams::new())
            .await
            .unwrap();

        assert!(response.result.is_some());
        assert!(response.meta.is_none());
    }

    #[tokio::test]
    async fn test_list_groups() {
        let provider = advanced_provider(Capabilities::new());

        let all = provider
            .list_groups(None, "", PageRequest::all())
            .await
            .unwrap();
        let ids: Vec<&str> = all.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["math", "string", "trig"]);
        assert_eq!(all.groups[0].tool_count, 2);

        let children = provider
            .list_groups(Some("math"), "", PageRequest::all())
            .await
            .unwrap();
        assert_eq!(children.total, 1);
        assert_eq!(children.groups[0].id, "trig");

        let searched = provider
            .list_groups(None, "STRINGS", PageRequest::all())
            .await
            .unwrap();
        assert_eq!(searched.total, 1);
        assert_eq!(searched.groups[0].id, "string");
    }

    #[tokio::test]
    async fn test_get_group() {
        let provider = advanced_provider(Capabilities::new());

        let group = provider.get_group("string").await.unwrap();
        assert_eq!(group.name, "String Operations");
        assert_eq!(group.tool_count, 1);

        let err = provider.get_group("missing").await.unwrap_err();
        assert_eq!(err, A2tError::GroupNotFound("missing".to_string()));
        assert_eq!(err.code(), ErrorCode::GroupNotFound);
    }

    #[tokio::test]
    async fn test_execute_group_tool() {
        let provider = advanced_provider(Capabilities::new());
        let mut params = ToolParams::new();
        params.insert("text".into(), json!("hello"));

        let ok = provider
            .execute_group_tool("string", "uppercase", params.clone())
            .await
            .unwrap();
        assert_eq!(ok.result, Some(json!("HELLO")));

        let wrong_group = provider
            .execute_group_tool("math", "uppercase", params.clone())
            .await
            .unwrap();
        assert_eq!(wrong_group.error.unwrap().code, ErrorCode::ToolNotFound);

        let missing_group = provider
            .execute_group_tool("nope", "uppercase", params)
            .await
            .unwrap();
        assert_eq!(missing_group.error.unwrap().code, ErrorCode::GroupNotFound);
    }

    #[tokio::test]
    async fn test_group_provider_enables_groups() {
        let provider = GroupedProvider::new(Capabilities::new());
        assert!(provider.get_capabilities().features.groups);
        assert_eq!(provider.get_capabilities().groups_path(), Some("/groups"));

        let custom = GroupedProvider::new(Capabilities::new().with_groups("/namespaces"));
        assert_eq!(custom.get_capabilities().groups_path(), Some("/namespaces"));
    }

    #[tokio::test]
    async fn test_abandoned_execution_leaves_registry_consistent() {
        let provider = Arc::new(SimpleProvider::new(Capabilities::new()));
        provider
            .register_tool(Tool::new("slow", "Never finishes"), |_params: ToolParams| async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<_, ToolError>(ToolOutput::new(json!("late")))
            })
            .unwrap();
        provider
            .register_tool(Tool::new("fast", "Finishes"), |_params: ToolParams| async move {
                Ok::<_, ToolError>(ToolOutput::new(json!("done")))
            })
            .unwrap();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            provider.execute_tool("slow", ToolParams::new()),
        )
        .await;
        assert!(abandoned.is_err());

        let response = provider.execute_tool("fast", ToolParams::new()).await.unwrap();
        assert_eq!(response.result, Some(json!("done")));
        assert_eq!(provider.registry().tool_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_executions_are_isolated() {
        let provider = Arc::new(advanced_provider(Capabilities::new()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let provider = provider.clone();
                tokio::spawn(async move {
                    let name = if i % 2 == 0 { "add" } else { "fail" };
                    let mut params = ToolParams::new();
                    params.insert("a".into(), json!(i));
                    params.insert("b".into(), json!(1));
                    (i, provider.execute_tool(name, params).await.unwrap())
                })
            })
            .collect();

        for handle in handles {
            let (i, response) = handle.await.unwrap();
            if i % 2 == 0 {
                assert_eq!(response.result, Some(json!((i + 1) as f64)));
            } else {
                assert_eq!(response.error.unwrap().code, ErrorCode::ExecutionError);
            }
        }
    }
}
