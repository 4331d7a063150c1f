use super::{ApiError, ApiResult};
use crate::config::AppState;
use a2t_core::{
    Capabilities, ExecuteResponse, Group, GroupsResponse, PageRequest, ToolParams, ToolsResponse,
};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// Query string accepted by the tool listing routes
#[derive(Debug, Default, Deserialize)]
pub struct ListToolsQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
}

/// Query string accepted by the group listing route
#[derive(Debug, Default, Deserialize)]
pub struct ListGroupsQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<i64>,
}

/// `?offset=` with no value means "use the default"
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(number) => number
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", number, e))),
    }
}

fn page_request(offset: Option<i64>, limit: Option<i64>, default_limit: usize) -> ApiResult<PageRequest> {
    let default_limit = i64::try_from(default_limit).unwrap_or(i64::MAX);
    Ok(PageRequest::from_signed(
        offset.unwrap_or(0),
        limit.unwrap_or(default_limit),
    )?)
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Decode a tool parameter body. An absent or empty body is an empty map.
fn tool_params(body: &Bytes) -> ApiResult<ToolParams> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ToolParams::new());
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    match value {
        serde_json::Value::Object(params) => Ok(params),
        serde_json::Value::Null => Ok(ToolParams::new()),
        _ => Err(ApiError::BadRequest(
            "Tool parameters must be a JSON object".to_string(),
        )),
    }
}

/// Capability negotiation
pub async fn get_capabilities(State(state): State<Arc<AppState>>) -> Json<Capabilities> {
    Json(state.provider.get_capabilities().clone())
}

/// List or search tools
pub async fn list_tools(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListToolsQuery>, QueryRejection>,
) -> ApiResult<Json<ToolsResponse>> {
    let query = query_params(query)?;
    let page = page_request(query.offset, query.limit, state.listing.default_tool_limit)?;

    let response = state.provider.list_tools(None, &query.q, page).await?;
    Ok(Json(response))
}

/// Execute a tool by name
pub async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<ExecuteResponse>> {
    let params = tool_params(&body)?;

    let response = state.provider.execute_tool(&name, params).await?;
    if let Some(error) = &response.error {
        tracing::info!("Tool {} returned {}", name, error);
    }

    Ok(Json(response))
}

/// List or search groups
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListGroupsQuery>, QueryRejection>,
) -> ApiResult<Json<GroupsResponse>> {
    let groups = state.provider.require_groups()?;
    let query = query_params(query)?;
    let page = page_request(query.offset, query.limit, state.listing.default_group_limit)?;

    let parent_id = Some(query.parent_id.as_str()).filter(|id| !id.is_empty());
    let response = groups.list_groups(parent_id, &query.q, page).await?;
    Ok(Json(response))
}

/// Get a single group
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Group>> {
    let groups = state.provider.require_groups()?;
    let group = groups.get_group(&group_id).await?;
    Ok(Json(group))
}

/// List tools within a group
pub async fn list_group_tools(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
    query: Result<Query<ListToolsQuery>, QueryRejection>,
) -> ApiResult<Json<ToolsResponse>> {
    let groups = state.provider.require_groups()?;
    let query = query_params(query)?;
    let page = page_request(query.offset, query.limit, state.listing.default_tool_limit)?;

    let response = groups.list_group_tools(&group_id, &query.q, page).await?;
    Ok(Json(response))
}

/// Execute a tool addressed through its group
pub async fn execute_group_tool(
    State(state): State<Arc<AppState>>,
    Path((group_id, name)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<ExecuteResponse>> {
    let groups = state.provider.require_groups()?;
    let params = tool_params(&body)?;

    let response = groups.execute_group_tool(&group_id, &name, params).await?;
    if let Some(error) = &response.error {
        tracing::info!("Tool {}/{} returned {}", group_id, name, error);
    }

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_params_empty_body() {
        assert!(tool_params(&Bytes::new()).unwrap().is_empty());
        assert!(tool_params(&Bytes::from_static(b"  \n")).unwrap().is_empty());
        assert!(tool_params(&Bytes::from_static(b"null")).unwrap().is_empty());
    }

    #[test]
    fn test_tool_params_object() {
        let params = tool_params(&Bytes::from_static(br#"{"a": 1, "b": "two"}"#)).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["b"], "two");
    }

    #[test]
    fn test_tool_params_rejects_non_objects() {
        assert!(matches!(
            tool_params(&Bytes::from_static(b"42")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            tool_params(&Bytes::from_static(b"{oops")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(page_request(None, None, 100).unwrap(), PageRequest::new(0, 100));
        assert_eq!(page_request(Some(5), Some(0), 100).unwrap(), PageRequest::new(5, 0));
        assert!(matches!(
            page_request(Some(-2), None, 100),
            Err(ApiError::Provider(_))
        ));
    }
}
