// Catalog model: tools, groups, capabilities and response envelopes

use crate::error::ErrorCode;
use crate::meta::MetaResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Protocol version advertised in capabilities
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default tools endpoint
pub const DEFAULT_TOOLS_PATH: &str = "/tools";

/// Default groups endpoint
pub const DEFAULT_GROUPS_PATH: &str = "/groups";

/// Schema for a single tool parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Other JSON-Schema keywords (`items`, `enum`, ...), kept as received
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// JSON-Schema shaped description of a tool's accepted parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InputSchema {
    /// Empty object schema
    pub fn object() -> Self {
        Self {
            kind: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add or replace a property. Keys stay unique and `required` never
    /// lists a name twice.
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            PropertySchema {
                kind: kind.into(),
                description: description.into(),
                extra: serde_json::Map::new(),
            },
        );

        let position = self.required.iter().position(|r| r == &name);
        match (required, position) {
            (true, None) => self.required.push(name),
            (false, Some(idx)) => {
                self.required.remove(idx);
            }
            _ => {}
        }
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::object()
    }
}

/// A callable unit an agent can invoke by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: InputSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: InputSchema::object(),
            group_id: None,
        }
    }

    /// Add a parameter to the input schema
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.input_schema
            .set_property(name, kind, description, required);
        self
    }

    /// Place the tool in a group. An empty id leaves it ungrouped.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        let group_id = group_id.into();
        self.group_id = if group_id.is_empty() {
            None
        } else {
            Some(group_id)
        };
        self
    }

    /// Whether the tool belongs to the given group
    pub fn in_group(&self, group_id: &str) -> bool {
        self.group_id.as_deref() == Some(group_id)
    }
}

/// A namespace organizing tools, optionally nested under a parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Number of tools in the group, filled in from the registry on read
    #[serde(default)]
    pub tool_count: usize,
}

impl Group {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parent_id: None,
            tool_count: 0,
        }
    }

    /// Nest the group under a parent. An empty id makes it a root group.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        let parent_id = parent_id.into();
        self.parent_id = if parent_id.is_empty() {
            None
        } else {
            Some(parent_id)
        };
        self
    }

    pub fn is_child_of(&self, parent_id: &str) -> bool {
        self.parent_id.as_deref() == Some(parent_id)
    }
}

/// Optional protocol features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub groups: bool,
    pub search: bool,
    pub dynamic_tools: bool,
}

/// URL paths for each endpoint family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub tools: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
}

/// Advisory server-side limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tools_per_request: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_groups_per_request: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_search_results: Option<usize>,
}

/// Capability descriptor served at the well-known path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub version: String,
    pub features: FeatureSet,
    pub endpoints: EndpointConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsConfig>,
}

impl Capabilities {
    /// Baseline capabilities: tools only, no optional features
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            features: FeatureSet::default(),
            endpoints: EndpointConfig {
                tools: DEFAULT_TOOLS_PATH.to_string(),
                groups: None,
            },
            limits: None,
        }
    }

    /// Enable groups. An empty endpoint falls back to `/groups`.
    pub fn with_groups(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.features.groups = true;
        self.endpoints.groups = Some(if endpoint.is_empty() {
            DEFAULT_GROUPS_PATH.to_string()
        } else {
            endpoint
        });
        self
    }

    pub fn with_search(mut self) -> Self {
        self.features.search = true;
        self
    }

    pub fn with_dynamic_tools(mut self) -> Self {
        self.features.dynamic_tools = true;
        self
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Relocate the tools endpoint
    pub fn with_tools_path(mut self, path: impl Into<String>) -> Self {
        self.endpoints.tools = path.into();
        self
    }

    /// Groups endpoint, present only when the groups feature is on
    pub fn groups_path(&self) -> Option<&str> {
        if !self.features.groups {
            return None;
        }
        Some(
            self.endpoints
                .groups
                .as_deref()
                .unwrap_or(DEFAULT_GROUPS_PATH),
        )
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new()
    }
}

/// Structured protocol error carried in a response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result of a tool execution: either a result or an error, plus optional meta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaResponse>,
}

impl ExecuteResponse {
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            error: None,
            meta: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(ErrorDetail::new(code, message)),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: MetaResponse) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Paginated tool listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsResponse {
    pub tools: Vec<Tool>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Paginated group listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}
