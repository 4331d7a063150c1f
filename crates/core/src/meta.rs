// Meta responses: catalog-change hints piggybacked on an execution result

use crate::types::Tool;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

pub const TOOLS_ADDED: &str = "tools_added";
pub const GROUP_REFRESH: &str = "group_refresh";

/// Side-channel payload attached to an `ExecuteResponse`.
///
/// Delivery is at-most-once: the hint rides on the single response of the
/// call that produced it and is never re-sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawMeta")]
pub enum MetaResponse {
    /// Tools the client has not seen yet; invokable without re-fetching
    ToolsAdded { tools: Vec<Tool> },
    /// Groups whose tool listings are stale and must be re-fetched
    GroupRefresh { group_ids: Vec<String> },
    /// Unrecognized tag. `data` holds the payload bytes exactly as received
    /// and is re-emitted untouched; `None` means the field was absent.
    Unknown {
        tag: String,
        data: Option<Box<RawValue>>,
    },
}

impl MetaResponse {
    pub fn tools_added(tools: impl IntoIterator<Item = Tool>) -> Self {
        Self::ToolsAdded {
            tools: tools.into_iter().collect(),
        }
    }

    pub fn group_refresh<I, S>(group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::GroupRefresh {
            group_ids: group_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Wire tag of this meta response
    pub fn tag(&self) -> &str {
        match self {
            Self::ToolsAdded { .. } => TOOLS_ADDED,
            Self::GroupRefresh { .. } => GROUP_REFRESH,
            Self::Unknown { tag, .. } => tag,
        }
    }

    pub fn tools(&self) -> Option<&[Tool]> {
        match self {
            Self::ToolsAdded { tools } => Some(tools),
            _ => None,
        }
    }

    pub fn group_ids(&self) -> Option<&[String]> {
        match self {
            Self::GroupRefresh { group_ids } => Some(group_ids),
            _ => None,
        }
    }

    /// Raw payload text of an unrecognized meta response
    pub fn raw_data(&self) -> Option<&str> {
        match self {
            Self::Unknown { data, .. } => data.as_deref().map(RawValue::get),
            _ => None,
        }
    }
}

// `RawValue` has no `PartialEq`; raw payloads compare by their exact text
impl PartialEq for MetaResponse {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ToolsAdded { tools: a }, Self::ToolsAdded { tools: b }) => a == b,
            (Self::GroupRefresh { group_ids: a }, Self::GroupRefresh { group_ids: b }) => a == b,
            (Self::Unknown { tag: a, .. }, Self::Unknown { tag: b, .. }) => {
                a == b && self.raw_data() == other.raw_data()
            }
            _ => false,
        }
    }
}

#[derive(Deserialize)]
struct RawMeta {
    #[serde(rename = "type")]
    tag: String,
    // An explicit `null` is kept as raw text, only a missing field is `None`
    #[serde(default, deserialize_with = "present_data")]
    data: Option<Box<RawValue>>,
}

fn present_data<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

#[derive(Serialize, Deserialize)]
struct ToolsAddedData<T> {
    tools: T,
}

#[derive(Serialize, Deserialize)]
struct GroupRefreshData<T> {
    group_ids: T,
}

fn known_data<T: DeserializeOwned>(tag: &str, data: Option<&RawValue>) -> serde_json::Result<T> {
    let data = data.ok_or_else(|| {
        <serde_json::Error as serde::de::Error>::custom(format!("{} meta without data", tag))
    })?;
    serde_json::from_str(data.get())
}

impl TryFrom<RawMeta> for MetaResponse {
    type Error = serde_json::Error;

    fn try_from(raw: RawMeta) -> Result<Self, Self::Error> {
        match raw.tag.as_str() {
            TOOLS_ADDED => {
                let data: ToolsAddedData<Vec<Tool>> = known_data(TOOLS_ADDED, raw.data.as_deref())?;
                Ok(Self::ToolsAdded { tools: data.tools })
            }
            GROUP_REFRESH => {
                let data: GroupRefreshData<Vec<String>> =
                    known_data(GROUP_REFRESH, raw.data.as_deref())?;
                Ok(Self::GroupRefresh {
                    group_ids: data.group_ids,
                })
            }
            _ => Ok(Self::Unknown {
                tag: raw.tag,
                data: raw.data,
            }),
        }
    }
}

impl Serialize for MetaResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::ToolsAdded { tools } => {
                let mut state = serializer.serialize_struct("MetaResponse", 2)?;
                state.serialize_field("type", TOOLS_ADDED)?;
                state.serialize_field("data", &ToolsAddedData { tools })?;
                state.end()
            }
            Self::GroupRefresh { group_ids } => {
                let mut state = serializer.serialize_struct("MetaResponse", 2)?;
                state.serialize_field("type", GROUP_REFRESH)?;
                state.serialize_field("data", &GroupRefreshData { group_ids })?;
                state.end()
            }
            Self::Unknown { tag, data: None } => {
                let mut state = serializer.serialize_struct("MetaResponse", 1)?;
                state.serialize_field("type", tag)?;
                state.end()
            }
            Self::Unknown {
                tag,
                data: Some(data),
            } => {
                let mut state = serializer.serialize_struct("MetaResponse", 2)?;
                state.serialize_field("type", tag)?;
                state.serialize_field("data", data)?;
                state.end()
            }
        }
    }
}
