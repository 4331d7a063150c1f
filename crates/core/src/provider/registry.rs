// In-process catalog store shared by the in-memory providers

use super::ToolExecutor;
use crate::error::{A2tError, A2tResult};
use crate::types::{Group, Tool};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct ToolEntry {
    tool: Tool,
    executor: Arc<dyn ToolExecutor>,
}

#[derive(Default)]
struct Catalog {
    // Ordered maps give listings a stable, lexicographic order
    tools: BTreeMap<String, ToolEntry>,
    groups: BTreeMap<String, Group>,
}

impl Catalog {
    fn count_tools_in(&self, group_id: &str) -> usize {
        self.tools
            .values()
            .filter(|entry| entry.tool.in_group(group_id))
            .count()
    }

    fn with_tool_count(&self, group: &Group) -> Group {
        let mut group = group.clone();
        group.tool_count = self.count_tools_in(&group.id);
        group
    }
}

/// Tool and group registry guarded by a single read-write lock.
///
/// Every read returns owned copies taken under one guard, so callers see a
/// consistent snapshot and never hold the lock while a tool runs.
pub struct ToolRegistry {
    catalog: RwLock<Catalog>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a tool with its executor. Names must be non-empty and unique.
    pub fn register_tool(&self, tool: Tool, executor: Arc<dyn ToolExecutor>) -> A2tResult<()> {
        if tool.name.trim().is_empty() {
            return Err(A2tError::InvalidTool("tool name must not be empty".to_string()));
        }

        let mut catalog = self.write();
        if catalog.tools.contains_key(&tool.name) {
            return Err(A2tError::DuplicateTool(tool.name));
        }

        tracing::info!(
            "Registered tool {} (group: {})",
            tool.name,
            tool.group_id.as_deref().unwrap_or("-")
        );
        catalog
            .tools
            .insert(tool.name.clone(), ToolEntry { tool, executor });

        Ok(())
    }

    /// Register a group. Ids must be non-empty and unique.
    pub fn register_group(&self, group: Group) -> A2tResult<()> {
        if group.id.trim().is_empty() {
            return Err(A2tError::InvalidGroup("group id must not be empty".to_string()));
        }

        let mut catalog = self.write();
        if catalog.groups.contains_key(&group.id) {
            return Err(A2tError::DuplicateGroup(group.id));
        }

        tracing::info!("Registered group {} ({})", group.id, group.name);
        catalog.groups.insert(group.id.clone(), group);

        Ok(())
    }

    /// Get a tool definition by name
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        self.read().tools.get(name).map(|entry| entry.tool.clone())
    }

    /// Look up a tool together with its executor
    pub fn resolve(&self, name: &str) -> Option<(Tool, Arc<dyn ToolExecutor>)> {
        self.read()
            .tools
            .get(name)
            .map(|entry| (entry.tool.clone(), entry.executor.clone()))
    }

    /// All tool definitions, ordered by name
    pub fn tools(&self) -> Vec<Tool> {
        self.read()
            .tools
            .values()
            .map(|entry| entry.tool.clone())
            .collect()
    }

    /// All groups ordered by id, with `tool_count` taken from the registry
    pub fn groups(&self) -> Vec<Group> {
        let catalog = self.read();
        catalog
            .groups
            .values()
            .map(|group| catalog.with_tool_count(group))
            .collect()
    }

    /// A single group with its current `tool_count`
    pub fn get_group(&self, group_id: &str) -> Option<Group> {
        let catalog = self.read();
        catalog
            .groups
            .get(group_id)
            .map(|group| catalog.with_tool_count(group))
    }

    pub fn contains_tool(&self, name: &str) -> bool {
        self.read().tools.contains_key(name)
    }

    pub fn contains_group(&self, group_id: &str) -> bool {
        self.read().groups.contains_key(group_id)
    }

    pub fn tool_count(&self) -> usize {
        self.read().tools.len()
    }

    pub fn group_count(&self) -> usize {
        self.read().groups.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
