//! Immutable catalogue of available tools.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ToolDefinition;

use super::Tool;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
    #[error("invalid tool name: '{0}'")]
    InvalidName(String),
}

/// A tool together with the definition captured at registration.
pub struct RegisteredTool {
    definition: ToolDefinition,
    tool: Arc<dyn Tool>,
}

impl RegisteredTool {
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn tool(&self) -> &Arc<dyn Tool> {
        &self.tool
    }
}

/// Tools keyed by unique name. Built once, then shared read-only.
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    /// Definitions in registration order.
    catalogue: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// A registry with no tools.
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
            catalogue: Vec::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Every definition, in registration order.
    pub fn catalogue(&self) -> &[ToolDefinition] {
        &self.catalogue
    }

    pub fn names(&self) -> Vec<&str> {
        self.catalogue.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.catalogue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogue.is_empty()
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(self, tool: impl Tool + 'static) -> Self {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Freeze the registry, rejecting duplicate or malformed names.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut tools = HashMap::with_capacity(self.tools.len());
        let mut catalogue = Vec::with_capacity(self.tools.len());

        for tool in self.tools {
            let definition = tool.definition();
            if !is_valid_name(&definition.name) {
                return Err(RegistryError::InvalidName(definition.name));
            }
            if tools.contains_key(&definition.name) {
                return Err(RegistryError::DuplicateTool(definition.name));
            }
            catalogue.push(definition.clone());
            tools.insert(definition.name.clone(), RegisteredTool { definition, tool });
        }

        Ok(ToolRegistry { tools, catalogue })
    }
}

/// Names providers accept: 1-64 of `[A-Za-z0-9_-]`.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
