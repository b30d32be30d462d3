use crate::client::BridgeClient;
use crate::drive_playground::{DRIVE_PLAYGROUND_SOURCES, DrivePlayground, drive_playground_tools};
use crate::error::{Result, ToolError};
use crate::local_bridge::{LOCAL_BRIDGE_SOURCES, LocalBridge, local_bridge_tools};
use crate::traits::{Tool, ToolDefinition, to_tool_definition};
use cb_transport::{BridgeSettings, Environment, Transport};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct RegisteredTool {
    pub tool: Arc<dyn Tool>,
    /// Optional tools stay registered when their backend is unreachable or
    /// unconfigured; only individual calls fail.
    pub optional: bool,
}

/// Tools keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_optional(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        let name = tool.spec().name;
        let registered = RegisteredTool {
            tool,
            optional: true,
        };
        if self.tools.insert(name.clone(), registered).is_some() {
            tracing::warn!(tool = %name, "replaced previously registered tool");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|registered| to_tool_definition(registered.tool.as_ref()))
            .collect()
    }

    pub async fn invoke(&self, name: &str, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let registered = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        registered.tool.execute(arguments).await
    }
}

/// Which bridges to expose. `None` leaves that bridge's tools out entirely.
#[derive(Debug, Clone, Default)]
pub struct BridgeToolOptions {
    pub local: Option<BridgeSettings>,
    pub drive: Option<BridgeSettings>,
}

/// Registers every enabled bridge tool as optional. Nothing is resolved or
/// contacted here; configuration is looked up when a tool runs.
pub fn register_bridge_tools(
    registry: &mut ToolRegistry,
    options: BridgeToolOptions,
    transport: Arc<dyn Transport>,
    env: Arc<dyn Environment>,
) {
    if let Some(settings) = options.local {
        let client = BridgeClient::new(settings, LOCAL_BRIDGE_SOURCES, env.clone(), transport.clone());
        for tool in local_bridge_tools(LocalBridge::new(client)) {
            registry.register_optional(tool);
        }
    }
    if let Some(settings) = options.drive {
        let client = BridgeClient::new(settings, DRIVE_PLAYGROUND_SOURCES, env, transport);
        for tool in drive_playground_tools(DrivePlayground::new(client)) {
            registry.register_optional(tool);
        }
    }
    tracing::info!(tools = registry.len(), "bridge tools registered");
}
