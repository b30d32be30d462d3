use crate::client::BridgeClient;
use crate::error::Result;
use crate::traits::{RiskLevel, Tool, ToolSpec, optional_non_blank, optional_string, require_non_empty};
use async_trait::async_trait;
use cb_transport::{BridgeConfig, BridgeSources, OperationRequest};
use serde_json::json;
use std::sync::Arc;

pub const LOCAL_BRIDGE_SOURCES: BridgeSources = BridgeSources {
    config_prefix: "bridges.local",
    base_url_env: "LOCAL_BRIDGE_URL",
    api_key_env: "LOCAL_BRIDGE_API_KEY",
};

const DEFAULT_PATH: &str = ".";

/// Filesystem and command operations against the project root served by the
/// local bridge. Path confinement and the `run` capability flag are enforced
/// by the bridge; requests are forwarded as given.
#[derive(Clone)]
pub struct LocalBridge {
    client: BridgeClient,
}

impl LocalBridge {
    pub fn new(client: BridgeClient) -> Self {
        Self { client }
    }

    pub fn resolve_config(&self) -> Result<BridgeConfig> {
        self.client.resolve_config()
    }

    pub fn list_request(path: Option<&str>) -> OperationRequest {
        OperationRequest::get("/list").with_query("path", path.unwrap_or(DEFAULT_PATH))
    }

    pub fn read_request(path: &str) -> OperationRequest {
        OperationRequest::get("/read").with_query("path", path)
    }

    pub fn write_request(path: &str, content: &str) -> OperationRequest {
        OperationRequest::post_json("/write", json!({ "path": path, "content": content }))
    }

    pub fn run_request(command: &str, cwd: Option<&str>) -> OperationRequest {
        OperationRequest::post_json(
            "/run",
            json!({ "command": command, "cwd": cwd.unwrap_or(DEFAULT_PATH) }),
        )
    }

    pub async fn list(
        &self,
        config: &BridgeConfig,
        path: Option<&str>,
    ) -> Result<serde_json::Value> {
        self.client
            .call_json(config, "local_list", Self::list_request(path))
            .await
    }

    /// The body is returned verbatim; it is never parsed.
    pub async fn read(&self, config: &BridgeConfig, path: &str) -> Result<serde_json::Value> {
        let content = self
            .client
            .call_text(config, "local_read", Self::read_request(path))
            .await?;
        Ok(json!({ "content": content }))
    }

    pub async fn write(
        &self,
        config: &BridgeConfig,
        path: &str,
        content: &str,
    ) -> Result<serde_json::Value> {
        self.client
            .call_json(config, "local_write", Self::write_request(path, content))
            .await
    }

    pub async fn run(
        &self,
        config: &BridgeConfig,
        command: &str,
        cwd: Option<&str>,
    ) -> Result<serde_json::Value> {
        self.client
            .call_json(config, "local_run", Self::run_request(command, cwd))
            .await
    }
}

pub fn local_bridge_tools(bridge: LocalBridge) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(LocalListTool {
            bridge: bridge.clone(),
        }),
        Arc::new(LocalReadTool {
            bridge: bridge.clone(),
        }),
        Arc::new(LocalWriteTool {
            bridge: bridge.clone(),
        }),
        Arc::new(LocalRunTool { bridge }),
    ]
}

pub struct LocalListTool {
    bridge: LocalBridge,
}

#[async_trait]
impl Tool for LocalListTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "local_list".to_string(),
            description: "List a directory in the project on the user's machine (via the local bridge)."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Directory relative to the project root. Defaults to '.'."
                    }
                }
            }),
            risk_level: RiskLevel::Low,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "local_list"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.bridge.resolve_config()?;
        let path = optional_non_blank(&arguments, "path")?;
        self.bridge.list(&config, path.as_deref()).await
    }
}

pub struct LocalReadTool {
    bridge: LocalBridge,
}

#[async_trait]
impl Tool for LocalReadTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "local_read".to_string(),
            description: "Read a text file from the project on the user's machine (via the local bridge)."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path relative to the project root."
                    }
                },
                "required": ["path"]
            }),
            risk_level: RiskLevel::Low,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "local_read"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.bridge.resolve_config()?;
        let path = require_non_empty(&arguments, "path")?;
        self.bridge.read(&config, &path).await
    }
}

pub struct LocalWriteTool {
    bridge: LocalBridge,
}

#[async_trait]
impl Tool for LocalWriteTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "local_write".to_string(),
            description: "Create or overwrite a text file in the project on the user's machine (via the local bridge)."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "File path relative to the project root."
                    },
                    "content": {
                        "type": "string",
                        "description": "Full file content. Defaults to an empty file."
                    }
                },
                "required": ["path"]
            }),
            risk_level: RiskLevel::Medium,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "local_write"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.bridge.resolve_config()?;
        let path = require_non_empty(&arguments, "path")?;
        let content = optional_string(&arguments, "content")?.unwrap_or_default();
        self.bridge.write(&config, &path, &content).await
    }
}

pub struct LocalRunTool {
    bridge: LocalBridge,
}

#[async_trait]
impl Tool for LocalRunTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "local_run".to_string(),
            description: "Run a shell command in the project on the user's machine (via the local bridge). The bridge may have command execution disabled."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "Command line to execute."
                    },
                    "cwd": {
                        "type": "string",
                        "description": "Working directory relative to the project root. Defaults to '.'."
                    }
                },
                "required": ["command"]
            }),
            risk_level: RiskLevel::High,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "local_run"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.bridge.resolve_config()?;
        let command = require_non_empty(&arguments, "command")?;
        let cwd = optional_non_blank(&arguments, "cwd")?;
        self.bridge.run(&config, &command, cwd.as_deref()).await
    }
}
