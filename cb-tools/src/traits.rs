use crate::error::{Result, ToolError};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
    pub risk_level: RiskLevel,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value>;
}

/// Function definition handed to a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

pub fn to_tool_definition(tool: &dyn Tool) -> ToolDefinition {
    let spec = tool.spec();
    ToolDefinition {
        name: spec.name,
        description: spec.description,
        parameters: spec.parameters_schema,
    }
}

pub(crate) fn require_string(args: &serde_json::Value, key: &str) -> Result<String> {
    let Some(v) = args.get(key) else {
        return Err(ToolError::Validation(format!("missing key: {key}")));
    };
    match v {
        serde_json::Value::String(s) => Ok(s.clone()),
        other => Err(ToolError::Validation(format!(
            "key {key} must be string, got {other:?}"
        ))),
    }
}

pub(crate) fn optional_string(args: &serde_json::Value, key: &str) -> Result<Option<String>> {
    let Some(v) = args.get(key) else {
        return Ok(None);
    };
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.clone())),
        other => Err(ToolError::Validation(format!(
            "key {key} must be string, got {other:?}"
        ))),
    }
}

/// Required string that must not be blank. The value is returned as given.
pub(crate) fn require_non_empty(args: &serde_json::Value, key: &str) -> Result<String> {
    let value = require_string(args, key)?;
    if value.trim().is_empty() {
        return Err(ToolError::Validation(format!("{key} must not be empty")));
    }
    Ok(value)
}

/// Optional string where blank counts as absent. A present value is returned as given.
pub(crate) fn optional_non_blank(args: &serde_json::Value, key: &str) -> Result<Option<String>> {
    Ok(optional_string(args, key)?.filter(|value| !value.trim().is_empty()))
}
