use crate::error::{Result, ToolError};
use cb_transport::{
    BridgeConfig, BridgeSettings, BridgeSources, Environment, OperationRequest, Transport,
    TransportResult,
};
use std::sync::Arc;

/// Everything needed to reach one bridge. Tools resolve connection settings
/// at the start of every call, so rotated credentials apply to the next request.
#[derive(Clone)]
pub struct BridgeClient {
    settings: BridgeSettings,
    sources: BridgeSources,
    env: Arc<dyn Environment>,
    transport: Arc<dyn Transport>,
}

impl BridgeClient {
    pub fn new(
        settings: BridgeSettings,
        sources: BridgeSources,
        env: Arc<dyn Environment>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            settings,
            sources,
            env,
            transport,
        }
    }

    pub fn resolve_config(&self) -> Result<BridgeConfig> {
        Ok(BridgeConfig::resolve(
            &self.settings,
            &self.sources,
            self.env.as_ref(),
        )?)
    }

    /// Sends one request and fails with [`ToolError::Backend`] on any non-2xx status.
    pub async fn call(
        &self,
        config: &BridgeConfig,
        operation: &str,
        request: OperationRequest,
    ) -> Result<TransportResult> {
        let result = self.transport.send(config, &request).await?;
        if !result.ok {
            return Err(ToolError::Backend {
                operation: operation.to_string(),
                status: result.status,
                body: result.body,
            });
        }
        Ok(result)
    }

    pub async fn call_json(
        &self,
        config: &BridgeConfig,
        operation: &str,
        request: OperationRequest,
    ) -> Result<serde_json::Value> {
        let result = self.call(config, operation, request).await?;
        parse_json_body(operation, &result)
    }

    pub async fn call_text(
        &self,
        config: &BridgeConfig,
        operation: &str,
        request: OperationRequest,
    ) -> Result<String> {
        Ok(self.call(config, operation, request).await?.body)
    }
}

/// An empty 2xx body becomes `{"status": <code>}`.
pub(crate) fn parse_json_body(
    operation: &str,
    result: &TransportResult,
) -> Result<serde_json::Value> {
    if result.body.trim().is_empty() {
        return Ok(serde_json::json!({ "status": result.status }));
    }
    serde_json::from_str(&result.body).map_err(|e| ToolError::InvalidResponse {
        operation: operation.to_string(),
        detail: format!("{e}; body={}", result.body),
    })
}
