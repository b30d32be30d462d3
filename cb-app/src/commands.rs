use crate::config::CompanionConfig;
use cb_tools::{
    BridgeClient, DRIVE_PLAYGROUND_SOURCES, DrivePlayground, LOCAL_BRIDGE_SOURCES, ToolRegistry,
    register_bridge_tools,
};
use cb_transport::{BridgeSettings, BridgeSources, Environment, HttpTransport, Transport};
use std::sync::Arc;

pub fn build_registry(
    cfg: &CompanionConfig,
    transport: Arc<dyn Transport>,
    env: Arc<dyn Environment>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_bridge_tools(&mut registry, cfg.tool_options(), transport, env);
    registry
}

pub fn render_definitions(registry: &ToolRegistry) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&registry.definitions())?)
}

pub async fn call_tool(registry: &ToolRegistry, name: &str, args: &str) -> anyhow::Result<String> {
    let arguments: serde_json::Value = serde_json::from_str(args)
        .map_err(|e| anyhow::anyhow!("--args must be a JSON object: {e}"))?;
    if !arguments.is_object() {
        return Err(anyhow::anyhow!("--args must be a JSON object"));
    }
    let result = registry.invoke(name, arguments).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}

/// One line per bridge; the drive bridge is also checked at `/health`.
pub async fn doctor(
    cfg: &CompanionConfig,
    transport: Arc<HttpTransport>,
    env: Arc<dyn Environment>,
) -> Vec<String> {
    let options = cfg.tool_options();
    let mut lines = Vec::new();

    match options.local {
        None => lines.push("local: disabled".to_string()),
        Some(settings) => {
            let client = client(settings, LOCAL_BRIDGE_SOURCES, &transport, &env);
            lines.push(match client.resolve_config() {
                Ok(config) => format!("local: configured base_url={}", config.base_url()),
                Err(e) => format!("local: {e}"),
            });
        }
    }

    match options.drive {
        None => lines.push("drive: disabled".to_string()),
        Some(settings) => {
            let client = client(settings, DRIVE_PLAYGROUND_SOURCES, &transport, &env);
            let line = match client.resolve_config() {
                Err(e) => format!("drive: {e}"),
                Ok(config) => match DrivePlayground::new(client).health(&config).await {
                    Ok(health) => format!("drive: healthy base_url={} {health}", config.base_url()),
                    Err(e) => format!("drive: unhealthy base_url={}: {e}", config.base_url()),
                },
            };
            lines.push(line);
        }
    }

    lines
}

fn client(
    settings: BridgeSettings,
    sources: BridgeSources,
    transport: &Arc<HttpTransport>,
    env: &Arc<dyn Environment>,
) -> BridgeClient {
    BridgeClient::new(settings, sources, env.clone(), transport.clone())
}
