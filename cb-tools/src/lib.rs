//! Agent-invokable tools backed by companion bridges.
//!
//! Each tool performs one authenticated HTTP request against either the local
//! filesystem/command bridge or the Drive playground bridge, and reports
//! failures through a single [`ToolError`] taxonomy.

mod client;
mod drive_playground;
mod error;
mod local_bridge;
mod registry;
#[cfg(test)]
mod test_support;
mod traits;

pub use client::BridgeClient;
pub use drive_playground::{
    DEFAULT_PAGE_SIZE, DRIVE_PLAYGROUND_SOURCES, DriveListQuery, DriveListTool, DrivePlayground,
    DriveReadTool, DriveWrite, DriveWriteTool, NativeDocKind, WriteIntent, drive_playground_tools,
};
pub use error::{Result, ToolError};
pub use local_bridge::{
    LOCAL_BRIDGE_SOURCES, LocalBridge, LocalListTool, LocalReadTool, LocalRunTool, LocalWriteTool,
    local_bridge_tools,
};
pub use registry::{BridgeToolOptions, RegisteredTool, ToolRegistry, register_bridge_tools};
pub use traits::{RiskLevel, Tool, ToolDefinition, ToolSpec, to_tool_definition};
