//! Drive-backed playground folder.
//!
//! The bridge manages a single root folder and its subfolders. It refuses
//! files outside that tree (403) and reports unknown files as 404. Writes are
//! keyed by name: writing a name that already exists in the target folder
//! updates that file in place and answers `{"id": ..., "action": "updated"}`;
//! otherwise a new file is created and the answer is
//! `{"id": ..., "action": "created"}`. The dedup happens on the bridge, not
//! here.

use crate::client::BridgeClient;
use crate::error::{Result, ToolError};
use crate::traits::{
    RiskLevel, Tool, ToolSpec, optional_non_blank, optional_string, require_non_empty,
    require_string,
};
use async_trait::async_trait;
use cb_transport::{BridgeConfig, BridgeSources, OperationRequest};
use regex::Regex;
use reqwest::Url;
use serde_json::json;
use std::sync::{Arc, LazyLock};

pub const DRIVE_PLAYGROUND_SOURCES: BridgeSources = BridgeSources {
    config_prefix: "bridges.drive",
    base_url_env: "DRIVE_PLAYGROUND_URL",
    api_key_env: "DRIVE_PLAYGROUND_API_KEY",
};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
const PAGE_SIZE_MIN: i64 = 1;
const PAGE_SIZE_MAX: i64 = 100;
const DEFAULT_INLINE_MIME_TYPE: &str = "text/plain";

static FILE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("file id pattern")
});

/// Drive-native document types that have no content of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeDocKind {
    Document,
    Spreadsheet,
    Presentation,
}

impl NativeDocKind {
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type {
            "application/vnd.google-apps.document" => Some(Self::Document),
            "application/vnd.google-apps.spreadsheet" => Some(Self::Spreadsheet),
            "application/vnd.google-apps.presentation" => Some(Self::Presentation),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Document => "application/vnd.google-apps.document",
            Self::Spreadsheet => "application/vnd.google-apps.spreadsheet",
            Self::Presentation => "application/vnd.google-apps.presentation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteIntent {
    Inline {
        content: String,
        mime_type: String,
    },
    RemoteFetch {
        file_url: String,
        mime_type: Option<String>,
    },
    EmptyNativeDoc(NativeDocKind),
}

impl WriteIntent {
    /// Picks exactly one write mode from the optional inputs.
    pub fn select(
        content: Option<String>,
        file_url: Option<String>,
        mime_type: Option<String>,
    ) -> Result<Self> {
        match (content, file_url) {
            (Some(_), Some(_)) => Err(ToolError::Validation(
                "content and file_url are mutually exclusive; got both content and file_url"
                    .to_string(),
            )),
            (Some(content), None) => Ok(Self::Inline {
                content,
                mime_type: mime_type.unwrap_or_else(|| DEFAULT_INLINE_MIME_TYPE.to_string()),
            }),
            (None, Some(file_url)) => Ok(Self::RemoteFetch {
                file_url: validate_file_url(&file_url)?,
                mime_type,
            }),
            (None, None) => {
                let Some(mime_type) = mime_type else {
                    return Err(ToolError::Validation(
                        "no write mode selected: provide content, file_url, or a native mime_type \
                         (application/vnd.google-apps.document|spreadsheet|presentation)"
                            .to_string(),
                    ));
                };
                NativeDocKind::from_mime_type(&mime_type)
                    .map(Self::EmptyNativeDoc)
                    .ok_or_else(|| {
                        ToolError::Validation(format!(
                            "mime_type {mime_type:?} cannot create an empty file; without content or \
                             file_url it must be application/vnd.google-apps.document, \
                             application/vnd.google-apps.spreadsheet or \
                             application/vnd.google-apps.presentation"
                        ))
                    })
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Inline { .. } => "inline",
            Self::RemoteFetch { .. } => "file_url",
            Self::EmptyNativeDoc(_) => "empty_native_doc",
        }
    }
}

/// A validated write, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveWrite {
    pub name: String,
    pub folder_id: Option<String>,
    pub intent: WriteIntent,
}

impl DriveWrite {
    pub fn from_arguments(arguments: &serde_json::Value) -> Result<Self> {
        let name = require_non_empty(arguments, "name")?;
        let intent = WriteIntent::select(
            optional_string(arguments, "content")?,
            optional_string(arguments, "file_url")?,
            optional_non_blank(arguments, "mime_type")?,
        )?;
        let folder_id = optional_non_blank(arguments, "folder_id")?;
        Ok(Self {
            name,
            folder_id,
            intent,
        })
    }

    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("name".to_string(), json!(self.name));
        match &self.intent {
            WriteIntent::Inline { content, mime_type } => {
                body.insert("content".to_string(), json!(content));
                body.insert("mime_type".to_string(), json!(mime_type));
            }
            WriteIntent::RemoteFetch {
                file_url,
                mime_type,
            } => {
                body.insert("file_url".to_string(), json!(file_url));
                if let Some(mime_type) = mime_type {
                    body.insert("mime_type".to_string(), json!(mime_type));
                }
            }
            WriteIntent::EmptyNativeDoc(kind) => {
                body.insert("mime_type".to_string(), json!(kind.mime_type()));
            }
        }
        if let Some(folder_id) = &self.folder_id {
            body.insert("folder_id".to_string(), json!(folder_id));
        }
        serde_json::Value::Object(body)
    }
}

/// Listing parameters. `page_token` is an opaque single-use cursor and is
/// forwarded byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveListQuery {
    pub folder_id: Option<String>,
    pub page_token: Option<String>,
    pub page_size: u32,
}

impl DriveListQuery {
    pub fn from_arguments(arguments: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            folder_id: optional_non_blank(arguments, "folder_id")?,
            page_token: optional_string(arguments, "page_token")?.filter(|token| !token.is_empty()),
            page_size: parse_page_size(arguments)?,
        })
    }
}

#[derive(Clone)]
pub struct DrivePlayground {
    client: BridgeClient,
}

impl DrivePlayground {
    pub fn new(client: BridgeClient) -> Self {
        Self { client }
    }

    pub fn resolve_config(&self) -> Result<BridgeConfig> {
        self.client.resolve_config()
    }

    pub fn list_request(query: &DriveListQuery) -> OperationRequest {
        let mut request = OperationRequest::get("/list");
        if let Some(folder_id) = &query.folder_id {
            request = request.with_query("folder_id", folder_id);
        }
        if let Some(page_token) = &query.page_token {
            request = request.with_query("page_token", page_token);
        }
        request.with_query("page_size", query.page_size.to_string())
    }

    pub fn read_request(file_id: &str) -> Result<OperationRequest> {
        let file_id = validate_file_id(file_id)?;
        Ok(OperationRequest::get(format!("/files/{file_id}/content")))
    }

    pub fn write_request(write: &DriveWrite) -> OperationRequest {
        OperationRequest::post_json("/write", write.to_body())
    }

    /// Returns `{"files": [{id, name, mimeType, modifiedTime, size}], "nextPageToken": ...}` as sent.
    pub async fn list(
        &self,
        config: &BridgeConfig,
        query: &DriveListQuery,
    ) -> Result<serde_json::Value> {
        self.client
            .call_json(config, "drive_list", Self::list_request(query))
            .await
    }

    pub async fn read(&self, config: &BridgeConfig, file_id: &str) -> Result<serde_json::Value> {
        let request = Self::read_request(file_id)?;
        let content = self.client.call_text(config, "drive_read", request).await?;
        Ok(json!({ "file_id": file_id, "content": content }))
    }

    pub async fn write(&self, config: &BridgeConfig, write: &DriveWrite) -> Result<serde_json::Value> {
        tracing::debug!(mode = write.intent.mode(), "drive write");
        self.client
            .call_json(config, "drive_write", Self::write_request(write))
            .await
    }

    /// `GET /health`; the bridge answers `{"status":"ok"}`.
    pub async fn health(&self, config: &BridgeConfig) -> Result<serde_json::Value> {
        self.client
            .call_json(config, "drive_health", OperationRequest::get("/health"))
            .await
    }
}

pub fn drive_playground_tools(drive: DrivePlayground) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(DriveListTool {
            drive: drive.clone(),
        }),
        Arc::new(DriveReadTool {
            drive: drive.clone(),
        }),
        Arc::new(DriveWriteTool { drive }),
    ]
}

pub struct DriveListTool {
    drive: DrivePlayground,
}

#[async_trait]
impl Tool for DriveListTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "drive_list".to_string(),
            description: "List files in the Drive playground folder (or one of its subfolders). Pass nextPageToken back as page_token, unmodified, to fetch the next page."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "folder_id": {
                        "type": "string",
                        "description": "Subfolder id. Omit to list the playground root."
                    },
                    "page_token": {
                        "type": "string",
                        "description": "nextPageToken from a previous drive_list call."
                    },
                    "page_size": {
                        "type": "integer",
                        "minimum": PAGE_SIZE_MIN,
                        "maximum": PAGE_SIZE_MAX,
                        "default": DEFAULT_PAGE_SIZE
                    }
                }
            }),
            risk_level: RiskLevel::Low,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "drive_list"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.drive.resolve_config()?;
        let query = DriveListQuery::from_arguments(&arguments)?;
        self.drive.list(&config, &query).await
    }
}

pub struct DriveReadTool {
    drive: DrivePlayground,
}

#[async_trait]
impl Tool for DriveReadTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "drive_read".to_string(),
            description: "Read a file's content as text from the Drive playground folder. Use drive_list to find file ids."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "file_id": { "type": "string" }
                },
                "required": ["file_id"]
            }),
            risk_level: RiskLevel::Low,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "drive_read"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.drive.resolve_config()?;
        let file_id = require_string(&arguments, "file_id")?;
        self.drive.read(&config, &file_id).await
    }
}

pub struct DriveWriteTool {
    drive: DrivePlayground,
}

#[async_trait]
impl Tool for DriveWriteTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "drive_write".to_string(),
            description: "Write a file into the Drive playground folder. Give exactly one of: content (text), file_url (the bridge downloads it), or neither with a Google-native mime_type to create an empty Doc/Sheet/Slides. A file with the same name in the same folder is updated in place and the result is {id, action: \"updated\"}; otherwise {id, action: \"created\"}."
                .to_string(),
            parameters_schema: json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "name": { "type": "string" },
                    "content": { "type": "string" },
                    "file_url": { "type": "string", "description": "http(s) URL to fetch and store." },
                    "mime_type": {
                        "type": "string",
                        "description": "Defaults to text/plain for content. Required for empty native documents."
                    },
                    "folder_id": {
                        "type": "string",
                        "description": "Target subfolder. Omit for the playground root."
                    }
                },
                "required": ["name"]
            }),
            risk_level: RiskLevel::Medium,
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(tool = "drive_write"))]
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let config = self.drive.resolve_config()?;
        let write = DriveWrite::from_arguments(&arguments)?;
        self.drive.write(&config, &write).await
    }
}

fn parse_page_size(arguments: &serde_json::Value) -> Result<u32> {
    match arguments.get("page_size") {
        None | Some(serde_json::Value::Null) => Ok(DEFAULT_PAGE_SIZE),
        Some(value) => {
            let value = value.as_i64().ok_or_else(|| {
                ToolError::Validation(format!("page_size must be an integer, got {value}"))
            })?;
            if !(PAGE_SIZE_MIN..=PAGE_SIZE_MAX).contains(&value) {
                return Err(ToolError::Validation(format!(
                    "page_size must be between {PAGE_SIZE_MIN} and {PAGE_SIZE_MAX}, got {value}"
                )));
            }
            u32::try_from(value)
                .map_err(|_| ToolError::Validation("page_size is out of range".to_string()))
        }
    }
}

fn validate_file_id(file_id: &str) -> Result<&str> {
    if !FILE_ID.is_match(file_id) {
        return Err(ToolError::Validation(format!(
            "file_id {file_id:?} must be a non-empty Drive id (letters, digits, '-' or '_')"
        )));
    }
    Ok(file_id)
}

fn validate_file_url(file_url: &str) -> Result<String> {
    let file_url = file_url.trim();
    let url = Url::parse(file_url)
        .map_err(|e| ToolError::Validation(format!("file_url is not a valid url: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(file_url.to_string()),
        other => Err(ToolError::Validation(format!(
            "file_url must use http or https, got {other}"
        ))),
    }
}
