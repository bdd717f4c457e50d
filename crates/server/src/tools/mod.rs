//! MCP tool implementations.
//!
//! Each tool maps to one host-runtime action on the worker.

pub mod cache;
pub mod sw_activate;
pub mod sw_fetch;
pub mod sw_status;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Encode a tool output as pretty JSON text content.
pub fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Encoding(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
