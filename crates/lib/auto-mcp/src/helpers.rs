use std::borrow::Cow;

use auto_core::format::{ResponseFormat, format_list, truncate_if_needed};
use auto_core::{ApiError, ApiResult};
use auto_store::PaginatedResponse;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub(crate) fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub(crate) fn invalid_params(message: impl Into<Cow<'static, str>>) -> ErrorData {
    mcp_err(ErrorCode::INVALID_PARAMS, message)
}

/// Turns the outcome of a tool body into its result. Upstream failures become
/// a single `Error: ...` text entry rather than a protocol error.
pub(crate) fn respond(tool: &'static str, outcome: ApiResult<CallToolResult>) -> CallToolResult {
    outcome.unwrap_or_else(|err| {
        debug!(tool, kind = err.label(), "tool call failed upstream");
        error_result(&err)
    })
}

pub(crate) fn error_result(err: &ApiError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error: {err}"))])
}

/// Bounded text result, optionally carrying the untruncated payload as
/// structured content.
pub(crate) fn bounded(text: &str, has_metadata: bool, structured: Option<Value>) -> CallToolResult {
    let truncated = truncate_if_needed(text, has_metadata);
    let mut result = CallToolResult::success(vec![Content::text(truncated.content)]);
    result.structured_content = structured;
    result
}

/// Pretty JSON text with the same value attached as structured content.
pub(crate) fn json_result(value: &impl Serialize) -> ApiResult<CallToolResult> {
    let structured = serde_json::to_value(value)?;
    let text = serde_json::to_string_pretty(&structured)?;
    let mut result = CallToolResult::success(vec![Content::text(text)]);
    result.structured_content = Some(structured);
    Ok(result)
}

/// One formatted page; JSON responses also carry the page as structured
/// content.
pub(crate) fn list_result<T: Serialize>(
    page: &PaginatedResponse<T>,
    item_formatter: impl Fn(&T) -> String,
    format: ResponseFormat,
) -> ApiResult<CallToolResult> {
    let text = format_list(page, item_formatter, format)?;
    let structured = match format {
        ResponseFormat::Json => Some(serde_json::to_value(page)?),
        ResponseFormat::Markdown => None,
    };
    Ok(bounded(&text, true, structured))
}
