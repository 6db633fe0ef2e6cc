//! MCP server implementation for Admin Auto.
//!
//! This crate wires the REST client from `auto-core` into rmcp tool handlers.
//! Every tool validates its parameters, issues one backend call and renders
//! the answer through the shared formatting and truncation pipeline.

mod helpers;
mod tools;
pub mod schemas;
pub mod server;


use auto_core::AutoApiClient;
use rmcp::{ServerHandler, handler::server::tool::ToolRouter, tool_handler};
use rmcp::model::{ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"Admin Auto is an inventory of applications, services, infrastructure, domains, people, network shares, tech stacks and healthchecks.

Workflow:
1. When you do not know the resource type or ID, start with `auto_global_search`.
2. Browse collections with the list tools:
   - `auto_list_applications`, `auto_list_services` (search, environment, status filters).
   - `auto_list_infrastructure` (search, type), `auto_list_domains` (search).
   - `auto_list_people` (search, is_active), `auto_list_healthchecks` (search, application_id, service_id, is_enabled).
   Pages are 1-indexed; `per_page` is 1-100 and defaults to 50.
3. `auto_get_application` returns an application with everything linked to it.
4. `auto_create_application` creates an application; `auto_execute_healthcheck` runs a healthcheck now.
5. `auto_get_dashboard_stats` returns counts for every resource type.

Notes:
- IDs are UUIDs.
- `response_format` is `markdown` (default) or `json`; JSON responses also carry structured content.
- Responses longer than 25000 characters are truncated; narrow the query or page through results.
- Backend failures come back as a single `Error: ...` text result.";

/// MCP server wrapper around the Admin Auto client and tool routers.
#[derive(Clone)]
pub struct AutoMcp {
    tool_router: ToolRouter<Self>,
    api: AutoApiClient,
}

impl AutoMcp {
    #[must_use]
    pub fn new(api: AutoApiClient) -> Self {
        let tool_router = Self::tool_router_search()
            + Self::tool_router_applications()
            + Self::tool_router_catalog();
        Self { tool_router, api }
    }

    pub(crate) const fn api(&self) -> &AutoApiClient {
        &self.api
    }
}

#[tool_handler]
impl ServerHandler for AutoMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
