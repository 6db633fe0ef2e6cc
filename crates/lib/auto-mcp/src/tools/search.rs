use auto_core::ApiResult;
use auto_core::format::{ResponseFormat, format_search_results};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    tool,
    tool_router,
};
use serde_json::json;

use crate::AutoMcp;
use crate::helpers::{bounded, json_result, respond};
use crate::schemas::{DashboardStatsParams, GlobalSearchParams};

impl AutoMcp {
    async fn search(&self, params: &GlobalSearchParams) -> ApiResult<CallToolResult> {
        let results = self.api().global_search(&params.query).await?;
        match params.response_format {
            ResponseFormat::Json => {
                let output = json!({"query": params.query, "results": results});
                let text = serde_json::to_string_pretty(&output)?;
                Ok(bounded(&text, true, Some(output)))
            }
            ResponseFormat::Markdown => Ok(bounded(
                &format_search_results(&params.query, &results),
                false,
                None,
            )),
        }
    }

    async fn stats(&self) -> ApiResult<CallToolResult> {
        let stats = self.api().dashboard_stats().await?;
        let mut result = json_result(&stats)?;
        result.structured_content = Some(json!({ "stats": stats }));
        Ok(result)
    }
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl AutoMcp {
    #[tool(
        description = "Search across all resource types (applications, services, infrastructure, domains, people, network shares) by name, description and other text fields. Results are grouped by resource type."
    )]
    pub(crate) async fn auto_global_search(
        &self,
        Parameters(params): Parameters<GlobalSearchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        params.validate()?;
        Ok(respond("auto_global_search", self.search(&params).await))
    }

    #[tool(
        description = "Get aggregated counts for applications, services, infrastructure, domains, people, healthchecks and other resources."
    )]
    pub(crate) async fn auto_get_dashboard_stats(
        &self,
        Parameters(_): Parameters<DashboardStatsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(respond("auto_get_dashboard_stats", self.stats().await))
    }
}
