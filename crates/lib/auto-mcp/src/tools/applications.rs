use auto_core::ApiResult;
use auto_core::api::ListQuery;
use auto_core::format::{ResponseFormat, format_application_detail, format_application_item};
use auto_store::CreateApplication;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool,
    tool_router,
};

use crate::AutoMcp;
use crate::helpers::{bounded, list_result, respond};
use crate::schemas::{CreateApplicationParams, GetApplicationParams, ListEntitiesParams};

impl AutoMcp {
    async fn applications(
        &self,
        query: &ListQuery,
        format: ResponseFormat,
    ) -> ApiResult<CallToolResult> {
        let page = self.api().list_applications(query).await?;
        list_result(&page, format_application_item, format)
    }

    async fn application(&self, id: &str, format: ResponseFormat) -> ApiResult<CallToolResult> {
        let detail = self.api().get_application(id).await?;
        let text = format_application_detail(&detail, format)?;
        let structured = match format {
            ResponseFormat::Json => Some(serde_json::to_value(&detail)?),
            ResponseFormat::Markdown => None,
        };
        Ok(bounded(&text, true, structured))
    }

    async fn create(&self, payload: &CreateApplication) -> ApiResult<CallToolResult> {
        let app = self.api().create_application(payload).await?;
        let mut result = CallToolResult::success(vec![Content::text(format!(
            "Successfully created application \"{}\" with ID: {}",
            app.name, app.id
        ))]);
        result.structured_content = Some(serde_json::to_value(&app)?);
        Ok(result)
    }
}

#[tool_router(router = tool_router_applications, vis = "pub")]
impl AutoMcp {
    #[tool(
        description = "List applications with pagination (page, per_page 1-100) and optional search, environment (prd, dev, stg, tst) and status (active, inactive, deprecated) filters."
    )]
    pub(crate) async fn auto_list_applications(
        &self,
        Parameters(params): Parameters<ListEntitiesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = params.query()?;
        let outcome = self.applications(&query, params.response_format).await;
        Ok(respond("auto_list_applications", outcome))
    }

    #[tool(
        description = "Get one application (UUID) with its infrastructure, services, domains, people, network shares, stacks, healthchecks and notes."
    )]
    pub(crate) async fn auto_get_application(
        &self,
        Parameters(params): Parameters<GetApplicationParams>,
    ) -> Result<CallToolResult, ErrorData> {
        params.validate()?;
        let outcome = self.application(&params.id, params.response_format).await;
        Ok(respond("auto_get_application", outcome))
    }

    #[tool(
        description = "Create an application. Requires a name (1-255 characters); environment defaults to prd and status to active. Returns the new application with its generated ID."
    )]
    pub(crate) async fn auto_create_application(
        &self,
        Parameters(params): Parameters<CreateApplicationParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let payload = params.payload()?;
        Ok(respond("auto_create_application", self.create(&payload).await))
    }
}
