use auto_core::ApiResult;
use auto_core::api::ListQuery;
use auto_core::format::{
    ResponseFormat,
    format_domain_item,
    format_healthcheck_item,
    format_infrastructure_item,
    format_person_item,
    format_service_item,
};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    tool,
    tool_router,
};

use crate::AutoMcp;
use crate::helpers::{json_result, list_result, respond};
use crate::schemas::{
    ExecuteHealthcheckParams,
    ListDomainsParams,
    ListEntitiesParams,
    ListHealthchecksParams,
    ListInfrastructureParams,
    ListPeopleParams,
};

/// Collections readable through the catalog tools.
#[derive(Debug, Clone, Copy)]
enum Catalog {
    Services,
    Infrastructure,
    Domains,
    People,
    Healthchecks,
}

impl Catalog {
    const fn tool(self) -> &'static str {
        match self {
            Self::Services => "auto_list_services",
            Self::Infrastructure => "auto_list_infrastructure",
            Self::Domains => "auto_list_domains",
            Self::People => "auto_list_people",
            Self::Healthchecks => "auto_list_healthchecks",
        }
    }
}

impl AutoMcp {
    async fn catalog_page(
        &self,
        catalog: Catalog,
        query: &ListQuery,
        format: ResponseFormat,
    ) -> CallToolResult {
        let api = self.api();
        let outcome = match catalog {
            Catalog::Services => api
                .list_services(query)
                .await
                .and_then(|page| list_result(&page, format_service_item, format)),
            Catalog::Infrastructure => api
                .list_infrastructure(query)
                .await
                .and_then(|page| list_result(&page, format_infrastructure_item, format)),
            Catalog::Domains => api
                .list_domains(query)
                .await
                .and_then(|page| list_result(&page, format_domain_item, format)),
            Catalog::People => api
                .list_people(query)
                .await
                .and_then(|page| list_result(&page, format_person_item, format)),
            Catalog::Healthchecks => api
                .list_healthchecks(query)
                .await
                .and_then(|page| list_result(&page, format_healthcheck_item, format)),
        };
        respond(catalog.tool(), outcome)
    }

    async fn execute(&self, id: &str) -> ApiResult<CallToolResult> {
        let result = self.api().execute_healthcheck(id).await?;
        json_result(&result)
    }
}

#[tool_router(router = tool_router_catalog, vis = "pub")]
impl AutoMcp {
    #[tool(
        description = "List services with pagination and optional search, environment and status filters."
    )]
    pub(crate) async fn auto_list_services(
        &self,
        Parameters(params): Parameters<ListEntitiesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = params.query()?;
        Ok(self
            .catalog_page(Catalog::Services, &query, params.response_format)
            .await)
    }

    #[tool(
        description = "List infrastructure with pagination and optional search and type (nomad, kubernetes, server, vm, container) filters."
    )]
    pub(crate) async fn auto_list_infrastructure(
        &self,
        Parameters(params): Parameters<ListInfrastructureParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = params.query()?;
        Ok(self
            .catalog_page(Catalog::Infrastructure, &query, params.response_format)
            .await)
    }

    #[tool(description = "List domains with pagination and an optional search filter.")]
    pub(crate) async fn auto_list_domains(
        &self,
        Parameters(params): Parameters<ListDomainsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = params.query()?;
        Ok(self
            .catalog_page(Catalog::Domains, &query, params.response_format)
            .await)
    }

    #[tool(description = "List people with pagination and optional search and is_active filters.")]
    pub(crate) async fn auto_list_people(
        &self,
        Parameters(params): Parameters<ListPeopleParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = params.query()?;
        Ok(self
            .catalog_page(Catalog::People, &query, params.response_format)
            .await)
    }

    #[tool(
        description = "List healthchecks with pagination and optional search, application_id, service_id and is_enabled filters."
    )]
    pub(crate) async fn auto_list_healthchecks(
        &self,
        Parameters(params): Parameters<ListHealthchecksParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = params.query()?;
        Ok(self
            .catalog_page(Catalog::Healthchecks, &query, params.response_format)
            .await)
    }

    #[tool(
        description = "Run a healthcheck (UUID) now and return the probe result: status code, response time, body match and any error."
    )]
    pub(crate) async fn auto_execute_healthcheck(
        &self,
        Parameters(params): Parameters<ExecuteHealthcheckParams>,
    ) -> Result<CallToolResult, ErrorData> {
        params.validate()?;
        Ok(respond("auto_execute_healthcheck", self.execute(&params.id).await))
    }
}
