use std::sync::Arc;

use auto_store::schema::{
    PATH_APPLICATIONS,
    PATH_DASHBOARD_STATS,
    PATH_DOMAINS,
    PATH_HEALTHCHECKS,
    PATH_INFRA,
    PATH_PEOPLE,
    PATH_SEARCH,
    PATH_SERVICES,
    PATH_SHARES,
    PATH_STACKS,
    application_link_path,
    application_path,
    healthcheck_execute_path,
    healthcheck_path,
    service_link_path,
    service_path,
};
use auto_store::{
    Application,
    ApplicationDetail,
    CreateApplication,
    CreateDomain,
    CreateHealthcheck,
    CreateInfra,
    CreateNetworkShare,
    CreatePerson,
    CreateService,
    CreateStack,
    DashboardStats,
    Domain,
    Healthcheck,
    HealthcheckDetail,
    HealthcheckResult,
    Infrastructure,
    NetworkShare,
    PaginatedResponse,
    Person,
    RelationType,
    SearchResults,
    Service,
    ServiceDetail,
    Stack,
    UpdateHealthcheck,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::{ApiError, ApiMethod, ApiRequest, ApiResult, ApiTransport, ListQuery};

/// Typed access to the Admin Auto REST endpoints.
#[derive(Clone)]
pub struct AutoApiClient {
    transport: Arc<dyn ApiTransport>,
}

impl AutoApiClient {
    pub fn new<T: ApiTransport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    #[must_use]
    pub fn from_arc(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Sends a raw request, logging failures with their classification.
    ///
    /// # Errors
    /// Returns the transport's `ApiError` unchanged.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<Option<Value>> {
        let method = request.method;
        let path = request.path.clone();
        let result = self.transport.send(request).await;
        if let Err(err) = &result {
            warn!(
                method = method.as_str(),
                path = %path,
                kind = err.label(),
                "admin auto request failed: {err}"
            );
        }
        result
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let path = request.path.clone();
        let value = self
            .send(request)
            .await?
            .ok_or_else(|| ApiError::Decode(format!("empty response body from {path}")))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn execute(&self, request: ApiRequest) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }

    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> ApiResult<PaginatedResponse<T>> {
        self.fetch(ApiRequest::get(path).with_query(query)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        self.fetch(ApiRequest::new(ApiMethod::Post, path).with_body(body))
            .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_applications(
        &self,
        query: &ListQuery,
    ) -> ApiResult<PaginatedResponse<Application>> {
        self.list(PATH_APPLICATIONS, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn get_application(&self, id: &str) -> ApiResult<ApplicationDetail> {
        self.fetch(ApiRequest::get(application_path(id))).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_application(&self, payload: &CreateApplication) -> ApiResult<Application> {
        self.post(PATH_APPLICATIONS, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_services(&self, query: &ListQuery) -> ApiResult<PaginatedResponse<Service>> {
        self.list(PATH_SERVICES, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn get_service(&self, id: &str) -> ApiResult<ServiceDetail> {
        self.fetch(ApiRequest::get(service_path(id))).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_service(&self, payload: &CreateService) -> ApiResult<Service> {
        self.post(PATH_SERVICES, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_infrastructure(
        &self,
        query: &ListQuery,
    ) -> ApiResult<PaginatedResponse<Infrastructure>> {
        self.list(PATH_INFRA, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_infrastructure(&self, payload: &CreateInfra) -> ApiResult<Infrastructure> {
        self.post(PATH_INFRA, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_domains(&self, query: &ListQuery) -> ApiResult<PaginatedResponse<Domain>> {
        self.list(PATH_DOMAINS, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_domain(&self, payload: &CreateDomain) -> ApiResult<Domain> {
        self.post(PATH_DOMAINS, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_people(&self, query: &ListQuery) -> ApiResult<PaginatedResponse<Person>> {
        self.list(PATH_PEOPLE, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_person(&self, payload: &CreatePerson) -> ApiResult<Person> {
        self.post(PATH_PEOPLE, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_shares(
        &self,
        query: &ListQuery,
    ) -> ApiResult<PaginatedResponse<NetworkShare>> {
        self.list(PATH_SHARES, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_share(&self, payload: &CreateNetworkShare) -> ApiResult<NetworkShare> {
        self.post(PATH_SHARES, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_stacks(&self, query: &ListQuery) -> ApiResult<PaginatedResponse<Stack>> {
        self.list(PATH_STACKS, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_stack(&self, payload: &CreateStack) -> ApiResult<Stack> {
        self.post(PATH_STACKS, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn list_healthchecks(
        &self,
        query: &ListQuery,
    ) -> ApiResult<PaginatedResponse<Healthcheck>> {
        self.list(PATH_HEALTHCHECKS, query).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn get_healthcheck(&self, id: &str) -> ApiResult<HealthcheckDetail> {
        self.fetch(ApiRequest::get(healthcheck_path(id))).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn create_healthcheck(&self, payload: &CreateHealthcheck) -> ApiResult<Healthcheck> {
        self.post(PATH_HEALTHCHECKS, payload).await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn update_healthcheck(
        &self,
        id: &str,
        payload: &UpdateHealthcheck,
    ) -> ApiResult<Healthcheck> {
        let body = serde_json::to_value(payload)?;
        self.fetch(ApiRequest::new(ApiMethod::Put, healthcheck_path(id)).with_body(body))
            .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn delete_healthcheck(&self, id: &str) -> ApiResult<()> {
        self.execute(ApiRequest::delete(healthcheck_path(id))).await
    }

    /// Runs the healthcheck on the backend and returns the probe result.
    ///
    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn execute_healthcheck(&self, id: &str) -> ApiResult<HealthcheckResult> {
        self.fetch(ApiRequest::get(healthcheck_execute_path(id))).await
    }

    /// Links `child_id` of `kind` to an application with optional metadata.
    ///
    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn link_application<M: Serialize + Sync>(
        &self,
        app_id: &str,
        kind: RelationType,
        child_id: &str,
        metadata: &M,
    ) -> ApiResult<()> {
        let body = serde_json::to_value(metadata)?;
        self.execute(
            ApiRequest::new(ApiMethod::Post, application_link_path(app_id, kind, child_id))
                .with_body(body),
        )
        .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn unlink_application(
        &self,
        app_id: &str,
        kind: RelationType,
        child_id: &str,
    ) -> ApiResult<()> {
        self.execute(ApiRequest::delete(application_link_path(app_id, kind, child_id)))
            .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn link_service<M: Serialize + Sync>(
        &self,
        service_id: &str,
        kind: RelationType,
        child_id: &str,
        metadata: &M,
    ) -> ApiResult<()> {
        let body = serde_json::to_value(metadata)?;
        self.execute(
            ApiRequest::new(ApiMethod::Post, service_link_path(service_id, kind, child_id))
                .with_body(body),
        )
        .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn unlink_service(
        &self,
        service_id: &str,
        kind: RelationType,
        child_id: &str,
    ) -> ApiResult<()> {
        self.execute(ApiRequest::delete(service_link_path(service_id, kind, child_id)))
            .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn global_search(&self, query: &str) -> ApiResult<SearchResults> {
        let query = ListQuery::new().with("q", query);
        self.fetch(ApiRequest::get(PATH_SEARCH).with_query(&query))
            .await
    }

    /// # Errors
    /// Propagates any `ApiError` from the backend.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.fetch(ApiRequest::get(PATH_DASHBOARD_STATS)).await
    }
}
