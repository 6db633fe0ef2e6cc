//! Tool parameter schemas.
//!
//! Every struct rejects unknown fields. Constraints that serde cannot express
//! (ranges, UUIDs, URLs) are checked by the `validate`/`query` methods before
//! any upstream call.

use std::fmt;

use auto_core::api::ListQuery;
use auto_core::format::ResponseFormat;
use auto_store::{CreateApplication, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use rmcp::{ErrorData, schemars};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::helpers::invalid_params;

const MAX_NAME_LEN: usize = 255;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$variant_meta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Deployment environment.
    #[derive(Default)]
    Environment {
        #[default]
        Prd => "prd",
        Dev => "dev",
        Stg => "stg",
        Tst => "tst",
    }
}

string_enum! {
    /// Lifecycle status of applications and services.
    #[derive(Default)]
    Status {
        #[default]
        Active => "active",
        Inactive => "inactive",
        Deprecated => "deprecated",
    }
}

string_enum! {
    InfraType {
        Nomad => "nomad",
        Kubernetes => "kubernetes",
        Server => "server",
        Vm => "vm",
        Container => "container",
    }
}

/// Page/size pair shared by every list tool: page >= 1, per page 1..=100.
fn page_query(page: Option<u32>, per_page: Option<u32>) -> Result<ListQuery, ErrorData> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(invalid_params("page must be at least 1"));
    }
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(invalid_params(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}"
        )));
    }
    Ok(ListQuery::new().with("page", page).with("per_page", per_page))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn check_uuid(field: &'static str, value: &str) -> Result<(), ErrorData> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| invalid_params(format!("{field} must be a UUID")))
}

fn check_url(field: &'static str, value: Option<&str>) -> Result<(), ErrorData> {
    match value {
        Some(value) => Url::parse(value)
            .map(|_| ())
            .map_err(|_| invalid_params(format!("{field} must be a valid URL"))),
        None => Ok(()),
    }
}

/// Parameters for the cross-entity search.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GlobalSearchParams {
    /// Search query string.
    pub query: String,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl GlobalSearchParams {
    /// # Errors
    /// Rejects an empty query.
    pub fn validate(&self) -> Result<(), ErrorData> {
        if self.query.is_empty() {
            return Err(invalid_params("query must not be empty"));
        }
        Ok(())
    }
}

/// The dashboard tool takes no arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DashboardStatsParams {}

/// Parameters for listing applications or services.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListEntitiesParams {
    /// Page number (1-indexed), default 1.
    #[schemars(range(min = 1), extend("default" = 1))]
    pub page: Option<u32>,
    /// Items per page (1-100), default 50.
    #[schemars(range(min = 1, max = 100), extend("default" = 50))]
    pub per_page: Option<u32>,
    /// Filter by name/description.
    pub search: Option<String>,
    pub environment: Option<Environment>,
    pub status: Option<Status>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ListEntitiesParams {
    /// # Errors
    /// Rejects out-of-range paging.
    pub fn query(&self) -> Result<ListQuery, ErrorData> {
        Ok(page_query(self.page, self.per_page)?
            .with_opt("search", non_empty(self.search.as_deref()))
            .with_opt("environment", self.environment)
            .with_opt("status", self.status))
    }
}

/// Parameters for listing infrastructure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListInfrastructureParams {
    #[schemars(range(min = 1), extend("default" = 1))]
    pub page: Option<u32>,
    #[schemars(range(min = 1, max = 100), extend("default" = 50))]
    pub per_page: Option<u32>,
    pub search: Option<String>,
    /// Filter by infrastructure type.
    #[serde(rename = "type")]
    pub infra_type: Option<InfraType>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ListInfrastructureParams {
    /// # Errors
    /// Rejects out-of-range paging.
    pub fn query(&self) -> Result<ListQuery, ErrorData> {
        Ok(page_query(self.page, self.per_page)?
            .with_opt("search", non_empty(self.search.as_deref()))
            .with_opt("type", self.infra_type))
    }
}

/// Parameters for listing domains.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDomainsParams {
    #[schemars(range(min = 1), extend("default" = 1))]
    pub page: Option<u32>,
    #[schemars(range(min = 1, max = 100), extend("default" = 50))]
    pub per_page: Option<u32>,
    pub search: Option<String>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ListDomainsParams {
    /// # Errors
    /// Rejects out-of-range paging.
    pub fn query(&self) -> Result<ListQuery, ErrorData> {
        Ok(page_query(self.page, self.per_page)?.with_opt("search", non_empty(self.search.as_deref())))
    }
}

/// Parameters for listing people.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListPeopleParams {
    #[schemars(range(min = 1), extend("default" = 1))]
    pub page: Option<u32>,
    #[schemars(range(min = 1, max = 100), extend("default" = 50))]
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ListPeopleParams {
    /// # Errors
    /// Rejects out-of-range paging.
    pub fn query(&self) -> Result<ListQuery, ErrorData> {
        Ok(page_query(self.page, self.per_page)?
            .with_opt("search", non_empty(self.search.as_deref()))
            .with_opt("is_active", self.is_active))
    }
}

/// Parameters for listing healthchecks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListHealthchecksParams {
    #[schemars(range(min = 1), extend("default" = 1))]
    pub page: Option<u32>,
    #[schemars(range(min = 1, max = 100), extend("default" = 50))]
    pub per_page: Option<u32>,
    pub search: Option<String>,
    /// Only healthchecks targeting this application (UUID).
    pub application_id: Option<String>,
    /// Only healthchecks targeting this service (UUID).
    pub service_id: Option<String>,
    pub is_enabled: Option<bool>,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl ListHealthchecksParams {
    /// # Errors
    /// Rejects out-of-range paging and malformed ids.
    pub fn query(&self) -> Result<ListQuery, ErrorData> {
        if let Some(id) = &self.application_id {
            check_uuid("application_id", id)?;
        }
        if let Some(id) = &self.service_id {
            check_uuid("service_id", id)?;
        }
        Ok(page_query(self.page, self.per_page)?
            .with_opt("search", non_empty(self.search.as_deref()))
            .with_opt("application_id", self.application_id.as_deref())
            .with_opt("service_id", self.service_id.as_deref())
            .with_opt("is_enabled", self.is_enabled))
    }
}

/// Parameters for fetching one application.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetApplicationParams {
    /// Application ID (UUID).
    pub id: String,
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl GetApplicationParams {
    /// # Errors
    /// Rejects a malformed id.
    pub fn validate(&self) -> Result<(), ErrorData> {
        check_uuid("id", &self.id)
    }
}

/// Parameters for creating an application.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateApplicationParams {
    /// Application name, 1-255 characters.
    pub name: String,
    pub description: Option<String>,
    /// Git repository URL.
    pub repository_url: Option<String>,
    /// Defaults to `prd`.
    #[serde(default)]
    pub environment: Environment,
    /// Application URL.
    pub url: Option<String>,
    /// Defaults to `active`.
    #[serde(default)]
    pub status: Status,
}

impl CreateApplicationParams {
    /// Validates the request and builds the create payload.
    ///
    /// # Errors
    /// Rejects an empty or overlong name and malformed URLs.
    pub fn payload(&self) -> Result<CreateApplication, ErrorData> {
        let len = self.name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(invalid_params(format!(
                "name must be between 1 and {MAX_NAME_LEN} characters"
            )));
        }
        check_url("repository_url", self.repository_url.as_deref())?;
        check_url("url", self.url.as_deref())?;
        Ok(CreateApplication {
            name: self.name.clone(),
            description: self.description.clone(),
            repository_url: self.repository_url.clone(),
            environment: self.environment.as_str().to_string(),
            url: self.url.clone(),
            status: self.status.as_str().to_string(),
        })
    }
}

/// Parameters for running a healthcheck.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExecuteHealthcheckParams {
    /// Healthcheck ID (UUID).
    pub id: String,
}

impl ExecuteHealthcheckParams {
    /// # Errors
    /// Rejects a malformed id.
    pub fn validate(&self) -> Result<(), ErrorData> {
        check_uuid("id", &self.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn list_params_reject_unknown_fields() {
        let err = serde_json::from_value::<ListEntitiesParams>(json!({"page": 1, "limit": 5}))
            .expect_err("unknown field");
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn list_params_reject_unknown_enum_values() {
        assert!(
            serde_json::from_value::<ListEntitiesParams>(json!({"environment": "prod"})).is_err()
        );
        assert!(
            serde_json::from_value::<ListInfrastructureParams>(json!({"type": "lambda"})).is_err()
        );
    }

    #[test]
    fn paging_defaults_and_bounds() {
        let query = ListEntitiesParams::default().query().expect("defaults");
        assert_eq!(query.get("page"), Some("1"));
        assert_eq!(query.get("per_page"), Some("50"));

        for (page, per_page) in [(Some(0), None), (None, Some(0)), (None, Some(101))] {
            let params = ListEntitiesParams {
                page,
                per_page,
                ..ListEntitiesParams::default()
            };
            assert_eq!(
                params.query().expect_err("out of range").code,
                rmcp::model::ErrorCode::INVALID_PARAMS
            );
        }
    }

    #[test]
    fn paging_limits_are_advertised_in_the_schema() {
        let schema = serde_json::to_value(schemars::schema_for!(ListHealthchecksParams))
            .expect("schema json");
        let page = &schema["properties"]["page"];
        assert_eq!(page["minimum"], json!(1));
        assert_eq!(page["default"], json!(1));

        let per_page = &schema["properties"]["per_page"];
        assert_eq!(per_page["minimum"], json!(1));
        assert_eq!(per_page["maximum"], json!(100));
        assert_eq!(per_page["default"], json!(50));
    }

    #[test]
    fn only_set_filters_are_forwarded() {
        let params: ListEntitiesParams = serde_json::from_value(json!({
            "search": "",
            "environment": "stg"
        }))
        .expect("params");
        let query = params.query().expect("query");
        assert_eq!(query.get("search"), None);
        assert_eq!(query.get("environment"), Some("stg"));
        assert_eq!(query.get("status"), None);

        let infra: ListInfrastructureParams =
            serde_json::from_value(json!({"type": "kubernetes"})).expect("params");
        assert_eq!(infra.query().expect("query").get("type"), Some("kubernetes"));
    }

    #[test]
    fn healthcheck_filters_require_uuids() {
        let params = ListHealthchecksParams {
            application_id: Some("not-a-uuid".to_string()),
            ..ListHealthchecksParams::default()
        };
        assert!(params.query().is_err());

        let params = ListHealthchecksParams {
            service_id: Some("67e55044-10b1-426f-9247-bb680e5fe0c8".to_string()),
            is_enabled: Some(false),
            ..ListHealthchecksParams::default()
        };
        let query = params.query().expect("query");
        assert_eq!(query.get("is_enabled"), Some("false"));
    }

    #[test]
    fn create_payload_applies_defaults_and_checks_urls() {
        let params: CreateApplicationParams =
            serde_json::from_value(json!({"name": "Portal"})).expect("params");
        let payload = params.payload().expect("payload");
        assert_eq!(payload.environment, "prd");
        assert_eq!(payload.status, "active");

        let params: CreateApplicationParams =
            serde_json::from_value(json!({"name": "Portal", "url": "not a url"})).expect("params");
        assert!(params.payload().is_err());

        let params: CreateApplicationParams =
            serde_json::from_value(json!({"name": "x".repeat(256)})).expect("params");
        assert!(params.payload().is_err());
    }
}
