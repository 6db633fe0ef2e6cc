use crate::models::RelationType;

pub const PATH_APPLICATIONS: &str = "/applications";
pub const PATH_SERVICES: &str = "/services";
pub const PATH_INFRA: &str = "/infra";
pub const PATH_DOMAINS: &str = "/domains";
pub const PATH_PEOPLE: &str = "/people";
pub const PATH_SHARES: &str = "/shares";
pub const PATH_STACKS: &str = "/stacks";
pub const PATH_HEALTHCHECKS: &str = "/healthchecks";
pub const PATH_DASHBOARD_STATS: &str = "/dashboard/stats";
pub const PATH_SEARCH: &str = "/search";
pub const PATH_UPTIME_STREAM: &str = "/healthchecks/uptime/stream";

/// Collection path for entities of `kind`.
#[must_use]
pub const fn collection_path(kind: RelationType) -> &'static str {
    match kind {
        RelationType::Infra => PATH_INFRA,
        RelationType::Service => PATH_SERVICES,
        RelationType::Domain => PATH_DOMAINS,
        RelationType::Person => PATH_PEOPLE,
        RelationType::Share => PATH_SHARES,
        RelationType::Stack => PATH_STACKS,
        RelationType::Health => PATH_HEALTHCHECKS,
    }
}

/// Path segment used under a parent when linking children of `kind`.
#[must_use]
pub const fn link_segment(kind: RelationType) -> &'static str {
    match kind {
        RelationType::Infra => "infra",
        RelationType::Service => "services",
        RelationType::Domain => "domains",
        RelationType::Person => "people",
        RelationType::Share => "shares",
        RelationType::Stack => "stacks",
        RelationType::Health => "healthchecks",
    }
}

pub fn entity_path(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

pub fn application_path(id: &str) -> String {
    entity_path(PATH_APPLICATIONS, id)
}

pub fn service_path(id: &str) -> String {
    entity_path(PATH_SERVICES, id)
}

pub fn healthcheck_path(id: &str) -> String {
    entity_path(PATH_HEALTHCHECKS, id)
}

pub fn healthcheck_execute_path(id: &str) -> String {
    format!("{}/execute", healthcheck_path(id))
}

/// `/applications/{app}/{segment}/{child}`, shared by link, edit and unlink.
pub fn application_link_path(app_id: &str, kind: RelationType, child_id: &str) -> String {
    format!("{}/{}/{child_id}", application_path(app_id), link_segment(kind))
}

/// `/services/{service}/{segment}/{child}`.
pub fn service_link_path(service_id: &str, kind: RelationType, child_id: &str) -> String {
    format!("{}/{}/{child_id}", service_path(service_id), link_segment(kind))
}
