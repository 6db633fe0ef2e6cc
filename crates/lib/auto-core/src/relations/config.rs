use std::collections::BTreeMap;
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use auto_store::{
    ApplicationDetail,
    CreateDomain,
    CreateHealthcheck,
    CreateInfra,
    CreateNetworkShare,
    CreatePerson,
    CreateService,
    CreateStack,
    CreatedEntity,
    EntityListItem,
    LinkDomain,
    LinkInfra,
    LinkNetworkShare,
    LinkPerson,
    LinkService,
    LinkStack,
    PageRequest,
    PaginatedResponse,
    RelationType,
    ServiceDetail,
    UpdateHealthcheck,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::{RelationEntity, name_or_fqdn};
use crate::api::{ApiError, ApiResult, AutoApiClient, ListQuery};

pub type OpFuture<T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'static>>;
pub type ListFn =
    Arc<dyn Fn(PageRequest) -> OpFuture<PaginatedResponse<EntityListItem>> + Send + Sync>;
pub type CreateFn = Arc<dyn Fn(Value) -> OpFuture<CreatedEntity> + Send + Sync>;
pub type LinkFn = Arc<dyn Fn(String, Value) -> OpFuture<()> + Send + Sync>;
pub type UnlinkFn = Arc<dyn Fn(String) -> OpFuture<()> + Send + Sync>;
pub type EditFn = Arc<dyn Fn(String, Value) -> OpFuture<Value> + Send + Sync>;
pub type FetchForEditFn = Arc<dyn Fn(RelationEntity) -> OpFuture<RelationEntity> + Send + Sync>;
pub type ExcludeIdsFn = Arc<dyn Fn() -> Vec<String> + Send + Sync>;
pub type CreateFormDefaultsFn = Arc<dyn Fn() -> CreateFormDefaults + Send + Sync>;

/// Live view of the parent entity, read every time it is called.
pub type ParentAccessor<T> = Arc<dyn Fn() -> Option<T> + Send + Sync>;

/// Which path the link flow takes after an entity is selected or created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Link immediately with empty metadata.
    Direct,
    /// Collect link metadata in a form step first.
    Form,
    /// The child only exists attached to its parent; creating it is the link.
    CreateOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationTitles {
    pub title: &'static str,
    pub singular: &'static str,
    pub empty_message: &'static str,
}

impl RelationTitles {
    #[must_use]
    pub const fn for_kind(kind: RelationType) -> Self {
        let (title, singular, empty_message) = match kind {
            RelationType::Infra => ("Infrastructure", "Infra", "No infrastructure linked"),
            RelationType::Service => ("Services", "Service", "No services linked"),
            RelationType::Domain => ("Domains", "Domain", "No domains linked"),
            RelationType::Person => ("People", "Person", "No people linked"),
            RelationType::Share => ("Storage", "Storage", "No storage linked"),
            RelationType::Stack => ("Tech Stack", "Stack", "No technologies linked"),
            RelationType::Health => ("Healthchecks", "Healthcheck", "No healthchecks configured"),
        };
        Self {
            title,
            singular,
            empty_message,
        }
    }
}

/// The four operations every relation type provides.
#[derive(Clone)]
pub struct RelationOps {
    pub list: ListFn,
    pub create: CreateFn,
    pub link: LinkFn,
    pub unlink: UnlinkFn,
}

/// Values a create form starts with, derived from the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFormDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

/// Behavior of one relation type: titles, operations and capability flags.
#[derive(Clone)]
pub struct RelationConfig {
    kind: RelationType,
    titles: RelationTitles,
    mode: LinkMode,
    can_edit: bool,
    ops: RelationOps,
    edit: Option<EditFn>,
    fetch_for_edit: Option<FetchForEditFn>,
    exclude_ids: Option<ExcludeIdsFn>,
    display_name: fn(&Value) -> String,
    create_form_defaults: Option<CreateFormDefaultsFn>,
}

impl RelationConfig {
    #[must_use]
    pub fn new(kind: RelationType, titles: RelationTitles, mode: LinkMode, ops: RelationOps) -> Self {
        Self {
            kind,
            titles,
            mode,
            can_edit: true,
            ops,
            edit: None,
            fetch_for_edit: None,
            exclude_ids: None,
            display_name: name_or_fqdn,
            create_form_defaults: None,
        }
    }

    #[must_use]
    pub const fn with_can_edit(mut self, can_edit: bool) -> Self {
        self.can_edit = can_edit;
        self
    }

    #[must_use]
    pub fn with_edit(mut self, edit: EditFn) -> Self {
        self.edit = Some(edit);
        self
    }

    #[must_use]
    pub fn with_fetch_for_edit(mut self, fetch: FetchForEditFn) -> Self {
        self.fetch_for_edit = Some(fetch);
        self
    }

    #[must_use]
    pub fn with_exclude_ids(mut self, exclude_ids: ExcludeIdsFn) -> Self {
        self.exclude_ids = Some(exclude_ids);
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: fn(&Value) -> String) -> Self {
        self.display_name = display_name;
        self
    }

    #[must_use]
    pub fn with_create_form_defaults(mut self, defaults: CreateFormDefaultsFn) -> Self {
        self.create_form_defaults = Some(defaults);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> RelationType {
        self.kind
    }

    #[must_use]
    pub const fn titles(&self) -> RelationTitles {
        self.titles
    }

    #[must_use]
    pub const fn singular_title(&self) -> &'static str {
        self.titles.singular
    }

    #[must_use]
    pub const fn mode(&self) -> LinkMode {
        self.mode
    }

    #[must_use]
    pub const fn has_link_form(&self) -> bool {
        matches!(self.mode, LinkMode::Form)
    }

    #[must_use]
    pub const fn create_only(&self) -> bool {
        matches!(self.mode, LinkMode::CreateOnly)
    }

    #[must_use]
    pub const fn can_edit(&self) -> bool {
        self.can_edit
    }

    #[must_use]
    pub const fn has_fetch_for_edit(&self) -> bool {
        self.fetch_for_edit.is_some()
    }

    /// Ids already linked to the parent, read from the live parent snapshot.
    #[must_use]
    pub fn exclude_ids(&self) -> Vec<String> {
        self.exclude_ids
            .as_ref()
            .map(|exclude_ids| exclude_ids())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn display_name(&self, relation: &Value) -> String {
        (self.display_name)(relation)
    }

    /// Wraps a relation summary from the parent view.
    #[must_use]
    pub fn entity_from(&self, relation: Value) -> Option<RelationEntity> {
        RelationEntity::from_value(relation, self.display_name)
    }

    #[must_use]
    pub fn create_form_defaults(&self) -> Option<CreateFormDefaults> {
        self.create_form_defaults.as_ref().map(|defaults| defaults())
    }

    pub fn list(&self, request: PageRequest) -> OpFuture<PaginatedResponse<EntityListItem>> {
        (self.ops.list)(request)
    }

    pub fn create(&self, payload: Value) -> OpFuture<CreatedEntity> {
        (self.ops.create)(payload)
    }

    pub fn link(&self, child_id: String, metadata: Value) -> OpFuture<()> {
        (self.ops.link)(child_id, metadata)
    }

    pub fn unlink(&self, child_id: String) -> OpFuture<()> {
        (self.ops.unlink)(child_id)
    }

    /// Applies edited metadata, re-linking when no edit operation exists.
    pub fn update(&self, child_id: String, metadata: Value) -> OpFuture<()> {
        match &self.edit {
            Some(edit) => {
                let pending = edit(child_id, metadata);
                Box::pin(async move { pending.await.map(|_| ()) })
            }
            None => self.link(child_id, metadata),
        }
    }

    /// Loads the full entity for editing, or hands back the summary unchanged.
    pub fn fetch_for_edit(&self, relation: RelationEntity) -> OpFuture<RelationEntity> {
        match &self.fetch_for_edit {
            Some(fetch) => fetch(relation),
            None => Box::pin(future::ready(Ok(relation))),
        }
    }
}

/// Relation configs for one parent entity, keyed by relation type.
#[derive(Clone, Default)]
pub struct RelationConfigTable {
    configs: BTreeMap<RelationType, Arc<RelationConfig>>,
}

impl RelationConfigTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: impl IntoIterator<Item = RelationConfig>) -> Self {
        Self {
            configs: configs
                .into_iter()
                .map(|config| (config.kind(), Arc::new(config)))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, kind: RelationType) -> Option<Arc<RelationConfig>> {
        self.configs.get(&kind).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = RelationType> + '_ {
        self.configs.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// All seven relation types for an application detail view.
    pub fn for_application(
        api: &AutoApiClient,
        app_id: &str,
        app: ParentAccessor<ApplicationDetail>,
    ) -> Self {
        let mut configs = Vec::with_capacity(RelationType::ALL.len());
        for kind in [
            RelationType::Infra,
            RelationType::Service,
            RelationType::Domain,
            RelationType::Person,
            RelationType::Share,
        ] {
            let link = match kind {
                RelationType::Person => application_link::<LinkPerson>(api, app_id, kind),
                RelationType::Share => application_link::<LinkNetworkShare>(api, app_id, kind),
                RelationType::Service => application_link::<LinkService>(api, app_id, kind),
                RelationType::Domain => application_link::<LinkDomain>(api, app_id, kind),
                _ => application_link::<LinkInfra>(api, app_id, kind),
            };
            let ops = catalog_ops(api, kind, link, application_unlink(api, app_id, kind));
            configs.push(
                RelationConfig::new(kind, RelationTitles::for_kind(kind), LinkMode::Form, ops)
                    .with_exclude_ids(application_linked_ids(&app, kind)),
            );
        }

        let stack = RelationType::Stack;
        let ops = catalog_ops(
            api,
            stack,
            application_link::<LinkStack>(api, app_id, stack),
            application_unlink(api, app_id, stack),
        );
        configs.push(
            RelationConfig::new(stack, RelationTitles::for_kind(stack), LinkMode::Direct, ops)
                .with_can_edit(false)
                .with_exclude_ids(application_linked_ids(&app, stack)),
        );

        let defaults: CreateFormDefaultsFn = {
            let app_id = app_id.to_string();
            Arc::new(move || {
                let name = app().map(|detail| detail.application.name);
                CreateFormDefaults {
                    application_id: Some(app_id.clone()),
                    service_id: None,
                    name: name.clone(),
                    target_name: name,
                }
            })
        };
        configs.push(healthcheck_config(api, defaults));

        Self::from_configs(configs)
    }

    /// Infrastructure and healthchecks for a service detail view.
    pub fn for_service(
        api: &AutoApiClient,
        service_id: &str,
        service: ParentAccessor<ServiceDetail>,
    ) -> Self {
        let infra = RelationType::Infra;
        let link: LinkFn = {
            let api = api.clone();
            let service_id = service_id.to_string();
            link_fn(move |child_id: String, metadata: LinkInfra| {
                let api = api.clone();
                let service_id = service_id.clone();
                async move {
                    api.link_service(&service_id, infra, &child_id, &metadata)
                        .await
                }
            })
        };
        let unlink: UnlinkFn = {
            let api = api.clone();
            let service_id = service_id.to_string();
            unlink_fn(move |child_id: String| {
                let api = api.clone();
                let service_id = service_id.clone();
                async move { api.unlink_service(&service_id, infra, &child_id).await }
            })
        };
        let exclude_ids: ExcludeIdsFn = {
            let service = Arc::clone(&service);
            Arc::new(move || {
                service()
                    .map(|detail| detail.linked_ids(infra))
                    .unwrap_or_default()
            })
        };
        let infra_config = RelationConfig::new(
            infra,
            RelationTitles::for_kind(infra),
            LinkMode::Form,
            catalog_ops(api, infra, link, unlink),
        )
        .with_exclude_ids(exclude_ids);

        let defaults: CreateFormDefaultsFn = {
            let service_id = service_id.to_string();
            Arc::new(move || {
                let name = service().map(|detail| detail.service.name);
                CreateFormDefaults {
                    application_id: None,
                    service_id: Some(service_id.clone()),
                    name: name.clone(),
                    target_name: name,
                }
            })
        };

        Self::from_configs([infra_config, healthcheck_config(api, defaults)])
    }
}

fn decode<P: DeserializeOwned>(payload: Value) -> ApiResult<P> {
    serde_json::from_value(payload).map_err(|err| ApiError::validation(err.to_string()))
}

fn to_created(created: &impl Serialize) -> ApiResult<CreatedEntity> {
    Ok(serde_json::from_value(serde_json::to_value(created)?)?)
}

/// Adapts a typed list call into a selector listing.
pub fn list_fn<T, F, Fut>(list: F) -> ListFn
where
    T: Into<EntityListItem> + Send + 'static,
    F: Fn(ListQuery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<PaginatedResponse<T>>> + Send + 'static,
{
    Arc::new(move |request: PageRequest| -> OpFuture<PaginatedResponse<EntityListItem>> {
        let pending = list(ListQuery::from_page(&request));
        Box::pin(async move { Ok(pending.await?.map(Into::into)) })
    })
}

/// Adapts a typed create call; the payload is validated before the call.
pub fn create_fn<P, T, F, Fut>(create: F) -> CreateFn
where
    P: DeserializeOwned,
    T: Serialize + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move |payload: Value| -> OpFuture<CreatedEntity> {
        match decode::<P>(payload) {
            Ok(payload) => {
                let pending = create(payload);
                Box::pin(async move { to_created(&pending.await?) })
            }
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    })
}

/// Adapts a typed link call; the metadata is validated before the call.
pub fn link_fn<M, F, Fut>(link: F) -> LinkFn
where
    M: DeserializeOwned,
    F: Fn(String, M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<()>> + Send + 'static,
{
    Arc::new(move |child_id: String, metadata: Value| -> OpFuture<()> {
        match decode::<M>(metadata) {
            Ok(metadata) => Box::pin(link(child_id, metadata)),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    })
}

pub fn unlink_fn<F, Fut>(unlink: F) -> UnlinkFn
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<()>> + Send + 'static,
{
    Arc::new(move |child_id: String| -> OpFuture<()> { Box::pin(unlink(child_id)) })
}

pub fn edit_fn<M, T, F, Fut>(edit: F) -> EditFn
where
    M: DeserializeOwned,
    T: Serialize + Send + 'static,
    F: Fn(String, M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move |child_id: String, metadata: Value| -> OpFuture<Value> {
        match decode::<M>(metadata) {
            Ok(metadata) => {
                let pending = edit(child_id, metadata);
                Box::pin(async move { Ok(serde_json::to_value(pending.await?)?) })
            }
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    })
}

/// Loads the full record for a relation by id.
pub fn fetch_fn<T, F, Fut>(fetch: F) -> FetchForEditFn
where
    T: Serialize + Send + 'static,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move |relation: RelationEntity| -> OpFuture<RelationEntity> {
        let pending = fetch(relation.id);
        Box::pin(async move {
            let value = serde_json::to_value(pending.await?)?;
            RelationEntity::from_value(value, name_or_fqdn)
                .ok_or_else(|| ApiError::Decode("loaded record has no id".to_string()))
        })
    })
}

fn application_link<M>(api: &AutoApiClient, app_id: &str, kind: RelationType) -> LinkFn
where
    M: DeserializeOwned + Serialize + Send + Sync + 'static,
{
    let api = api.clone();
    let app_id = app_id.to_string();
    link_fn(move |child_id: String, metadata: M| {
        let api = api.clone();
        let app_id = app_id.clone();
        async move {
            api.link_application(&app_id, kind, &child_id, &metadata)
                .await
        }
    })
}

fn application_unlink(api: &AutoApiClient, app_id: &str, kind: RelationType) -> UnlinkFn {
    let api = api.clone();
    let app_id = app_id.to_string();
    unlink_fn(move |child_id: String| {
        let api = api.clone();
        let app_id = app_id.clone();
        async move { api.unlink_application(&app_id, kind, &child_id).await }
    })
}

fn application_linked_ids(
    app: &ParentAccessor<ApplicationDetail>,
    kind: RelationType,
) -> ExcludeIdsFn {
    let app = Arc::clone(app);
    Arc::new(move || {
        app()
            .map(|detail| detail.linked_ids(kind))
            .unwrap_or_default()
    })
}

/// List and create operations against the shared catalog of `kind`.
fn catalog_ops(api: &AutoApiClient, kind: RelationType, link: LinkFn, unlink: UnlinkFn) -> RelationOps {
    let client = api.clone();
    let (list, create) = match kind {
        RelationType::Infra => (
            list_fn({
                let api = client.clone();
                move |query: ListQuery| {
                    let api = api.clone();
                    async move { api.list_infrastructure(&query).await }
                }
            }),
            create_fn(move |payload: CreateInfra| {
                let api = client.clone();
                async move { api.create_infrastructure(&payload).await }
            }),
        ),
        RelationType::Service => (
            list_fn({
                let api = client.clone();
                move |query: ListQuery| {
                    let api = api.clone();
                    async move { api.list_services(&query).await }
                }
            }),
            create_fn(move |payload: CreateService| {
                let api = client.clone();
                async move { api.create_service(&payload).await }
            }),
        ),
        RelationType::Domain => (
            list_fn({
                let api = client.clone();
                move |query: ListQuery| {
                    let api = api.clone();
                    async move { api.list_domains(&query).await }
                }
            }),
            create_fn(move |payload: CreateDomain| {
                let api = client.clone();
                async move { api.create_domain(&payload).await }
            }),
        ),
        RelationType::Person => (
            list_fn({
                let api = client.clone();
                move |query: ListQuery| {
                    let api = api.clone();
                    async move { api.list_people(&query).await }
                }
            }),
            create_fn(move |payload: CreatePerson| {
                let api = client.clone();
                async move { api.create_person(&payload).await }
            }),
        ),
        RelationType::Share => (
            list_fn({
                let api = client.clone();
                move |query: ListQuery| {
                    let api = api.clone();
                    async move { api.list_shares(&query).await }
                }
            }),
            create_fn(move |payload: CreateNetworkShare| {
                let api = client.clone();
                async move { api.create_share(&payload).await }
            }),
        ),
        RelationType::Stack => (
            list_fn({
                let api = client.clone();
                move |query: ListQuery| {
                    let api = api.clone();
                    async move { api.list_stacks(&query).await }
                }
            }),
            create_fn(move |payload: CreateStack| {
                let api = client.clone();
                async move { api.create_stack(&payload).await }
            }),
        ),
        RelationType::Health => (
            empty_list(),
            create_fn(move |payload: CreateHealthcheck| {
                let api = client.clone();
                async move { api.create_healthcheck(&payload).await }
            }),
        ),
    };
    RelationOps {
        list,
        create,
        link,
        unlink,
    }
}

fn empty_list() -> ListFn {
    Arc::new(|_: PageRequest| -> OpFuture<PaginatedResponse<EntityListItem>> {
        Box::pin(future::ready(Ok(PaginatedResponse::empty())))
    })
}

/// Healthchecks are created against their parent and deleted to unlink.
fn healthcheck_config(api: &AutoApiClient, defaults: CreateFormDefaultsFn) -> RelationConfig {
    let health = RelationType::Health;
    let link: LinkFn = Arc::new(|_: String, _: Value| -> OpFuture<()> {
        Box::pin(future::ready(Ok(())))
    });
    let unlink = {
        let api = api.clone();
        unlink_fn(move |id: String| {
            let api = api.clone();
            async move { api.delete_healthcheck(&id).await }
        })
    };
    let edit = {
        let api = api.clone();
        edit_fn(move |id: String, payload: UpdateHealthcheck| {
            let api = api.clone();
            async move { api.update_healthcheck(&id, &payload).await }
        })
    };
    let fetch = {
        let api = api.clone();
        fetch_fn(move |id: String| {
            let api = api.clone();
            async move { api.get_healthcheck(&id).await }
        })
    };

    RelationConfig::new(
        health,
        RelationTitles::for_kind(health),
        LinkMode::CreateOnly,
        catalog_ops(api, health, link, unlink),
    )
    .with_edit(edit)
    .with_fetch_for_edit(fetch)
    .with_create_form_defaults(defaults)
}
