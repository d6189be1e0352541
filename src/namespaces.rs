//! Namespaced endpoint groups of [`AetherClient`].
//!
//! Each method maps to one catalog operation and returns the normalized payload.

use serde::Serialize;
use serde_json::Value;

use crate::events::{EventStream, SseDecoder};
use crate::operations::{self as ops, ApiRequest};
use crate::params::{
    AgentListQuery, AgentMessage, CreateCronJob, CreateOrg, CreateTeam, CreateTrigger,
    CreateWebhook, FileContent, IntegrationAction, MarketplaceTemplateQuery, MemberInvite,
    MemoryQuery, PageQuery, PluginQuery, RegisterIntegration, RoleUpdate, SpawnAgent,
    TemplateRating, UpdateCronJob, UpdateOrg,
};
use crate::{AetherClient, ClientError};

/// Agent lifecycle and interaction endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Agents<'a> {
    client: &'a AetherClient,
}

impl<'a> Agents<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    /// Lists agents, optionally filtered by status.
    pub async fn list(&self, query: &AgentListQuery) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_AGENTS).query(query)?)
            .await
    }

    /// Spawns a new agent.
    pub async fn spawn(&self, request: &SpawnAgent) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::SPAWN_AGENT).json(request)?)
            .await
    }

    pub async fn get(&self, uid: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_AGENT).path_param("uid", uid))
            .await
    }

    /// Terminates an agent.
    pub async fn kill(&self, uid: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::KILL_AGENT).path_param("uid", uid))
            .await
    }

    /// Sends a chat message to an agent.
    pub async fn message(&self, uid: &str, content: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::MESSAGE_AGENT)
            .path_param("uid", uid)
            .json(&AgentMessage { content })?;
        self.client.execute(request).await
    }

    /// Retrieves an agent's event timeline.
    pub async fn timeline(&self, uid: &str, page: &PageQuery) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::GET_AGENT_TIMELINE)
            .path_param("uid", uid)
            .query(page)?;
        self.client.execute(request).await
    }

    /// Queries an agent's memory layers.
    pub async fn memory(&self, uid: &str, query: &MemoryQuery) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::GET_AGENT_MEMORY)
            .path_param("uid", uid)
            .query(query)?;
        self.client.execute(request).await
    }

    pub async fn plan(&self, uid: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_AGENT_PLAN).path_param("uid", uid))
            .await
    }

    pub async fn profile(&self, uid: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_AGENT_PROFILE).path_param("uid", uid))
            .await
    }
}

/// Virtual filesystem endpoints.
///
/// Paths are sent as a single percent-encoded segment, so `notes/today.md`
/// becomes `/api/v1/fs/notes%2Ftoday.md`.
#[derive(Clone, Copy, Debug)]
pub struct Fs<'a> {
    client: &'a AetherClient,
}

impl<'a> Fs<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn read(&self, path: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::READ_FILE).path_param("path", path))
            .await
    }

    /// Writes `content` to `path`, replacing any existing file.
    pub async fn write(&self, path: &str, content: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::WRITE_FILE)
            .path_param("path", path)
            .json(&FileContent { content })?;
        self.client.execute(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_FILE).path_param("path", path))
            .await
    }
}

/// Agent template endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Templates<'a> {
    client: &'a AetherClient,
}

impl<'a> Templates<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_TEMPLATES))
            .await
    }

    pub async fn get(&self, template_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_TEMPLATE).path_param("template_id", template_id))
            .await
    }
}

/// System health and metrics endpoints.
#[derive(Clone, Copy, Debug)]
pub struct System<'a> {
    client: &'a AetherClient,
}

impl<'a> System<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn status(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_SYSTEM_STATUS))
            .await
    }

    pub async fn metrics(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_SYSTEM_METRICS))
            .await
    }
}

/// Real-time event stream.
#[derive(Clone, Copy, Debug)]
pub struct Events<'a> {
    client: &'a AetherClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    /// Opens the event stream. See [`AetherClient::subscribe_events`].
    pub async fn subscribe<S: AsRef<str>>(&self, filter: &[S]) -> Result<EventStream, ClientError> {
        self.client.subscribe_events(filter).await
    }

    /// Opens the event stream with a caller-supplied decoder.
    pub async fn subscribe_with_decoder<S: AsRef<str>>(
        &self,
        filter: &[S],
        decoder: SseDecoder,
    ) -> Result<EventStream, ClientError> {
        self.client
            .subscribe_events_with_decoder(filter, decoder)
            .await
    }
}

/// Scheduled task endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Cron<'a> {
    client: &'a AetherClient,
}

impl<'a> Cron<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_CRON_JOBS))
            .await
    }

    pub async fn create(&self, job: &CreateCronJob) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::CREATE_CRON_JOB).json(job)?)
            .await
    }

    /// Enables or disables a job. Sent as `PATCH`.
    pub async fn update(&self, cron_id: &str, update: &UpdateCronJob) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UPDATE_CRON_JOB)
            .path_param("cron_id", cron_id)
            .json(update)?;
        self.client.execute(request).await
    }

    pub async fn delete(&self, cron_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_CRON_JOB).path_param("cron_id", cron_id))
            .await
    }
}

/// Event trigger endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Triggers<'a> {
    client: &'a AetherClient,
}

impl<'a> Triggers<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_TRIGGERS))
            .await
    }

    pub async fn create(&self, trigger: &CreateTrigger) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::CREATE_TRIGGER).json(trigger)?)
            .await
    }

    pub async fn delete(&self, trigger_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_TRIGGER).path_param("trigger_id", trigger_id))
            .await
    }
}

/// Organization and RBAC endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Orgs<'a> {
    client: &'a AetherClient,
}

impl<'a> Orgs<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    /// Membership of an organization.
    pub fn members(&self) -> OrgMembers<'a> {
        OrgMembers {
            client: self.client,
        }
    }

    /// Teams inside an organization.
    pub fn teams(&self) -> OrgTeams<'a> {
        OrgTeams {
            client: self.client,
        }
    }

    pub async fn create(&self, org: &CreateOrg) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::CREATE_ORG).json(org)?)
            .await
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_ORGS)).await
    }

    pub async fn get(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_ORG).path_param("org_id", org_id))
            .await
    }

    pub async fn delete(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_ORG).path_param("org_id", org_id))
            .await
    }

    pub async fn update(&self, org_id: &str, update: &UpdateOrg) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UPDATE_ORG)
            .path_param("org_id", org_id)
            .json(update)?;
        self.client.execute(request).await
    }
}

/// Organization member management, reached through [`Orgs::members`].
#[derive(Clone, Copy, Debug)]
pub struct OrgMembers<'a> {
    client: &'a AetherClient,
}

impl OrgMembers<'_> {
    pub async fn list(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_ORG_MEMBERS).path_param("org_id", org_id))
            .await
    }

    pub async fn invite(&self, org_id: &str, invite: &MemberInvite) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::INVITE_ORG_MEMBER)
            .path_param("org_id", org_id)
            .json(invite)?;
        self.client.execute(request).await
    }

    pub async fn remove(&self, org_id: &str, user_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::REMOVE_ORG_MEMBER)
            .path_param("org_id", org_id)
            .path_param("user_id", user_id);
        self.client.execute(request).await
    }

    pub async fn update_role(
        &self,
        org_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UPDATE_ORG_MEMBER_ROLE)
            .path_param("org_id", org_id)
            .path_param("user_id", user_id)
            .json(&RoleUpdate { role })?;
        self.client.execute(request).await
    }
}

/// Organization team management, reached through [`Orgs::teams`].
#[derive(Clone, Copy, Debug)]
pub struct OrgTeams<'a> {
    client: &'a AetherClient,
}

impl OrgTeams<'_> {
    pub async fn list(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_ORG_TEAMS).path_param("org_id", org_id))
            .await
    }

    pub async fn create(&self, org_id: &str, team: &CreateTeam) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::CREATE_ORG_TEAM)
            .path_param("org_id", org_id)
            .json(team)?;
        self.client.execute(request).await
    }

    pub async fn delete(&self, org_id: &str, team_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::DELETE_ORG_TEAM)
            .path_param("org_id", org_id)
            .path_param("team_id", team_id);
        self.client.execute(request).await
    }

    pub async fn add_member(
        &self,
        org_id: &str,
        team_id: &str,
        invite: &MemberInvite,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::ADD_TEAM_MEMBER)
            .path_param("org_id", org_id)
            .path_param("team_id", team_id)
            .json(invite)?;
        self.client.execute(request).await
    }

    pub async fn remove_member(
        &self,
        org_id: &str,
        team_id: &str,
        user_id: &str,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::REMOVE_TEAM_MEMBER)
            .path_param("org_id", org_id)
            .path_param("team_id", team_id)
            .path_param("user_id", user_id);
        self.client.execute(request).await
    }
}

/// Marketplace endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Marketplace<'a> {
    client: &'a AetherClient,
}

impl<'a> Marketplace<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub fn templates(&self) -> MarketplaceTemplates<'a> {
        MarketplaceTemplates {
            client: self.client,
        }
    }
}

/// Published templates, reached through [`Marketplace::templates`].
#[derive(Clone, Copy, Debug)]
pub struct MarketplaceTemplates<'a> {
    client: &'a AetherClient,
}

impl MarketplaceTemplates<'_> {
    pub async fn list(&self, query: &MarketplaceTemplateQuery) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_MARKETPLACE_TEMPLATES).query(query)?)
            .await
    }

    /// Publishes a template document as-is.
    pub async fn publish<T: Serialize + ?Sized>(&self, template: &T) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::PUBLISH_MARKETPLACE_TEMPLATE).json(template)?)
            .await
    }

    pub async fn unpublish(&self, template_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UNPUBLISH_MARKETPLACE_TEMPLATE)
            .path_param("template_id", template_id);
        self.client.execute(request).await
    }

    pub async fn rate(
        &self,
        template_id: &str,
        rating: &TemplateRating,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::RATE_MARKETPLACE_TEMPLATE)
            .path_param("template_id", template_id)
            .json(rating)?;
        self.client.execute(request).await
    }

    /// Copies a template into the caller's workspace.
    pub async fn fork(&self, template_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::FORK_MARKETPLACE_TEMPLATE)
            .path_param("template_id", template_id);
        self.client.execute(request).await
    }
}

/// Third-party integration endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Integrations<'a> {
    client: &'a AetherClient,
}

impl<'a> Integrations<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_INTEGRATIONS))
            .await
    }

    pub async fn get(&self, integration_id: &str) -> Result<Value, ClientError> {
        let request =
            ApiRequest::new(&ops::GET_INTEGRATION).path_param("integration_id", integration_id);
        self.client.execute(request).await
    }

    pub async fn register(&self, integration: &RegisterIntegration) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::REGISTER_INTEGRATION).json(integration)?)
            .await
    }

    pub async fn unregister(&self, integration_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UNREGISTER_INTEGRATION)
            .path_param("integration_id", integration_id);
        self.client.execute(request).await
    }

    /// Checks the integration's connectivity.
    pub async fn test(&self, integration_id: &str) -> Result<Value, ClientError> {
        let request =
            ApiRequest::new(&ops::TEST_INTEGRATION).path_param("integration_id", integration_id);
        self.client.execute(request).await
    }

    pub async fn execute(
        &self,
        integration_id: &str,
        action: &IntegrationAction,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::EXECUTE_INTEGRATION)
            .path_param("integration_id", integration_id)
            .json(action)?;
        self.client.execute(request).await
    }
}

/// Webhook endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Webhooks<'a> {
    client: &'a AetherClient,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_WEBHOOKS))
            .await
    }

    pub async fn create(&self, webhook: &CreateWebhook) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::CREATE_WEBHOOK).json(webhook)?)
            .await
    }

    pub async fn delete(&self, webhook_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_WEBHOOK).path_param("webhook_id", webhook_id))
            .await
    }
}

/// Plugin marketplace endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Plugins<'a> {
    client: &'a AetherClient,
}

impl<'a> Plugins<'a> {
    pub(crate) fn new(client: &'a AetherClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PluginQuery) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::LIST_PLUGINS).query(query)?)
            .await
    }

    /// Installs a plugin from its manifest document.
    pub async fn install<T: Serialize + ?Sized>(&self, manifest: &T) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::INSTALL_PLUGIN).json(manifest)?)
            .await
    }

    pub async fn uninstall(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::UNINSTALL_PLUGIN).path_param("plugin_id", plugin_id))
            .await
    }
}
