//! Namespaced endpoint groups of [`BlockingAetherClient`].
//!
//! Blocking counterparts of [`crate::namespaces`].
//!
//! Each method maps to one catalog operation and returns the normalized payload.

use serde::Serialize;
use serde_json::Value;

use crate::events::{BlockingEventStream, SseDecoder};
use crate::operations::{self as ops, ApiRequest};
use crate::params::{
    AgentListQuery, AgentMessage, CreateCronJob, CreateOrg, CreateTeam, CreateTrigger,
    CreateWebhook, FileContent, IntegrationAction, MarketplaceTemplateQuery, MemberInvite,
    MemoryQuery, PageQuery, PluginQuery, RegisterIntegration, RoleUpdate, SpawnAgent,
    TemplateRating, UpdateCronJob, UpdateOrg,
};
use crate::{BlockingAetherClient, ClientError};

/// Agent lifecycle and interaction endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Agents<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Agents<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    /// Lists agents, optionally filtered by status.
    pub fn list(&self, query: &AgentListQuery) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_AGENTS).query(query)?)
    }

    /// Spawns a new agent.
    pub fn spawn(&self, request: &SpawnAgent) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::SPAWN_AGENT).json(request)?)
    }

    pub fn get(&self, uid: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::GET_AGENT).path_param("uid", uid))
    }

    /// Terminates an agent.
    pub fn kill(&self, uid: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::KILL_AGENT).path_param("uid", uid))
    }

    /// Sends a chat message to an agent.
    pub fn message(&self, uid: &str, content: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::MESSAGE_AGENT)
            .path_param("uid", uid)
            .json(&AgentMessage { content })?;
        self.client.execute(request)
    }

    /// Retrieves an agent's event timeline.
    pub fn timeline(&self, uid: &str, page: &PageQuery) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::GET_AGENT_TIMELINE)
            .path_param("uid", uid)
            .query(page)?;
        self.client.execute(request)
    }

    /// Queries an agent's memory layers.
    pub fn memory(&self, uid: &str, query: &MemoryQuery) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::GET_AGENT_MEMORY)
            .path_param("uid", uid)
            .query(query)?;
        self.client.execute(request)
    }

    pub fn plan(&self, uid: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::GET_AGENT_PLAN).path_param("uid", uid))
    }

    pub fn profile(&self, uid: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::GET_AGENT_PROFILE).path_param("uid", uid))
    }
}

/// Virtual filesystem endpoints.
///
/// Paths are sent as a single percent-encoded segment, so `notes/today.md`
/// becomes `/api/v1/fs/notes%2Ftoday.md`.
#[derive(Clone, Copy, Debug)]
pub struct Fs<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Fs<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn read(&self, path: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::READ_FILE).path_param("path", path))
    }

    /// Writes `content` to `path`, replacing any existing file.
    pub fn write(&self, path: &str, content: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::WRITE_FILE)
            .path_param("path", path)
            .json(&FileContent { content })?;
        self.client.execute(request)
    }

    pub fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::DELETE_FILE).path_param("path", path))
    }
}

/// Agent template endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Templates<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Templates<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_TEMPLATES))
    }

    pub fn get(&self, template_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::GET_TEMPLATE).path_param("template_id", template_id))
    }
}

/// System health and metrics endpoints.
#[derive(Clone, Copy, Debug)]
pub struct System<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> System<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn status(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::GET_SYSTEM_STATUS))
    }

    pub fn metrics(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::GET_SYSTEM_METRICS))
    }
}

/// Real-time event stream.
#[derive(Clone, Copy, Debug)]
pub struct Events<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    /// Opens the event stream. See [`BlockingAetherClient::subscribe_events`].
    pub fn subscribe<S: AsRef<str>>(&self, filter: &[S]) -> Result<BlockingEventStream, ClientError> {
        self.client.subscribe_events(filter)
    }

    /// Opens the event stream with a caller-supplied decoder.
    pub fn subscribe_with_decoder<S: AsRef<str>>(
        &self,
        filter: &[S],
        decoder: SseDecoder,
    ) -> Result<BlockingEventStream, ClientError> {
        self.client
            .subscribe_events_with_decoder(filter, decoder)
    }
}

/// Scheduled task endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Cron<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Cron<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_CRON_JOBS))
    }

    pub fn create(&self, job: &CreateCronJob) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::CREATE_CRON_JOB).json(job)?)
    }

    /// Enables or disables a job. Sent as `PATCH`.
    pub fn update(&self, cron_id: &str, update: &UpdateCronJob) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UPDATE_CRON_JOB)
            .path_param("cron_id", cron_id)
            .json(update)?;
        self.client.execute(request)
    }

    pub fn delete(&self, cron_id: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::DELETE_CRON_JOB).path_param("cron_id", cron_id))
    }
}

/// Event trigger endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Triggers<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Triggers<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_TRIGGERS))
    }

    pub fn create(&self, trigger: &CreateTrigger) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::CREATE_TRIGGER).json(trigger)?)
    }

    pub fn delete(&self, trigger_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_TRIGGER).path_param("trigger_id", trigger_id))
    }
}

/// Organization and RBAC endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Orgs<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Orgs<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
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

    pub fn create(&self, org: &CreateOrg) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::CREATE_ORG).json(org)?)
    }

    pub fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_ORGS))
    }

    pub fn get(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::GET_ORG).path_param("org_id", org_id))
    }

    pub fn delete(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::DELETE_ORG).path_param("org_id", org_id))
    }

    pub fn update(&self, org_id: &str, update: &UpdateOrg) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UPDATE_ORG)
            .path_param("org_id", org_id)
            .json(update)?;
        self.client.execute(request)
    }
}

/// Organization member management, reached through [`Orgs::members`].
#[derive(Clone, Copy, Debug)]
pub struct OrgMembers<'a> {
    client: &'a BlockingAetherClient,
}

impl OrgMembers<'_> {
    pub fn list(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_ORG_MEMBERS).path_param("org_id", org_id))
    }

    pub fn invite(&self, org_id: &str, invite: &MemberInvite) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::INVITE_ORG_MEMBER)
            .path_param("org_id", org_id)
            .json(invite)?;
        self.client.execute(request)
    }

    pub fn remove(&self, org_id: &str, user_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::REMOVE_ORG_MEMBER)
            .path_param("org_id", org_id)
            .path_param("user_id", user_id);
        self.client.execute(request)
    }

    pub fn update_role(
        &self,
        org_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UPDATE_ORG_MEMBER_ROLE)
            .path_param("org_id", org_id)
            .path_param("user_id", user_id)
            .json(&RoleUpdate { role })?;
        self.client.execute(request)
    }
}

/// Organization team management, reached through [`Orgs::teams`].
#[derive(Clone, Copy, Debug)]
pub struct OrgTeams<'a> {
    client: &'a BlockingAetherClient,
}

impl OrgTeams<'_> {
    pub fn list(&self, org_id: &str) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_ORG_TEAMS).path_param("org_id", org_id))
    }

    pub fn create(&self, org_id: &str, team: &CreateTeam) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::CREATE_ORG_TEAM)
            .path_param("org_id", org_id)
            .json(team)?;
        self.client.execute(request)
    }

    pub fn delete(&self, org_id: &str, team_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::DELETE_ORG_TEAM)
            .path_param("org_id", org_id)
            .path_param("team_id", team_id);
        self.client.execute(request)
    }

    pub fn add_member(
        &self,
        org_id: &str,
        team_id: &str,
        invite: &MemberInvite,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::ADD_TEAM_MEMBER)
            .path_param("org_id", org_id)
            .path_param("team_id", team_id)
            .json(invite)?;
        self.client.execute(request)
    }

    pub fn remove_member(
        &self,
        org_id: &str,
        team_id: &str,
        user_id: &str,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::REMOVE_TEAM_MEMBER)
            .path_param("org_id", org_id)
            .path_param("team_id", team_id)
            .path_param("user_id", user_id);
        self.client.execute(request)
    }
}

/// Marketplace endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Marketplace<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Marketplace<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
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
    client: &'a BlockingAetherClient,
}

impl MarketplaceTemplates<'_> {
    pub fn list(&self, query: &MarketplaceTemplateQuery) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_MARKETPLACE_TEMPLATES).query(query)?)
    }

    /// Publishes a template document as-is.
    pub fn publish<T: Serialize + ?Sized>(&self, template: &T) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::PUBLISH_MARKETPLACE_TEMPLATE).json(template)?)
    }

    pub fn unpublish(&self, template_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UNPUBLISH_MARKETPLACE_TEMPLATE)
            .path_param("template_id", template_id);
        self.client.execute(request)
    }

    pub fn rate(
        &self,
        template_id: &str,
        rating: &TemplateRating,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::RATE_MARKETPLACE_TEMPLATE)
            .path_param("template_id", template_id)
            .json(rating)?;
        self.client.execute(request)
    }

    /// Copies a template into the caller's workspace.
    pub fn fork(&self, template_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::FORK_MARKETPLACE_TEMPLATE)
            .path_param("template_id", template_id);
        self.client.execute(request)
    }
}

/// Third-party integration endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Integrations<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Integrations<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_INTEGRATIONS))
    }

    pub fn get(&self, integration_id: &str) -> Result<Value, ClientError> {
        let request =
            ApiRequest::new(&ops::GET_INTEGRATION).path_param("integration_id", integration_id);
        self.client.execute(request)
    }

    pub fn register(&self, integration: &RegisterIntegration) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::REGISTER_INTEGRATION).json(integration)?)
    }

    pub fn unregister(&self, integration_id: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::UNREGISTER_INTEGRATION)
            .path_param("integration_id", integration_id);
        self.client.execute(request)
    }

    /// Checks the integration's connectivity.
    pub fn test(&self, integration_id: &str) -> Result<Value, ClientError> {
        let request =
            ApiRequest::new(&ops::TEST_INTEGRATION).path_param("integration_id", integration_id);
        self.client.execute(request)
    }

    pub fn execute(
        &self,
        integration_id: &str,
        action: &IntegrationAction,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&ops::EXECUTE_INTEGRATION)
            .path_param("integration_id", integration_id)
            .json(action)?;
        self.client.execute(request)
    }
}

/// Webhook endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Webhooks<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Webhooks<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_WEBHOOKS))
    }

    pub fn create(&self, webhook: &CreateWebhook) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::CREATE_WEBHOOK).json(webhook)?)
    }

    pub fn delete(&self, webhook_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::DELETE_WEBHOOK).path_param("webhook_id", webhook_id))
    }
}

/// Plugin marketplace endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Plugins<'a> {
    client: &'a BlockingAetherClient,
}

impl<'a> Plugins<'a> {
    pub(crate) fn new(client: &'a BlockingAetherClient) -> Self {
        Self { client }
    }

    pub fn list(&self, query: &PluginQuery) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::LIST_PLUGINS).query(query)?)
    }

    /// Installs a plugin from its manifest document.
    pub fn install<T: Serialize + ?Sized>(&self, manifest: &T) -> Result<Value, ClientError> {
        self.client.execute(ApiRequest::new(&ops::INSTALL_PLUGIN).json(manifest)?)
    }

    pub fn uninstall(&self, plugin_id: &str) -> Result<Value, ClientError> {
        self.client
            .execute(ApiRequest::new(&ops::UNINSTALL_PLUGIN).path_param("plugin_id", plugin_id))
    }
}
