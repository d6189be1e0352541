//! Request bodies and query parameters for namespace methods.
//!
//! Optional fields left as `None` are omitted from the serialized request.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Filters for listing agents.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Paging for an agent's timeline.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Search over an agent's memory layers.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MemoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Body of `POST /api/v1/agents`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnAgent {
    pub role: String,
    pub goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u32>,
}

impl SpawnAgent {
    pub fn new(role: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            model: None,
            tools: None,
            max_steps: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct AgentMessage<'a> {
    pub content: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct FileContent<'a> {
    pub content: &'a str,
}

/// Body of `POST /api/v1/cron`.
#[derive(Clone, Debug, Serialize)]
pub struct CreateCronJob {
    pub name: String,
    /// Cron expression, for example `0 * * * *`.
    pub expression: String,
    pub agent_config: Value,
}

/// Body of `PATCH /api/v1/cron/{id}`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateCronJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Body of `POST /api/v1/triggers`.
#[derive(Clone, Debug, Serialize)]
pub struct CreateTrigger {
    pub name: String,
    pub event_type: String,
    pub agent_config: Value,
}

/// Body of `POST /api/v1/orgs`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrg {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Body of `PATCH /api/v1/orgs/{id}`.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

/// Adds a user to an organization or a team.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInvite {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl MemberInvite {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct RoleUpdate<'a> {
    pub role: &'a str,
}

/// Body of `POST /api/v1/orgs/{id}/teams`.
#[derive(Clone, Debug, Serialize)]
pub struct CreateTeam {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Filters for listing marketplace templates.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MarketplaceTemplateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Sent comma-joined as a single `tags` parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Body of `POST /api/v1/marketplace/templates/{id}/rate`.
#[derive(Clone, Debug, Serialize)]
pub struct TemplateRating {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

/// Body of `POST /api/v1/integrations`.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterIntegration {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<BTreeMap<String, String>>,
}

/// Body of `POST /api/v1/integrations/{id}/execute`.
#[derive(Clone, Debug, Serialize)]
pub struct IntegrationAction {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Body of `POST /api/v1/webhooks`.
#[derive(Clone, Debug, Serialize)]
pub struct CreateWebhook {
    pub url: String,
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Filters for listing plugins.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PluginQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
