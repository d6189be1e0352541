//! Static endpoint catalog and request rendering.
//!
//! Every namespace method resolves to one [`OperationDefinition`] here. The
//! same catalog backs [`crate::AetherClient::call_operation`], which looks
//! operations up by id.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded::byte_serialize;

use crate::ClientError;

/// Metadata for one API operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationDefinition {
    /// Stable operation identifier (for example `getAgent`).
    pub operation_id: &'static str,
    /// Uppercase HTTP method (for example `GET`, `POST`).
    pub method: &'static str,
    /// Path template, potentially containing `{param}` placeholders.
    pub path_template: &'static str,
    /// Required path parameter names appearing in `path_template`.
    pub path_params: &'static [&'static str],
}

const fn op(
    operation_id: &'static str,
    method: &'static str,
    path_template: &'static str,
    path_params: &'static [&'static str],
) -> OperationDefinition {
    OperationDefinition {
        operation_id,
        method,
        path_template,
        path_params,
    }
}

pub const LOGIN: OperationDefinition = op("login", "POST", "/api/auth/login", &[]);

pub const LIST_AGENTS: OperationDefinition = op("listAgents", "GET", "/api/v1/agents", &[]);
pub const SPAWN_AGENT: OperationDefinition = op("spawnAgent", "POST", "/api/v1/agents", &[]);
pub const GET_AGENT: OperationDefinition = op("getAgent", "GET", "/api/v1/agents/{uid}", &["uid"]);
pub const KILL_AGENT: OperationDefinition =
    op("killAgent", "DELETE", "/api/v1/agents/{uid}", &["uid"]);
pub const MESSAGE_AGENT: OperationDefinition =
    op("messageAgent", "POST", "/api/v1/agents/{uid}/message", &["uid"]);
pub const GET_AGENT_TIMELINE: OperationDefinition =
    op("getAgentTimeline", "GET", "/api/v1/agents/{uid}/timeline", &["uid"]);
pub const GET_AGENT_MEMORY: OperationDefinition =
    op("getAgentMemory", "GET", "/api/v1/agents/{uid}/memory", &["uid"]);
pub const GET_AGENT_PLAN: OperationDefinition =
    op("getAgentPlan", "GET", "/api/v1/agents/{uid}/plan", &["uid"]);
pub const GET_AGENT_PROFILE: OperationDefinition =
    op("getAgentProfile", "GET", "/api/v1/agents/{uid}/profile", &["uid"]);

pub const READ_FILE: OperationDefinition = op("readFile", "GET", "/api/v1/fs/{path}", &["path"]);
pub const WRITE_FILE: OperationDefinition = op("writeFile", "PUT", "/api/v1/fs/{path}", &["path"]);
pub const DELETE_FILE: OperationDefinition =
    op("deleteFile", "DELETE", "/api/v1/fs/{path}", &["path"]);

pub const LIST_TEMPLATES: OperationDefinition =
    op("listTemplates", "GET", "/api/v1/templates", &[]);
pub const GET_TEMPLATE: OperationDefinition =
    op("getTemplate", "GET", "/api/v1/templates/{template_id}", &["template_id"]);

pub const GET_SYSTEM_STATUS: OperationDefinition =
    op("getSystemStatus", "GET", "/api/v1/system/status", &[]);
pub const GET_SYSTEM_METRICS: OperationDefinition =
    op("getSystemMetrics", "GET", "/api/v1/system/metrics", &[]);

pub const LIST_CRON_JOBS: OperationDefinition = op("listCronJobs", "GET", "/api/v1/cron", &[]);
pub const CREATE_CRON_JOB: OperationDefinition = op("createCronJob", "POST", "/api/v1/cron", &[]);
pub const UPDATE_CRON_JOB: OperationDefinition =
    op("updateCronJob", "PATCH", "/api/v1/cron/{cron_id}", &["cron_id"]);
pub const DELETE_CRON_JOB: OperationDefinition =
    op("deleteCronJob", "DELETE", "/api/v1/cron/{cron_id}", &["cron_id"]);

pub const LIST_TRIGGERS: OperationDefinition = op("listTriggers", "GET", "/api/v1/triggers", &[]);
pub const CREATE_TRIGGER: OperationDefinition =
    op("createTrigger", "POST", "/api/v1/triggers", &[]);
pub const DELETE_TRIGGER: OperationDefinition =
    op("deleteTrigger", "DELETE", "/api/v1/triggers/{trigger_id}", &["trigger_id"]);

pub const LIST_ORGS: OperationDefinition = op("listOrgs", "GET", "/api/v1/orgs", &[]);
pub const CREATE_ORG: OperationDefinition = op("createOrg", "POST", "/api/v1/orgs", &[]);
pub const GET_ORG: OperationDefinition = op("getOrg", "GET", "/api/v1/orgs/{org_id}", &["org_id"]);
pub const UPDATE_ORG: OperationDefinition =
    op("updateOrg", "PATCH", "/api/v1/orgs/{org_id}", &["org_id"]);
pub const DELETE_ORG: OperationDefinition =
    op("deleteOrg", "DELETE", "/api/v1/orgs/{org_id}", &["org_id"]);
pub const LIST_ORG_MEMBERS: OperationDefinition =
    op("listOrgMembers", "GET", "/api/v1/orgs/{org_id}/members", &["org_id"]);
pub const INVITE_ORG_MEMBER: OperationDefinition =
    op("inviteOrgMember", "POST", "/api/v1/orgs/{org_id}/members", &["org_id"]);
pub const UPDATE_ORG_MEMBER_ROLE: OperationDefinition = op(
    "updateOrgMemberRole",
    "PATCH",
    "/api/v1/orgs/{org_id}/members/{user_id}",
    &["org_id", "user_id"],
);
pub const REMOVE_ORG_MEMBER: OperationDefinition = op(
    "removeOrgMember",
    "DELETE",
    "/api/v1/orgs/{org_id}/members/{user_id}",
    &["org_id", "user_id"],
);
pub const LIST_ORG_TEAMS: OperationDefinition =
    op("listOrgTeams", "GET", "/api/v1/orgs/{org_id}/teams", &["org_id"]);
pub const CREATE_ORG_TEAM: OperationDefinition =
    op("createOrgTeam", "POST", "/api/v1/orgs/{org_id}/teams", &["org_id"]);
pub const DELETE_ORG_TEAM: OperationDefinition = op(
    "deleteOrgTeam",
    "DELETE",
    "/api/v1/orgs/{org_id}/teams/{team_id}",
    &["org_id", "team_id"],
);
pub const ADD_TEAM_MEMBER: OperationDefinition = op(
    "addTeamMember",
    "POST",
    "/api/v1/orgs/{org_id}/teams/{team_id}/members",
    &["org_id", "team_id"],
);
pub const REMOVE_TEAM_MEMBER: OperationDefinition = op(
    "removeTeamMember",
    "DELETE",
    "/api/v1/orgs/{org_id}/teams/{team_id}/members/{user_id}",
    &["org_id", "team_id", "user_id"],
);

pub const LIST_MARKETPLACE_TEMPLATES: OperationDefinition =
    op("listMarketplaceTemplates", "GET", "/api/v1/marketplace/templates", &[]);
pub const PUBLISH_MARKETPLACE_TEMPLATE: OperationDefinition =
    op("publishMarketplaceTemplate", "POST", "/api/v1/marketplace/templates", &[]);
pub const UNPUBLISH_MARKETPLACE_TEMPLATE: OperationDefinition = op(
    "unpublishMarketplaceTemplate",
    "DELETE",
    "/api/v1/marketplace/templates/{template_id}",
    &["template_id"],
);
pub const RATE_MARKETPLACE_TEMPLATE: OperationDefinition = op(
    "rateMarketplaceTemplate",
    "POST",
    "/api/v1/marketplace/templates/{template_id}/rate",
    &["template_id"],
);
pub const FORK_MARKETPLACE_TEMPLATE: OperationDefinition = op(
    "forkMarketplaceTemplate",
    "POST",
    "/api/v1/marketplace/templates/{template_id}/fork",
    &["template_id"],
);

pub const LIST_INTEGRATIONS: OperationDefinition =
    op("listIntegrations", "GET", "/api/v1/integrations", &[]);
pub const REGISTER_INTEGRATION: OperationDefinition =
    op("registerIntegration", "POST", "/api/v1/integrations", &[]);
pub const GET_INTEGRATION: OperationDefinition = op(
    "getIntegration",
    "GET",
    "/api/v1/integrations/{integration_id}",
    &["integration_id"],
);
pub const UNREGISTER_INTEGRATION: OperationDefinition = op(
    "unregisterIntegration",
    "DELETE",
    "/api/v1/integrations/{integration_id}",
    &["integration_id"],
);
pub const TEST_INTEGRATION: OperationDefinition = op(
    "testIntegration",
    "POST",
    "/api/v1/integrations/{integration_id}/test",
    &["integration_id"],
);
pub const EXECUTE_INTEGRATION: OperationDefinition = op(
    "executeIntegration",
    "POST",
    "/api/v1/integrations/{integration_id}/execute",
    &["integration_id"],
);

pub const LIST_WEBHOOKS: OperationDefinition = op("listWebhooks", "GET", "/api/v1/webhooks", &[]);
pub const CREATE_WEBHOOK: OperationDefinition =
    op("createWebhook", "POST", "/api/v1/webhooks", &[]);
pub const DELETE_WEBHOOK: OperationDefinition =
    op("deleteWebhook", "DELETE", "/api/v1/webhooks/{webhook_id}", &["webhook_id"]);

pub const LIST_PLUGINS: OperationDefinition =
    op("listPlugins", "GET", "/api/v1/marketplace/plugins", &[]);
pub const INSTALL_PLUGIN: OperationDefinition =
    op("installPlugin", "POST", "/api/v1/marketplace/plugins", &[]);
pub const UNINSTALL_PLUGIN: OperationDefinition = op(
    "uninstallPlugin",
    "DELETE",
    "/api/v1/marketplace/plugins/{plugin_id}",
    &["plugin_id"],
);

/// Every JSON operation the client knows about.
pub const OPERATIONS: &[OperationDefinition] = &[
    LOGIN,
    LIST_AGENTS,
    SPAWN_AGENT,
    GET_AGENT,
    KILL_AGENT,
    MESSAGE_AGENT,
    GET_AGENT_TIMELINE,
    GET_AGENT_MEMORY,
    GET_AGENT_PLAN,
    GET_AGENT_PROFILE,
    READ_FILE,
    WRITE_FILE,
    DELETE_FILE,
    LIST_TEMPLATES,
    GET_TEMPLATE,
    GET_SYSTEM_STATUS,
    GET_SYSTEM_METRICS,
    LIST_CRON_JOBS,
    CREATE_CRON_JOB,
    UPDATE_CRON_JOB,
    DELETE_CRON_JOB,
    LIST_TRIGGERS,
    CREATE_TRIGGER,
    DELETE_TRIGGER,
    LIST_ORGS,
    CREATE_ORG,
    GET_ORG,
    UPDATE_ORG,
    DELETE_ORG,
    LIST_ORG_MEMBERS,
    INVITE_ORG_MEMBER,
    UPDATE_ORG_MEMBER_ROLE,
    REMOVE_ORG_MEMBER,
    LIST_ORG_TEAMS,
    CREATE_ORG_TEAM,
    DELETE_ORG_TEAM,
    ADD_TEAM_MEMBER,
    REMOVE_TEAM_MEMBER,
    LIST_MARKETPLACE_TEMPLATES,
    PUBLISH_MARKETPLACE_TEMPLATE,
    UNPUBLISH_MARKETPLACE_TEMPLATE,
    RATE_MARKETPLACE_TEMPLATE,
    FORK_MARKETPLACE_TEMPLATE,
    LIST_INTEGRATIONS,
    REGISTER_INTEGRATION,
    GET_INTEGRATION,
    UNREGISTER_INTEGRATION,
    TEST_INTEGRATION,
    EXECUTE_INTEGRATION,
    LIST_WEBHOOKS,
    CREATE_WEBHOOK,
    DELETE_WEBHOOK,
    LIST_PLUGINS,
    INSTALL_PLUGIN,
    UNINSTALL_PLUGIN,
];

/// One request against a catalog operation, ready to be sent by either client.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    operation: &'static OperationDefinition,
    path_params: Vec<(&'static str, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(operation: &'static OperationDefinition) -> Self {
        Self {
            operation,
            path_params: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn operation(&self) -> &'static OperationDefinition {
        self.operation
    }

    /// Sets the value substituted for `{name}` in the path template.
    ///
    /// The value is percent-encoded as a single path segment when rendered.
    #[must_use]
    pub fn path_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push((name, value.into()));
        self
    }

    /// Appends query parameters from a serializable struct or map.
    ///
    /// `None` fields are skipped, arrays are joined with commas, and nested
    /// objects are sent as JSON text.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Result<Self, ClientError> {
        self.query.extend(flatten_query(serde_json::to_value(query)?)?);
        Ok(self)
    }

    /// Sets the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Renders the method, path, query and body to send.
    pub(crate) fn into_parts(
        self,
    ) -> Result<(Method, String, Vec<(String, String)>, Option<Value>), ClientError> {
        let borrowed: Vec<(&str, &str)> = self
            .path_params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        let path = render_path(self.operation, &borrowed)?;
        let method = parse_method(self.operation)?;
        Ok((method, path, self.query, self.body))
    }
}

/// Looks up an operation by id.
pub fn find_operation(operation_id: &str) -> Result<&'static OperationDefinition, ClientError> {
    OPERATIONS
        .iter()
        .find(|op| op.operation_id == operation_id)
        .ok_or_else(|| ClientError::UnknownOperation(operation_id.to_owned()))
}

pub(crate) fn parse_method(operation: &OperationDefinition) -> Result<Method, ClientError> {
    Method::from_bytes(operation.method.as_bytes())
        .map_err(|_| ClientError::UnknownOperation(operation.operation_id.to_owned()))
}

pub(crate) fn render_path(
    operation: &OperationDefinition,
    path_params: &[(&str, &str)],
) -> Result<String, ClientError> {
    let mut rendered = operation.path_template.to_owned();

    for required_param in operation.path_params {
        let value = path_params
            .iter()
            .find(|(name, _)| name == required_param)
            .map(|(_, value)| *value)
            .ok_or_else(|| ClientError::MissingPathParameter {
                operation_id: operation.operation_id.to_owned(),
                parameter: (*required_param).to_owned(),
            })?;

        let placeholder = format!("{{{required_param}}}");
        rendered = rendered.replace(&placeholder, &encode_path_segment(value));
    }

    Ok(rendered)
}

/// Percent-encodes `value` as one path segment; `/` becomes `%2F` and space `%20`.
pub fn encode_path_segment(value: &str) -> String {
    // Form encoding writes a literal `+` as `%2B`, so any `+` left is a space.
    // `*` is the one reserved byte it passes through unescaped.
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
}

fn flatten_query(value: Value) -> Result<Vec<(String, String)>, ClientError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(key, value)| query_value(value).map(|value| (key, value)))
            .collect()),
        other => Err(ClientError::Json(<serde_json::Error as serde::ser::Error>::custom(
            format!("query parameters must serialize to an object, got {other}"),
        ))),
    }
}

fn query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        object @ Value::Object(_) => Some(object.to_string()),
    }
}
