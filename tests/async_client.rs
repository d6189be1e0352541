use std::sync::{Arc, Mutex};

use aether_client::params::{
    AgentListQuery, CreateWebhook, IntegrationAction, MemberInvite, RegisterIntegration,
    SpawnAgent, TemplateRating, UpdateCronJob,
};
use aether_client::{AetherClient, ClientConfig, ClientError, SseDecoder};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AetherClient {
    AetherClient::new(server.uri()).expect("valid base URL")
}

#[tokio::test]
async fn login_stores_token_and_returns_full_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "jwt-1", "user": {"id": "u1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/status"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let login = client.login("admin", "secret").await.expect("login ok");
    assert_eq!(login, json!({"token": "jwt-1", "user": {"id": "u1"}}));
    assert_eq!(client.token().as_deref(), Some("jwt-1"));

    let status = client.system().status().await.expect("status ok");
    assert_eq!(status, json!({"ok": true}));
}

#[tokio::test]
async fn failed_login_keeps_previous_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "UNAUTHORIZED", "message": "Invalid credentials"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).with_token("old");
    let err = client.login("admin", "wrong").await.expect_err("login fails");
    match err {
        ClientError::RequestFailed {
            message,
            code,
            status,
        } => {
            assert_eq!(message, "Invalid credentials");
            assert_eq!(code, "UNAUTHORIZED");
            assert_eq!(status, 401);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.token().as_deref(), Some("old"));
}

#[tokio::test]
async fn requests_without_token_carry_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.templates().list().await.expect("list ok");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn clones_share_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/metrics"))
        .and(header("authorization", "Bearer shared"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cpu": 0.5})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let clone = client.clone();
    client.set_token("shared");

    let metrics = clone.system().metrics().await.expect("metrics ok");
    assert_eq!(metrics, json!({"cpu": 0.5}));
}

#[tokio::test]
async fn file_paths_are_sent_as_one_encoded_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/fs/folder%2Ffile.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"content": "hello"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/fs/my%20notes.md"))
        .and(body_json(json!({"content": "# hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"written": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let file = client.fs().read("folder/file.txt").await.expect("read ok");
    assert_eq!(file, json!({"content": "hello"}));

    let written = client
        .fs()
        .write("my notes.md", "# hi")
        .await
        .expect("write ok");
    assert_eq!(written, json!({"written": true}));
}

#[tokio::test]
async fn body_without_data_field_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents/a1/plan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"steps": [1, 2]})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/agents/a1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.agents().plan("a1").await.expect("plan ok"),
        json!({"steps": [1, 2]})
    );
    assert_eq!(
        client.agents().kill("a1").await.expect("kill ok"),
        serde_json::Value::Null
    );
}

#[tokio::test]
async fn non_json_error_body_uses_http_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/status"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": {"message": "db down"}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.agents().get("missing").await.expect_err("404");
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code(), Some("HTTP_404"));
    assert_eq!(err.to_string(), "[HTTP_404] HTTP 404: Not Found (HTTP 404)");

    let err = client.system().status().await.expect_err("500");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.code(), Some("HTTP_500"));
    assert!(err.to_string().contains("db down"));
}

#[tokio::test]
async fn invalid_success_body_is_a_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/templates/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.templates().get("t1").await.expect_err("bad body");
    assert!(matches!(err, ClientError::Json(_)));
}

#[tokio::test]
async fn agent_list_sends_only_set_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents"))
        .and(query_param("status", "running"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"uid": "a1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = AgentListQuery {
        status: Some("running".to_owned()),
        limit: Some(5),
        offset: None,
    };
    let agents = client.agents().list(&query).await.expect("list ok");
    assert_eq!(agents, json!([{"uid": "a1"}]));

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(
        !requests[0]
            .url
            .query_pairs()
            .any(|(key, _)| key == "offset")
    );
}

#[tokio::test]
async fn spawn_and_message_send_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/agents"))
        .and(body_json(json!({"role": "researcher", "goal": "summarize", "maxSteps": 10})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"uid": "a7"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/agents/a7/message"))
        .and(body_json(json!({"content": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"sent": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut spawn = SpawnAgent::new("researcher", "summarize");
    spawn.max_steps = Some(10);
    let spawned = client.agents().spawn(&spawn).await.expect("spawn ok");
    assert_eq!(spawned["uid"], "a7");

    client
        .agents()
        .message("a7", "hello")
        .await
        .expect("message ok");
}

#[tokio::test]
async fn cron_update_uses_patch() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/cron/c1"))
        .and(body_json(json!({"enabled": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "c1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let update = UpdateCronJob {
        enabled: Some(false),
    };
    client
        .cron()
        .update("c1", &update)
        .await
        .expect("update ok");
}

#[tokio::test]
async fn org_members_and_teams_render_nested_paths() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/orgs/o1/members/u2"))
        .and(body_json(json!({"role": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"role": "admin"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/orgs/o1/teams/t1/members"))
        .and(body_json(json!({"userId": "u2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/orgs/o1/teams/t1/members/u2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let orgs = client.orgs();
    let updated = orgs
        .members()
        .update_role("o1", "u2", "admin")
        .await
        .expect("update role ok");
    assert_eq!(updated, json!({"role": "admin"}));

    orgs.teams()
        .add_member("o1", "t1", &MemberInvite::new("u2"))
        .await
        .expect("add member ok");
    orgs.teams()
        .remove_member("o1", "t1", "u2")
        .await
        .expect("remove member ok");
}

#[tokio::test]
async fn marketplace_rate_and_fork() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/marketplace/templates/tpl-1/rate"))
        .and(body_json(json!({"rating": 5, "review": "great"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"avg": 4.5}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/marketplace/templates/tpl-1/fork"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "tpl-2"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let templates = client.marketplace().templates();
    let rating = TemplateRating {
        rating: 5,
        review: Some("great".to_owned()),
    };
    assert_eq!(
        templates.rate("tpl-1", &rating).await.expect("rate ok"),
        json!({"avg": 4.5})
    );
    assert_eq!(
        templates.fork("tpl-1").await.expect("fork ok"),
        json!({"id": "tpl-2"})
    );
}

#[tokio::test]
async fn integrations_register_and_execute() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/integrations"))
        .and(body_json(json!({"type": "slack", "name": "team chat"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "i1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/integrations/i1/execute"))
        .and(body_json(json!({"action": "post", "params": {"channel": "#ops"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let registration = RegisterIntegration {
        kind: "slack".to_owned(),
        name: "team chat".to_owned(),
        credentials: None,
    };
    client
        .integrations()
        .register(&registration)
        .await
        .expect("register ok");

    let action = IntegrationAction {
        action: "post".to_owned(),
        params: Some(json!({"channel": "#ops"})),
    };
    let result = client
        .integrations()
        .execute("i1", &action)
        .await
        .expect("execute ok");
    assert_eq!(result, json!({"ok": true}));
}

#[tokio::test]
async fn webhooks_and_plugins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/webhooks"))
        .and(body_json(json!({
            "url": "https://example.test/hook",
            "events": ["agent.spawned"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "w1"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/marketplace/plugins/p%2F1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let webhook = CreateWebhook {
        url: "https://example.test/hook".to_owned(),
        events: vec!["agent.spawned".to_owned()],
        secret: None,
    };
    client.webhooks().create(&webhook).await.expect("create ok");
    client
        .plugins()
        .uninstall("p/1")
        .await
        .expect("uninstall ok");
}

#[tokio::test]
async fn call_operation_renders_catalog_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/agents/a1/timeline"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": ["e1"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let timeline = client
        .call_operation("getAgentTimeline", &[("uid", "a1")], &[("limit", "3")], None)
        .await
        .expect("call ok");
    assert_eq!(timeline, json!(["e1"]));

    let err = client
        .call_operation("getAgentTimeline", &[], &[], None)
        .await
        .expect_err("missing uid");
    assert!(matches!(err, ClientError::MissingPathParameter { .. }));

    let err = client
        .call_operation("noSuchOperation", &[], &[], None)
        .await
        .expect_err("unknown operation");
    assert!(matches!(err, ClientError::UnknownOperation(_)));
}

#[tokio::test]
async fn base_url_with_trailing_slashes_joins_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AetherClient::new(format!("{}//", server.uri())).expect("valid base URL");
    assert_eq!(client.base_url(), server.uri());
    client.webhooks().list().await.expect("list ok");
}

const EVENT_BODY: &str = "data: {\"type\":\"agent.spawned\",\"uid\":\"a1\"}\n\n\
data: {not json\n\n\
: keep-alive\n\
data: {\"type\":\"agent.killed\",\n\
data: \"uid\":\"a1\"}\n\n";

#[tokio::test]
async fn event_stream_sends_filter_and_skips_malformed_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .and(query_param("filter", "agent.spawned,agent.killed"))
        .and(header("accept", "text/event-stream"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_token("t");
    let events: Vec<_> = client
        .events()
        .subscribe(&["agent.spawned", "agent.killed"])
        .await
        .expect("stream opens")
        .map(|item| item.expect("event"))
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_type(), Some("agent.spawned"));
    assert_eq!(
        events[1].payload(),
        &json!({"type": "agent.killed", "uid": "a1"})
    );
}

#[tokio::test]
async fn event_stream_without_filter_sends_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let events: Vec<_> = client
        .subscribe_events::<&str>(&[])
        .await
        .expect("stream opens")
        .collect()
        .await;
    assert!(events.is_empty());

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn malformed_hook_sees_dropped_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let decoder = SseDecoder::new().with_malformed_hook(Arc::new(move |raw, _err| {
        sink.lock().expect("hook lock").push(raw.to_owned());
    }));

    let client = client_for(&server);
    let count = client
        .events()
        .subscribe_with_decoder::<&str>(&[], decoder)
        .await
        .expect("stream opens")
        .count()
        .await;

    assert_eq!(count, 2);
    assert_eq!(*seen.lock().expect("hook lock"), vec!["{not json".to_owned()]);
}

#[tokio::test]
async fn event_stream_open_failure_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "UNAUTHORIZED", "message": "Token expired"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .events()
        .subscribe::<&str>(&[])
        .await
        .expect_err("open fails");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.code(), Some("UNAUTHORIZED"));
}

#[tokio::test]
async fn streams_opened_after_close_end_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.close();

    let mut events = client
        .events()
        .subscribe::<&str>(&[])
        .await
        .expect("stream opens");
    assert!(events.next().await.is_none());
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/triggers"))
        .and(header("user-agent", "ops-bot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AetherClient::with_config(
        ClientConfig::new(server.uri()).with_user_agent("ops-bot/1.0"),
    )
    .expect("valid config");
    client.triggers().list().await.expect("list ok");
}

#[tokio::test]
async fn stream_from_temporary_client_keeps_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(EVENT_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let events = AetherClient::new(server.uri())
        .expect("valid base URL")
        .subscribe_events::<&str>(&[])
        .await
        .expect("stream opens");

    assert_eq!(events.count().await, 2);
}
