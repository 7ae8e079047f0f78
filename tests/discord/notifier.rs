use std::sync::Arc;

use serde_json::json;
use slopwatch::core::notify::Notifier;
use slopwatch::core::task::UpdateKind;
use slopwatch::error::NotifyError;
use slopwatch::transport::discord::DiscordNotifier;
use slopwatch::transport::discord::http_client::DiscordHttpClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::harness::task;

fn notifier(server: &MockServer, roles: Vec<String>) -> DiscordNotifier {
    let http = Arc::new(DiscordHttpClient::with_base_url("test-token", server.uri()));
    DiscordNotifier::new(http, "123", roles)
}

#[tokio::test]
async fn new_task_is_posted_as_an_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/123/messages"))
        .and(header("Authorization", "Bot test-token"))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "🆕 New Task: Task /t/1",
                "url": "https://slopwork.xyz/t/1",
                "footer": { "text": "Slopwork.xyz Task Monitor" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "999" })))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server, Vec::new())
        .notify(&task("/t/1"), UpdateKind::New)
        .await
        .expect("delivery succeeds");
}

#[tokio::test]
async fn mention_roles_are_prefixed_to_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/123/messages"))
        .and(body_partial_json(json!({
            "content": "<@&42> <@&43>",
            "allowed_mentions": { "parse": ["roles"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server, vec!["42".into(), " 43 ".into()])
        .notify(&task("/t/1"), UpdateKind::New)
        .await
        .expect("delivery succeeds");
}

#[tokio::test]
async fn server_error_surfaces_as_delivery_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/123/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let error = notifier(&server, Vec::new())
        .notify(&task("/t/1"), UpdateKind::New)
        .await
        .expect_err("500 must fail");

    let NotifyError::Delivery { channel, message } = error;
    assert_eq!(channel, "123");
    assert!(message.contains("500"), "unexpected message: {message}");
}

#[tokio::test]
async fn rate_limited_post_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/123/messages"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_json(json!({ "message": "slow down", "retry_after": 0.0 })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/123/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "2" })))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server, Vec::new())
        .notify(&task("/t/9"), UpdateKind::New)
        .await
        .expect("retry succeeds");
}
