//! HTTP transport and exchange against a mock webhook.

use hubnexus_chat::exchange::{ MessageExchange, Outgoing, SessionContext };
use hubnexus_chat::models::chat::MessageType;
use hubnexus_chat::models::webhook::{ TypeMessage, WebhookPayload };
use hubnexus_chat::webhook::{ HttpWebhookClient, ReplyPolicy, WebhookError, WebhookTransport };
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{ body_json, header, method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

#[tokio::test]
async fn posts_the_payload_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/meuportfolio"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "agent": "sdr",
            "message": "Olá",
            "typeMessage": "text",
            "sessionId": "abc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Oi"})))
        .expect(1)
        .mount(&server).await;

    let client = HttpWebhookClient::new(&format!("{}/webhook/meuportfolio", server.uri()), None).unwrap();
    let reply = client.post(&WebhookPayload::new("sdr", "Olá", TypeMessage::Text, "abc")).await.unwrap();
    assert_eq!(reply, json!({"message": "Oi"}));
}

#[tokio::test]
async fn error_status_with_json_body_is_still_a_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": 0, "message": "No item to return got found"})))
        .mount(&server).await;

    let client = HttpWebhookClient::new(&server.uri(), None).unwrap();
    let reply = client.post(&WebhookPayload::new("sdr", "x", TypeMessage::Text, "abc")).await.unwrap();
    assert_eq!(reply["code"], 0);

    let exchange = MessageExchange::new(Arc::new(client), ReplyPolicy::All);
    let replies = exchange
        .send_message(Outgoing::Text("x".into()), &SessionContext::new(Some("SDR"), "abc", None)).await;
    assert!(replies.is_empty());
}

#[tokio::test]
async fn empty_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let client = HttpWebhookClient::new(&server.uri(), None).unwrap();
    let err = client.post(&WebhookPayload::new("sdr", "x", TypeMessage::Text, "abc")).await.unwrap_err();
    assert!(matches!(err, WebhookError::Decode(_)));
}

#[tokio::test]
async fn first_policy_surfaces_one_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"message": "Workflow was started"},
            {"message": "data:audio/mp3;base64,AAAA", "typeMessage": "audio"},
            {"message": "depois"}
        ])))
        .mount(&server).await;

    let client = Arc::new(HttpWebhookClient::new(&server.uri(), None).unwrap());
    let exchange = MessageExchange::new(client, ReplyPolicy::First);
    let replies = exchange
        .send_message(Outgoing::Text("x".into()), &SessionContext::new(Some("SDR"), "abc", None)).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].message_type, MessageType::Audio);
}
