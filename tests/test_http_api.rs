//! HTTP surface tests
//!
//! Drives the warp routes in-process with `warp::test` and a mock agent.

use papersprint_chat::chat::ChatDispatcher;
use papersprint_chat::config::ServerSection;
use papersprint_chat::intent::IntentRouter;
use papersprint_chat::server::handlers::{ErrorResponse, HealthResponse, TextResponse};
use papersprint_chat::server::ChatServer;
use papersprint_chat::testing::MockAgentGateway;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use warp::http::StatusCode;

const BASE: &str = "http://localhost:5173";
const WELCOME: &str = "Welcome to PaperSprint!";

fn server_with(agent: Arc<MockAgentGateway>, settings: ServerSection) -> ChatServer {
    let dispatcher = ChatDispatcher::new(Arc::new(IntentRouter::standard(BASE)), agent);
    ChatServer::new(dispatcher, WELCOME, settings)
}

fn default_server(agent: Arc<MockAgentGateway>) -> ChatServer {
    server_with(agent, ServerSection::default())
}

/// Bind the routes on an ephemeral port, send `request` verbatim and return
/// the raw HTTP response
async fn raw_exchange(server: ChatServer, request: &str) -> String {
    let (addr, serving) = warp::serve(server.routes()).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(serving);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    // An early 413 may reset the connection after the reply is written
    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await;
    String::from_utf8_lossy(&response).into_owned()
}

fn chunked_chat_request(body: &str) -> String {
    format!(
        "POST /chat HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Transfer-Encoding: chunked\r\n\
         Connection: close\r\n\
         \r\n\
         {:x}\r\n{}\r\n0\r\n\r\n",
        body.len(),
        body
    )
}

fn text_body(body: &[u8]) -> String {
    serde_json::from_slice::<TextResponse>(body).unwrap().response
}

fn error_body(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body).unwrap().error
}

#[tokio::test]
async fn test_welcome_returns_greeting() {
    let server = default_server(Arc::new(MockAgentGateway::with_fragments(vec!["unused"])));

    let response = warp::test::request()
        .method("GET")
        .path("/welcome")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response.body()), WELCOME);
}

#[tokio::test]
async fn test_chat_rule_hit_returns_canned_reply() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let server = default_server(agent.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": "what is the price for color printing"}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response.body()).starts_with("Color printing costs ₹5 per page."));
    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_chat_link_hit_returns_url() {
    let server = default_server(Arc::new(MockAgentGateway::with_fragments(vec!["unused"])));

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": "Take me to the BLOG"}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response.body()), "http://localhost:5173/blog");
}

#[tokio::test]
async fn test_chat_fallback_concatenates_agent_fragments() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec![
        "Why did",
        "the chicken...",
    ]));
    let server = default_server(agent.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": "tell me a joke"}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text_body(response.body()), "Why didthe chicken...");
    assert_eq!(agent.get_calls().await, vec!["tell me a joke".to_string()]);
}

#[tokio::test]
async fn test_chat_empty_message_is_bad_request() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let server = default_server(agent.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": ""}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(response.body()), "No message provided");
    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_chat_unreadable_bodies_are_bad_request() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let server = default_server(agent.clone());
    let routes = server.routes();

    for body in [
        "not json".to_string(),
        json!({}).to_string(),
        json!({"message": 42}).to_string(),
        json!({"text": "hello"}).to_string(),
        json!(["hello"]).to_string(),
    ] {
        let response = warp::test::request()
            .method("POST")
            .path("/chat")
            .header("content-type", "application/json")
            .body(body.clone())
            .reply(&routes)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(error_body(response.body()), "No message provided");
    }

    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_chat_agent_failure_is_internal_error_without_details() {
    let server = default_server(Arc::new(MockAgentGateway::with_failure()));

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": "tell me a joke"}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let raw = String::from_utf8_lossy(response.body()).to_string();
    assert!(!raw.contains("sk-secret"));
    assert_eq!(error_body(response.body()), "Failed to get response from AI");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let settings = ServerSection {
        max_body_bytes: 32,
        ..ServerSection::default()
    };
    let server = server_with(agent.clone(), settings);

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .json(&json!({"message": "x".repeat(128)}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = default_server(Arc::new(MockAgentGateway::with_fragments(vec!["unused"])));

    let response = warp::test::request()
        .method("GET")
        .path("/does-not-exist")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_body(response.body()), "Not found");
}

#[tokio::test]
async fn test_wrong_method_on_chat_is_rejected() {
    let server = default_server(Arc::new(MockAgentGateway::with_fragments(vec!["unused"])));

    let response = warp::test::request()
        .method("GET")
        .path("/chat")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_reports_agent_name() {
    let server = default_server(Arc::new(MockAgentGateway::with_fragments(vec!["unused"])));

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(response.body()).unwrap();
    assert!(health.alive);
    assert_eq!(health.provider, "mock-agent");
    assert!(health.timestamp > 0);
}

#[tokio::test]
async fn test_cors_headers_for_allowed_origin() {
    let settings = ServerSection {
        allowed_origins: vec!["https://papersprint.example".to_string()],
        ..ServerSection::default()
    };
    let server = server_with(
        Arc::new(MockAgentGateway::with_fragments(vec!["unused"])),
        settings,
    );

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .header("origin", "https://papersprint.example")
        .json(&json!({"message": "cart"}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://papersprint.example")
    );
}

#[tokio::test]
async fn test_cors_rejects_unlisted_origin() {
    let settings = ServerSection {
        allowed_origins: vec!["https://papersprint.example".to_string()],
        ..ServerSection::default()
    };
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let server = server_with(agent.clone(), settings);

    let response = warp::test::request()
        .method("POST")
        .path("/chat")
        .header("origin", "https://evil.example")
        .json(&json!({"message": "tell me a joke"}))
        .reply(&server.routes())
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_chunked_chat_body_is_accepted() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let server = default_server(agent.clone());

    let response = raw_exchange(server, &chunked_chat_request(r#"{"message":"cart"}"#)).await;

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("http://localhost:5173/cart"), "{response}");
    assert!(!response.contains("No message provided"));
    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_chunked_chat_body_reaches_agent() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["Why did", "the chicken..."]));
    let server = default_server(agent.clone());

    let response =
        raw_exchange(server, &chunked_chat_request(r#"{"message":"tell me a joke"}"#)).await;

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("Why didthe chicken..."), "{response}");
    assert_eq!(agent.get_calls().await, vec!["tell me a joke".to_string()]);
}

#[tokio::test]
async fn test_oversized_chunked_body_is_rejected() {
    let agent = Arc::new(MockAgentGateway::with_fragments(vec!["unused"]));
    let settings = ServerSection {
        max_body_bytes: 32,
        ..ServerSection::default()
    };
    let server = server_with(agent.clone(), settings);
    let body = json!({"message": "x".repeat(128)}).to_string();

    let response = raw_exchange(server, &chunked_chat_request(&body)).await;

    assert!(response.starts_with("HTTP/1.1 413"), "{response}");
    assert!(response.contains("Request body too large"), "{response}");
    assert_eq!(agent.call_count().await, 0);
}

#[tokio::test]
async fn test_error_replies_carry_cors_headers() {
    let settings = ServerSection {
        allowed_origins: vec!["https://papersprint.example".to_string()],
        max_body_bytes: 32,
        ..ServerSection::default()
    };
    let server = server_with(
        Arc::new(MockAgentGateway::with_fragments(vec!["unused"])),
        settings,
    );
    let routes = server.routes();

    let not_found = warp::test::request()
        .method("GET")
        .path("/does-not-exist")
        .header("origin", "https://papersprint.example")
        .reply(&routes)
        .await;
    let too_large = warp::test::request()
        .method("POST")
        .path("/chat")
        .header("origin", "https://papersprint.example")
        .json(&json!({"message": "x".repeat(128)}))
        .reply(&routes)
        .await;

    for (response, status) in [
        (not_found, StatusCode::NOT_FOUND),
        (too_large, StatusCode::PAYLOAD_TOO_LARGE),
    ] {
        assert_eq!(response.status(), status);
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("https://papersprint.example")
        );
    }
}
