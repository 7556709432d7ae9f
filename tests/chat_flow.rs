use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{ Json, Router };
use serde_json::{ json, Value };

use medicare_chat::auth::{ AuthService, SignupForm };
use medicare_chat::backend::http::HttpBackend;
use medicare_chat::backend::BackendClient;
use medicare_chat::models::chat::Sender;
use medicare_chat::session::{ ChatSession, FALLBACK_REPLY };
use medicare_chat::store::{ MemoryProfileStore, ProfileStore };

/// Serves `router` on an ephemeral port and returns its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// The collaborator contract: POST /chat echoes with a route tag, POST
/// /login accepts exactly one credential pair.
fn assistant_router() -> Router {
    Router::new()
        .route(
            "/chat",
            post(|Json(body): Json<Value>| async move {
                let message = body["message"].as_str().unwrap_or_default().to_string();
                Json(json!({ "reply": format!("echo: {}", message), "route": "triage" }))
            }),
        )
        .route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                if body["username"] == "alex" && body["password"] == "pw" {
                    (StatusCode::OK, Json(json!({ "email": "alex@clinic.org" })))
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "detail": "Invalid username or password." })),
                    )
                }
            }),
        )
}

async fn client_for(base_url: &str) -> Arc<dyn BackendClient> {
    Arc::new(HttpBackend::new(base_url, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn first_send_creates_a_chat_and_the_reply_follows_it_home() {
    let base_url = spawn_backend(assistant_router()).await;
    let session = ChatSession::new(client_for(&base_url).await);

    let text = "I have had a sore throat for three days";
    let handle = session.send_message(text).await.expect("message accepted");
    let original_id = session.active_chat().await.unwrap().id;

    // The user starts a new conversation before the reply arrives.
    session.start_new_chat().await;
    handle.await.unwrap();

    let chats = session.chat_list().await;
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].1, format!("{}...", &text[..25]));

    assert!(session.open_chat(original_id).await);
    let chat = session.active_chat().await.unwrap();
    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].sender, Sender::User);
    assert_eq!(chat.messages[1].text, format!("echo: {}", text));
    assert_eq!(chat.messages[1].route.as_deref(), Some("triage"));
    assert!(!session.is_bot_processing().await);
}

#[tokio::test]
async fn backend_errors_surface_as_the_fallback_reply() {
    let router = Router::new().route(
        "/chat",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base_url = spawn_backend(router).await;
    let session = ChatSession::new(client_for(&base_url).await);

    let handle = session.send_message("hello?").await.expect("message accepted");
    handle.await.unwrap();

    let chat = session.active_chat().await.unwrap();
    assert_eq!(chat.messages[1].text, FALLBACK_REPLY);
    assert_eq!(chat.messages[1].sender, Sender::Bot);
}

#[tokio::test]
async fn unreachable_backend_also_falls_back() {
    // Bind and immediately drop a listener so the port refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = ChatSession::new(client_for(&base_url).await);
    let handle = session.send_message("anyone there?").await.expect("message accepted");
    handle.await.unwrap();

    let chat = session.active_chat().await.unwrap();
    assert_eq!(chat.messages[1].text, FALLBACK_REPLY);
}

#[tokio::test]
async fn signup_login_and_logout_round_trip() {
    let base_url = spawn_backend(assistant_router()).await;
    let store: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::new());
    let auth = AuthService::new(Arc::clone(&store), client_for(&base_url).await);

    auth.sign_up(&SignupForm {
        username: "alex".to_string(),
        email: "alex@clinic.org".to_string(),
        password: "pw".to_string(),
        confirm_password: "pw".to_string(),
    })
    .await
    .unwrap();

    let profile = auth.login("alex", "pw").await.unwrap();
    assert_eq!(profile.name, "alex");
    assert_eq!(profile.email, "alex@clinic.org");
    assert_eq!(profile.status, "Active User");
    assert_eq!(
        store.get("user_email").await.unwrap().as_deref(),
        Some("alex@clinic.org")
    );

    let rejected = auth.login("alex", "wrong").await.unwrap_err();
    assert_eq!(rejected.to_string(), "Invalid username or password.");

    auth.logout().await.unwrap();
    let profile = auth.profile().await.unwrap();
    assert_eq!(profile.name, "Guest");
    assert_eq!(profile.email, "No email");
    assert_eq!(profile.status, "Not logged in");
}
