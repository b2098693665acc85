/// End-to-end tests for the client against a live router
///
/// Each test binds the real API router on an ephemeral port over a seeded
/// in-memory store and talks to it through `ApiClient`.

use reqwest::StatusCode;
use std::sync::Arc;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, LogFormat, StorageBackend};
use taskdesk_api::seed;
use taskdesk_client::client::{
    ApiClient, ClientError, CreateTaskBody, CreateUserBody, UpdateTaskBody, UpdateUserBody,
};
use taskdesk_client::shell;
use taskdesk_shared::models::{Role, TaskStatus};
use taskdesk_shared::store::MemoryStore;

fn config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "client-test-secret-at-least-32-bytes-long".to_string(),
            expiration_hours: 1,
        },
        seed_demo_data: true,
        log_format: LogFormat::Pretty,
    }
}

/// Starts a seeded server and returns its base URL
async fn spawn_server() -> String {
    let store = Arc::new(MemoryStore::new());
    seed::seed_demo_data(store.as_ref()).await.unwrap();
    let app = build_router(AppState::new(store, config()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn logged_in(base_url: &str, username: &str, password: &str) -> ApiClient {
    let mut client = ApiClient::new(base_url);
    let login = client.login(username, password).await.unwrap();
    client.set_token(login.token);
    client
}

#[tokio::test]
async fn test_login_and_me() {
    let base_url = spawn_server().await;
    let client = ApiClient::new(&base_url);

    let login = client.login("admin", "Admin123!").await.unwrap();
    assert_eq!(login.user.role, Role::Admin);

    let client = ApiClient::with_token(&base_url, login.token);
    let me = client.me().await.unwrap();
    assert_eq!(me.username, "admin");
    assert_eq!(
        shell::available_actions(me.role),
        shell::available_actions(Role::Admin)
    );
}

#[tokio::test]
async fn test_bad_login_maps_to_api_error() {
    let base_url = spawn_server().await;
    let client = ApiClient::new(&base_url);

    match client.login("admin", "nope").await {
        Err(ClientError::Api { status, error, .. }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(error, "unauthorized");
        }
        other => panic!("unexpected {:?}", other.map(|l| l.user)),
    }
}

#[tokio::test]
async fn test_user_workflow() {
    let base_url = spawn_server().await;
    let client = logged_in(&base_url, "user", "User123!").await;

    let tasks = client.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.assigned_username == "user"));

    let pending = tasks
        .iter()
        .find(|t| t.status == TaskStatus::Pending)
        .unwrap();
    let updated = client
        .update_task(
            pending.id,
            &UpdateTaskBody {
                title: Some("Renamed".to_string()),
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.title, pending.title);

    let err = client
        .create_task(&CreateTaskBody {
            title: "Not allowed".to_string(),
            assigned_user_id: pending.assigned_user_id,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

    let err = client.list_users().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

    let table = shell::render_tasks(&client.list_tasks().await.unwrap());
    assert_eq!(table.lines().count(), 4);
}

#[tokio::test]
async fn test_admin_workflow() {
    let base_url = spawn_server().await;
    let client = logged_in(&base_url, "admin", "Admin123!").await;

    let user = client
        .create_user(&CreateUserBody {
            username: "erin".to_string(),
            email: "erin@taskdesk.local".to_string(),
            password: "Erin1234!".to_string(),
            role: None,
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);

    let task = client
        .create_task(&CreateTaskBody {
            title: "Welcome Erin".to_string(),
            description: Some("Say hello".to_string()),
            status: None,
            assigned_user_id: user.id,
        })
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(client.get_task(task.id).await.unwrap().assigned_username, "erin");
    assert_eq!(client.list_tasks().await.unwrap().len(), 4);

    // Erin still has a task
    let err = client.delete_user(user.id).await.unwrap_err();
    match err {
        ClientError::Api { status, error, .. } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error, "conflict");
        }
        other => panic!("unexpected {:?}", other),
    }

    client.delete_task(task.id).await.unwrap();
    let err = client.delete_task(task.id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let renamed = client
        .update_user(
            user.id,
            &UpdateUserBody {
                username: Some("erin.m".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(client.get_user(user.id).await.unwrap().username, renamed.username);

    client.delete_user(user.id).await.unwrap();
    assert_eq!(client.list_users().await.unwrap().len(), 2);
}
