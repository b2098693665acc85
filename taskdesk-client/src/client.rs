/// Typed HTTP client for the TaskDesk API
///
/// Wraps a `reqwest::Client` with the server base URL and an optional bearer
/// token. Non-2xx responses are decoded from the API's error body into
/// [`ClientError::Api`].
///
/// # Example
///
/// ```no_run
/// use taskdesk_client::client::ApiClient;
///
/// # async fn example() -> Result<(), taskdesk_client::client::ClientError> {
/// let mut client = ApiClient::new("http://localhost:8080");
/// let login = client.login("admin", "Admin123!").await?;
/// client.set_token(login.token);
///
/// for task in client.list_tasks().await? {
///     println!("{} {}", task.status, task.title);
/// }
/// # Ok(())
/// # }
/// ```

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use taskdesk_shared::models::{Role, TaskDto, TaskStatus, UserDto};
use tracing::debug;
use uuid::Uuid;

/// Result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`ApiClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("{message} ({status}, {error})")]
    Api {
        status: StatusCode,
        error: String,
        message: String,
    },

    /// Connection, TLS or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An authenticated call was made without a token
    #[error("Not logged in; run `taskdesk login` and export TASKDESK_TOKEN")]
    MissingToken,
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error body sent by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

/// Body of `POST /api/tasks`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    pub assigned_user_id: Uuid,
}

/// Body of `PUT /api/tasks/:id`; `None` fields are omitted
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<Uuid>,
}

/// Body of `POST /api/users`
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserBody {
    pub username: String,
    pub email: String,
    pub password: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Body of `PUT /api/users/:id`; `None` fields are omitted
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// TaskDesk API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Creates a client that authenticates with `token`
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut client = Self::new(base_url);
        client.set_token(token);
        client
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    /// Turns a non-2xx response into [`ClientError::Api`]
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (error, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.message),
            Err(_) => ("http_error".to_string(), text),
        };
        debug!(status = %status, error = %error, "API request failed");

        Err(ClientError::Api {
            status,
            error,
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(request: RequestBuilder) -> ClientResult<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Exchanges credentials for a token
    ///
    /// The token is returned, not stored; call [`ApiClient::set_token`] to use it.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginBody { username, password });
        Self::send_json(request).await
    }

    /// Profile of the logged-in user
    pub async fn me(&self) -> ClientResult<UserDto> {
        Self::send_json(self.authed(Method::GET, "/api/auth/me")?).await
    }

    pub async fn list_tasks(&self) -> ClientResult<Vec<TaskDto>> {
        Self::send_json(self.authed(Method::GET, "/api/tasks")?).await
    }

    pub async fn get_task(&self, id: Uuid) -> ClientResult<TaskDto> {
        Self::send_json(self.authed(Method::GET, &format!("/api/tasks/{}", id))?).await
    }

    pub async fn create_task(&self, body: &CreateTaskBody) -> ClientResult<TaskDto> {
        Self::send_json(self.authed(Method::POST, "/api/tasks")?.json(body)).await
    }

    pub async fn update_task(&self, id: Uuid, body: &UpdateTaskBody) -> ClientResult<TaskDto> {
        Self::send_json(self.authed(Method::PUT, &format!("/api/tasks/{}", id))?.json(body)).await
    }

    pub async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        Self::send_empty(self.authed(Method::DELETE, &format!("/api/tasks/{}", id))?).await
    }

    pub async fn list_users(&self) -> ClientResult<Vec<UserDto>> {
        Self::send_json(self.authed(Method::GET, "/api/users")?).await
    }

    pub async fn get_user(&self, id: Uuid) -> ClientResult<UserDto> {
        Self::send_json(self.authed(Method::GET, &format!("/api/users/{}", id))?).await
    }

    pub async fn create_user(&self, body: &CreateUserBody) -> ClientResult<UserDto> {
        Self::send_json(self.authed(Method::POST, "/api/users")?.json(body)).await
    }

    pub async fn update_user(&self, id: Uuid, body: &UpdateUserBody) -> ClientResult<UserDto> {
        Self::send_json(self.authed(Method::PUT, &format!("/api/users/{}", id))?.json(body)).await
    }

    pub async fn delete_user(&self, id: Uuid) -> ClientResult<()> {
        Self::send_empty(self.authed(Method::DELETE, &format!("/api/users/{}", id))?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/api/tasks"), "http://localhost:8080/api/tasks");
    }

    #[tokio::test]
    async fn test_authenticated_call_without_token_fails_fast() {
        let client = ApiClient::new("http://127.0.0.1:9");
        assert!(matches!(client.list_tasks().await, Err(ClientError::MissingToken)));
    }

    #[test]
    fn test_update_body_omits_unset_fields() {
        let body = UpdateTaskBody {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "status": "Completed" })
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: StatusCode::FORBIDDEN,
            error: "forbidden".to_string(),
            message: "Not allowed to create tasks".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(err.to_string().starts_with("Not allowed to create tasks"));
    }
}
