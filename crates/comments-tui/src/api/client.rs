use async_trait::async_trait;
use comments_shared::{
    api::{CommentPayload, ErrorResponse},
    Comment, CommentId, TaskId,
};
use reqwest::{Client, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed with status {status}")]
    Status {
        status: StatusCode,
        /// `error` field of the response body, when the server sent one
        message: Option<String>,
    },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid response from server: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }
}

/// The four comment operations the panel depends on.
///
/// `ApiClient` talks to the real server; tests substitute in-memory fakes.
#[async_trait]
pub trait CommentsApi: Send + Sync {
    async fn list_comments(&self, task_id: &TaskId) -> Result<Vec<Comment>, ApiError>;

    async fn create_comment(
        &self,
        task_id: &TaskId,
        payload: &CommentPayload,
    ) -> Result<Comment, ApiError>;

    async fn update_comment(
        &self,
        comment_id: &CommentId,
        payload: &CommentPayload,
    ) -> Result<Comment, ApiError>;

    async fn delete_comment(&self, comment_id: &CommentId) -> Result<(), ApiError>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn task_comments_path(task_id: &TaskId) -> String {
        format!("/tasks/{}/comments", urlencoding::encode(task_id.as_str()))
    }

    fn comment_path(comment_id: &CommentId) -> String {
        format!("/comments/{}", urlencoding::encode(&comment_id.to_string()))
    }

    /// Handle API response
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "undecodable response body");
            ApiError::Decode(e)
        })
    }

    /// Handle response whose body is ignored on success
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ApiError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::status_error(response).await)
    }

    async fn status_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        // A body that is not `{ "error": ... }` is tolerated; callers fall back
        // to a status-coded message.
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|body| body.error)
            .filter(|m| !m.trim().is_empty());

        tracing::warn!(%status, ?message, "comment request failed");
        ApiError::Status { status, message }
    }
}

#[async_trait]
impl CommentsApi for ApiClient {
    async fn list_comments(&self, task_id: &TaskId) -> Result<Vec<Comment>, ApiError> {
        tracing::debug!(%task_id, "listing comments");
        let response = self
            .client
            .get(self.url(&Self::task_comments_path(task_id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_comment(
        &self,
        task_id: &TaskId,
        payload: &CommentPayload,
    ) -> Result<Comment, ApiError> {
        tracing::debug!(%task_id, "creating comment");
        let response = self
            .client
            .post(self.url(&Self::task_comments_path(task_id)))
            .json(payload)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn update_comment(
        &self,
        comment_id: &CommentId,
        payload: &CommentPayload,
    ) -> Result<Comment, ApiError> {
        tracing::debug!(%comment_id, "updating comment");
        let response = self
            .client
            .put(self.url(&Self::comment_path(comment_id)))
            .json(payload)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> Result<(), ApiError> {
        tracing::debug!(%comment_id, "deleting comment");
        let response = self
            .client
            .delete(self.url(&Self::comment_path(comment_id)))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}
