//! Backend REST client implementation

use crate::{
    error::ApiError,
    types::{CreateTodoBody, DataEnvelope, MeResponse, TodoInput, UserPatch},
};
use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;

/// Authenticated client for the todo backend
///
/// Every call takes the bearer token explicitly; the client itself holds no
/// session.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:1337/api`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client whose requests time out after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the HTTP client cannot be built
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of one record in `collection`, with `id` escaped as a single path segment
    fn item_url(&self, collection: &str, id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url(collection))
            .map_err(|e| ApiError::RequestFailed(format!("invalid URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::RequestFailed(format!("invalid base URL: {}", self.base_url)))?
            .push(id);
        Ok(url)
    }

    /// Fetch the current user together with their todos
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, a rejected token, unexpected
    /// statuses, or an unreadable body
    #[tracing::instrument(skip_all)]
    pub async fn me_with_todos(&self, jwt: &str) -> Result<MeResponse, ApiError> {
        let response = self
            .client
            .get(self.url("users/me"))
            .query(&[("populate", "todos")])
            .bearer_auth(jwt)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(method = "GET", path = "users/me", status = %response.status(), "Backend response");

        match response.status() {
            StatusCode::OK => response
                .json::<MeResponse>()
                .await
                .map_err(|e| ApiError::ResponseParseFailed(e.to_string())),
            _ => Err(Self::unexpected(response).await),
        }
    }

    /// Create a todo owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, a rejected token, or any status
    /// other than 200
    #[tracing::instrument(skip(self, jwt, input))]
    pub async fn create_todo(&self, jwt: &str, user_id: u64, input: &TodoInput) -> Result<(), ApiError> {
        let body = DataEnvelope {
            data: CreateTodoBody {
                title: input.title.clone(),
                description: input.description.clone(),
                user: vec![user_id],
            },
        };

        let response = self
            .client
            .post(self.url("todos"))
            .bearer_auth(jwt)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(method = "POST", path = "todos", status = %response.status(), "Backend response");

        match response.status() {
            StatusCode::OK => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    /// Replace the title and description of the todo identified by `document_id`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, a rejected token, or any status
    /// other than 200
    #[tracing::instrument(skip(self, jwt, input))]
    pub async fn update_todo(&self, jwt: &str, document_id: &str, input: &TodoInput) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.item_url("todos", document_id)?)
            .bearer_auth(jwt)
            .json(&DataEnvelope { data: input })
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(method = "PUT", path = "todos", status = %response.status(), "Backend response");

        match response.status() {
            StatusCode::OK => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    /// Delete the todo identified by `document_id`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, a rejected token, or any status
    /// other than 200/204
    #[tracing::instrument(skip(self, jwt))]
    pub async fn delete_todo(&self, jwt: &str, document_id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.item_url("todos", document_id)?)
            .bearer_auth(jwt)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(method = "DELETE", path = "todos", status = %response.status(), "Backend response");

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    /// Update the profile of user `user_id`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, a rejected token, or any status
    /// other than 200
    #[tracing::instrument(skip(self, jwt, patch))]
    pub async fn update_user(&self, jwt: &str, user_id: u64, patch: &UserPatch) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url(&format!("users/{user_id}")))
            .bearer_auth(jwt)
            .json(patch)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(method = "PUT", path = "users", status = %response.status(), "Backend response");

        match response.status() {
            StatusCode::OK => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn unexpected(response: Response) -> ApiError {
        match response.status() {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            status => {
                let body = response.text().await.unwrap_or_default();
                ApiError::UnexpectedStatus {
                    status: status.as_u16(),
                    message: body,
                }
            },
        }
    }
}
