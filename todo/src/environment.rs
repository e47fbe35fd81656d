//! Injected dependencies of the workflow reducers.

use crate::bulk::{self, BulkOutcome};
use crate::error::WorkflowError;
use crate::session::SessionContext;
use crate::types::{Session, Todo, TodoInput, UserPatch};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use todo_workflow_client::BackendClient;
use todo_workflow_core::environment::Clock;
use tokio::sync::Semaphore;

/// Backend operations the workflow needs
///
/// Implemented by [`BackendClient`] in production and by
/// [`MockTodoApi`](crate::mock::MockTodoApi) in tests.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// Todos of the user owning `jwt`, in server order
    async fn list_todos(&self, jwt: &str) -> Result<Vec<Todo>, WorkflowError>;

    /// Create a todo owned by `user_id`
    async fn create_todo(&self, jwt: &str, user_id: u64, input: &TodoInput) -> Result<(), WorkflowError>;

    /// Replace title and description of the todo `document_id`
    async fn update_todo(&self, jwt: &str, document_id: &str, input: &TodoInput) -> Result<(), WorkflowError>;

    /// Delete the todo `document_id`
    async fn delete_todo(&self, jwt: &str, document_id: &str) -> Result<(), WorkflowError>;

    /// Update the profile of `user_id`
    async fn update_user(&self, jwt: &str, user_id: u64, patch: &UserPatch) -> Result<(), WorkflowError>;
}

#[async_trait]
impl TodoApi for BackendClient {
    async fn list_todos(&self, jwt: &str) -> Result<Vec<Todo>, WorkflowError> {
        Ok(self.me_with_todos(jwt).await?.todos)
    }

    async fn create_todo(&self, jwt: &str, user_id: u64, input: &TodoInput) -> Result<(), WorkflowError> {
        Ok(BackendClient::create_todo(self, jwt, user_id, input).await?)
    }

    async fn update_todo(&self, jwt: &str, document_id: &str, input: &TodoInput) -> Result<(), WorkflowError> {
        Ok(BackendClient::update_todo(self, jwt, document_id, input).await?)
    }

    async fn delete_todo(&self, jwt: &str, document_id: &str) -> Result<(), WorkflowError> {
        Ok(BackendClient::delete_todo(self, jwt, document_id).await?)
    }

    async fn update_user(&self, jwt: &str, user_id: u64, patch: &UserPatch) -> Result<(), WorkflowError> {
        Ok(BackendClient::update_user(self, jwt, user_id, patch).await?)
    }
}

/// Environment of [`TodoReducer`](crate::reducer::TodoReducer) and
/// [`ProfileReducer`](crate::profile::ProfileReducer)
///
/// The request builders below clone what they need, so the returned futures
/// are `'static` and can be wrapped in effects.
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Backend
    pub api: Arc<dyn TodoApi>,
    /// Logged-in session
    pub session: Arc<SessionContext>,
    /// Clock for notification timestamps
    pub clock: Arc<dyn Clock>,
    /// Maximum create requests in flight during a bulk run
    pub bulk_concurrency: usize,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` with strictly sequential bulk runs
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, session: Arc<SessionContext>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            session,
            clock,
            bulk_concurrency: 1,
        }
    }

    /// Set the bulk run concurrency, clamped to `1..=Semaphore::MAX_PERMITS`
    #[must_use]
    pub fn with_bulk_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    /// Fetch the list
    pub fn list_todos(&self) -> impl Future<Output = Result<Vec<Todo>, WorkflowError>> + Send + use<> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        async move {
            let Session { jwt, .. } = session.snapshot().await;
            api.list_todos(&jwt).await
        }
    }

    /// Create a todo owned by the session user
    pub fn create_todo(&self, input: TodoInput) -> impl Future<Output = Result<(), WorkflowError>> + Send + use<> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        async move {
            let session = session.snapshot().await;
            api.create_todo(&session.jwt, session.user.id, &input).await
        }
    }

    /// Update the todo `document_id`
    pub fn update_todo(
        &self,
        document_id: String,
        input: TodoInput,
    ) -> impl Future<Output = Result<(), WorkflowError>> + Send + use<> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        async move {
            let Session { jwt, .. } = session.snapshot().await;
            api.update_todo(&jwt, &document_id, &input).await
        }
    }

    /// Delete the todo `document_id`
    pub fn delete_todo(&self, document_id: String) -> impl Future<Output = Result<(), WorkflowError>> + Send + use<> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        async move {
            let Session { jwt, .. } = session.snapshot().await;
            api.delete_todo(&jwt, &document_id).await
        }
    }

    /// Create `count` synthetic todos, never aborting on a single failure
    pub fn generate_todos(&self, count: usize) -> impl Future<Output = BulkOutcome> + Send + use<> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        let concurrency = self.bulk_concurrency;
        let inputs = bulk::synthetic_todos(count);
        async move {
            let session = session.snapshot().await;
            bulk::create_all(api, session, inputs, concurrency).await
        }
    }

    /// Update the session user's profile, then merge it into the session
    pub fn update_profile(&self, patch: UserPatch) -> impl Future<Output = Result<Session, WorkflowError>> + Send + use<> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        async move {
            let current = session.snapshot().await;
            api.update_user(&current.jwt, current.user.id, &patch).await?;
            Ok(session.merge_user(&patch).await?)
        }
    }
}
