//! In-memory backend for tests and demos.
//!
//! [`MockTodoApi`] keeps a todo list, counts every call, can fail chosen
//! requests and can hold requests in flight until released.

use crate::environment::TodoApi;
use crate::error::WorkflowError;
use crate::types::{Todo, TodoInput, UserPatch};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Backend operation, for failure injection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /users/me?populate=todos`
    List,
    /// `POST /todos`
    Create,
    /// `PUT /todos/{documentId}`
    Update,
    /// `DELETE /todos/{documentId}`
    Delete,
    /// `PUT /users/{id}`
    UpdateUser,
}

#[derive(Debug, Default)]
struct Backend {
    todos: Vec<Todo>,
    next_id: u64,
    failing: HashMap<Operation, WorkflowError>,
    failing_creates: HashSet<usize>,
}

#[derive(Debug, Default)]
struct Counters {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
    update_user: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Recording in-memory implementation of [`TodoApi`]
#[derive(Debug)]
pub struct MockTodoApi {
    backend: Mutex<Backend>,
    counters: Counters,
    gate: watch::Sender<bool>,
}

impl Default for MockTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter when a call finishes
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn injected_failure() -> WorkflowError {
    WorkflowError::UnexpectedStatus {
        status: 500,
        message: "injected failure".to_string(),
    }
}

impl MockTodoApi {
    /// Empty backend, gate open, nothing failing
    #[must_use]
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            backend: Mutex::new(Backend {
                next_id: 1,
                ..Backend::default()
            }),
            counters: Counters::default(),
            gate,
        }
    }

    /// Backend pre-filled with `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let api = Self::new();
        {
            let mut backend = api.backend();
            backend.next_id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            backend.todos = todos;
        }
        api
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call of `operation` fails with `error` until [`recover`](Self::recover)
    pub fn fail(&self, operation: Operation, error: WorkflowError) {
        self.backend().failing.insert(operation, error);
    }

    /// Calls of `operation` succeed again
    pub fn recover(&self, operation: Operation) {
        self.backend().failing.remove(&operation);
    }

    /// Create attempts with these 0-based sequence numbers fail with a 500
    pub fn fail_create_attempts(&self, attempts: impl IntoIterator<Item = usize>) {
        self.backend().failing_creates.extend(attempts);
    }

    /// Hold every new request until [`release`](Self::release)
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held and future requests through
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Current contents of the backend
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.backend().todos.clone()
    }

    /// Number of list calls
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.counters.list.load(Ordering::SeqCst)
    }

    /// Number of create calls, including failed ones
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.counters.create.load(Ordering::SeqCst)
    }

    /// Number of update calls
    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.counters.update.load(Ordering::SeqCst)
    }

    /// Number of delete calls
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.counters.delete.load(Ordering::SeqCst)
    }

    /// Number of profile update calls
    #[must_use]
    pub fn update_user_calls(&self) -> usize {
        self.counters.update_user.load(Ordering::SeqCst)
    }

    /// Requests currently waiting at the gate or being served
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of requests ever in flight at once
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    /// Count the call, wait at the gate, then check for an injected failure
    ///
    /// Returns the 0-based sequence number of the call.
    async fn enter(
        &self,
        counter: &AtomicUsize,
        operation: Operation,
    ) -> Result<(usize, InFlight<'_>), WorkflowError> {
        let sequence = counter.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.counters.in_flight);

        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = gate.wait_for(|open| *open).await;

        // Yield once so concurrent callers overlap like real requests do
        tokio::task::yield_now().await;

        match self.backend().failing.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok((sequence, guard)),
        }
    }
}

#[async_trait]
impl TodoApi for MockTodoApi {
    async fn list_todos(&self, _jwt: &str) -> Result<Vec<Todo>, WorkflowError> {
        let (_, _guard) = self.enter(&self.counters.list, Operation::List).await?;
        Ok(self.todos())
    }

    async fn create_todo(&self, _jwt: &str, _user_id: u64, input: &TodoInput) -> Result<(), WorkflowError> {
        let (attempt, _guard) = self.enter(&self.counters.create, Operation::Create).await?;

        let mut backend = self.backend();
        if backend.failing_creates.contains(&attempt) {
            return Err(injected_failure());
        }

        let id = backend.next_id;
        backend.next_id += 1;
        backend.todos.push(Todo {
            id,
            document_id: Some(format!("doc-{id}")),
            title: input.title.clone(),
            description: input.description.clone(),
        });
        Ok(())
    }

    async fn update_todo(&self, _jwt: &str, document_id: &str, input: &TodoInput) -> Result<(), WorkflowError> {
        let (_, _guard) = self.enter(&self.counters.update, Operation::Update).await?;

        let mut backend = self.backend();
        let Some(todo) = backend
            .todos
            .iter_mut()
            .find(|t| t.document_id.as_deref() == Some(document_id))
        else {
            return Err(WorkflowError::UnexpectedStatus {
                status: 404,
                message: format!("no todo {document_id}"),
            });
        };
        todo.title.clone_from(&input.title);
        todo.description.clone_from(&input.description);
        Ok(())
    }

    async fn delete_todo(&self, _jwt: &str, document_id: &str) -> Result<(), WorkflowError> {
        let (_, _guard) = self.enter(&self.counters.delete, Operation::Delete).await?;

        let mut backend = self.backend();
        let before = backend.todos.len();
        backend
            .todos
            .retain(|t| t.document_id.as_deref() != Some(document_id));
        if backend.todos.len() == before {
            return Err(WorkflowError::UnexpectedStatus {
                status: 404,
                message: format!("no todo {document_id}"),
            });
        }
        Ok(())
    }

    async fn update_user(&self, _jwt: &str, _user_id: u64, _patch: &UserPatch) -> Result<(), WorkflowError> {
        let (_, _guard) = self.enter(&self.counters.update_user, Operation::UpdateUser).await?;
        Ok(())
    }
}
