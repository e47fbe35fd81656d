//! Domain types for the todo workflow.
//!
//! The controller state mirrors what the presentation layer renders: the
//! list, which modal is open, the form contents, and the toast queue. The
//! list itself is never edited locally; it is always re-fetched after a
//! mutation.

use crate::error::WorkflowError;
use crate::validation::FieldErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use todo_workflow_client::{Todo, TodoInput, UserPatch};

/// Number of records a bulk run creates unless told otherwise
pub const DEFAULT_BULK_COUNT: usize = 100;

/// Notification shown after a successful edit
pub const MSG_TODO_UPDATED: &str = "Todo updated successfully!";

/// Notification shown after a successful delete
pub const MSG_TODO_DELETED: &str = "The todo is deleted";

/// Notification shown after a successful profile update
pub const MSG_USER_UPDATED: &str = "User updated successfully!";

/// Notification shown when any mutation fails
pub const MSG_SOMETHING_WENT_WRONG: &str = "Something went wrong!";

/// Signal rendered when the loaded list is empty
pub const MSG_NO_TODOS: &str = "No Todos Yet";

// ========== Session ==========

/// The logged-in user
///
/// Any field besides `id`, `username` and `email` is kept in `extra` so that
/// rewriting the session never drops data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id
    pub id: u64,
    /// Username
    #[serde(default)]
    pub username: String,
    /// Email
    #[serde(default)]
    pub email: String,
    /// Every other field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Create a user with no extra fields
    #[must_use]
    pub fn new(id: u64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// Overwrite the fields present in `patch`
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(username) = &patch.username {
            self.username.clone_from(username);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
    }
}

/// Bearer token and identity of the logged-in user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    pub jwt: String,
    /// Logged-in user
    pub user: User,
    /// Every other field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    /// Create a session with no extra fields
    #[must_use]
    pub fn new(jwt: impl Into<String>, user: User) -> Self {
        Self {
            jwt: jwt.into(),
            user,
            extra: Map::new(),
        }
    }
}

// ========== Forms ==========

/// Profile form payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    /// Username
    pub username: String,
    /// Email
    pub email: String,
}

impl From<&ProfileInput> for UserPatch {
    fn from(input: &ProfileInput) -> Self {
        Self {
            username: Some(input.username.clone()),
            email: Some(input.email.clone()),
        }
    }
}

impl From<&User> for ProfileInput {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Login form payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInput {
    /// Email address used to log in
    pub identifier: String,
    /// Password
    pub password: String,
}

/// Registration form payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInput {
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Password
    pub password: String,
}

// ========== Notifications ==========

/// Toast style
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

/// A toast waiting to be shown or dismissed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Style
    pub kind: NotificationKind,
    /// Text
    pub message: String,
    /// When it was raised
    pub raised_at: DateTime<Utc>,
}

impl Notification {
    /// Success toast
    #[must_use]
    pub fn success(message: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            raised_at,
        }
    }

    /// Error toast
    #[must_use]
    pub fn error(message: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            raised_at,
        }
    }
}

// ========== Controller state ==========

/// Which modal is open
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modal {
    /// No modal
    #[default]
    None,
    /// "Add a new todo"
    Add,
    /// "Edit this todo"
    Edit,
    /// "Are you sure you want to remove this todo?"
    ConfirmDelete,
}

/// Last fetched list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListState {
    /// No fetch has completed yet
    #[default]
    Loading,
    /// Result of the latest completed fetch
    Loaded(Vec<Todo>),
}

/// State of the todo workflow controller
#[derive(Clone, Debug, PartialEq)]
pub struct TodoState {
    /// Last fetched list
    pub list: ListState,
    /// Bumped once per successful mutation; fetch results for older versions are discarded
    pub refresh_version: u64,
    /// Open modal
    pub modal: Modal,
    /// Contents of the add form
    pub add_form: TodoInput,
    /// Validation errors of the add form
    pub add_errors: FieldErrors,
    /// Contents of the edit form
    pub edit_form: TodoInput,
    /// Validation errors of the edit form
    pub edit_errors: FieldErrors,
    /// Todo being edited
    pub edit_target: Option<Todo>,
    /// Todo awaiting delete confirmation
    pub delete_target: Option<Todo>,
    /// A create/update/delete request is in flight
    pub submitting: bool,
    /// `documentId` the in-flight update or delete was sent for
    pub in_flight_document: Option<String>,
    /// A bulk run is in progress
    pub generating: bool,
    /// Toast queue, oldest first
    pub notifications: Vec<Notification>,
    /// Most recent failure
    pub last_error: Option<WorkflowError>,
}

impl Default for TodoState {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoState {
    /// Initial state: loading, refresh version 1, nothing open
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: ListState::Loading,
            refresh_version: 1,
            modal: Modal::None,
            add_form: TodoInput::default(),
            add_errors: FieldErrors::new(),
            edit_form: TodoInput::default(),
            edit_errors: FieldErrors::new(),
            edit_target: None,
            delete_target: None,
            submitting: false,
            in_flight_document: None,
            generating: false,
            notifications: Vec::new(),
            last_error: None,
        }
    }

    /// Todos of the last completed fetch (empty while loading)
    #[must_use]
    pub fn todos(&self) -> &[Todo] {
        match &self.list {
            ListState::Loading => &[],
            ListState::Loaded(todos) => todos,
        }
    }

    /// Derived view for the presentation layer
    #[must_use]
    pub fn view(&self) -> TodoView {
        let list = match &self.list {
            ListState::Loading => ListView::Loading,
            ListState::Loaded(todos) if todos.is_empty() => ListView::Empty,
            ListState::Loaded(todos) => ListView::Items(todos.clone()),
        };

        TodoView {
            list,
            modal: self.modal,
            edit_target: self.edit_target.clone(),
            delete_target: self.delete_target.clone(),
            submitting: self.submitting,
            generating: self.generating,
            add_errors: self.add_errors.clone(),
            edit_errors: self.edit_errors.clone(),
        }
    }
}

/// What the list area shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    /// Skeleton, first fetch still running
    Loading,
    /// "No Todos Yet"
    Empty,
    /// Todos in server order
    Items(Vec<Todo>),
}

/// Everything the presentation layer needs to render the workflow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoView {
    /// List area
    pub list: ListView,
    /// Open modal
    pub modal: Modal,
    /// Todo being edited
    pub edit_target: Option<Todo>,
    /// Todo awaiting delete confirmation
    pub delete_target: Option<Todo>,
    /// Submit buttons show a spinner and ignore clicks
    pub submitting: bool,
    /// Bulk run in progress
    pub generating: bool,
    /// Inline errors of the add form
    pub add_errors: FieldErrors,
    /// Inline errors of the edit form
    pub edit_errors: FieldErrors,
}

// ========== Actions ==========

/// Actions of the todo workflow controller
///
/// Commands come from the presentation layer; events are produced by
/// effects, fed back into the reducer and broadcast to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum TodoAction {
    // Commands
    /// Fetch the list for the current refresh version
    Load,
    /// Open the add modal
    OpenAddModal,
    /// Close the add modal and reset its form
    CloseAddModal,
    /// Validate and create a todo
    SubmitAdd(TodoInput),
    /// Open the edit modal prefilled with `todo`
    OpenEditModal(Todo),
    /// Close the edit modal and reset its form
    CloseEditModal,
    /// Validate and update the edit target
    SubmitEdit(TodoInput),
    /// Ask for confirmation before deleting `todo`
    RequestDelete(Todo),
    /// Dismiss the confirmation
    CancelDelete,
    /// Delete the todo awaiting confirmation
    ConfirmDelete,
    /// Create `count` synthetic todos
    GenerateTodos {
        /// Number of create attempts
        count: usize,
    },
    /// Remove a toast
    DismissNotification {
        /// Position in the queue
        index: usize,
    },

    // Events
    /// The list is stale and is being re-fetched for `version`
    ListInvalidated {
        /// Refresh version the re-fetch belongs to
        version: u64,
    },
    /// Fetch for `version` succeeded
    TodosLoaded {
        /// Refresh version the fetch was issued for
        version: u64,
        /// Todos in server order
        todos: Vec<Todo>,
    },
    /// Fetch for `version` failed
    LoadFailed {
        /// Refresh version the fetch was issued for
        version: u64,
        /// Failure
        error: WorkflowError,
    },
    /// Create succeeded
    TodoCreated,
    /// Create failed
    CreateFailed {
        /// Failure
        error: WorkflowError,
    },
    /// Update succeeded
    TodoUpdated,
    /// Update failed
    UpdateFailed {
        /// Failure
        error: WorkflowError,
    },
    /// Delete succeeded
    TodoDeleted,
    /// Delete failed
    DeleteFailed {
        /// Failure
        error: WorkflowError,
    },
    /// Bulk run finished
    TodosGenerated {
        /// Create attempts made
        attempted: usize,
        /// Attempts that failed
        failed: usize,
    },
}
