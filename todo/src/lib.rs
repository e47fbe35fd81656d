//! Todo management workflow for a logged-in user.
//!
//! The controller owns the list of todos, the add/edit/delete modals, bulk
//! generation of synthetic todos and the refresh signal that tells the
//! presentation layer the list changed. A separate reducer handles profile
//! updates. Everything talks to the backend through [`TodoApi`], so the
//! workflow runs against [`BackendClient`](todo_workflow_client::BackendClient)
//! in production and against [`MockTodoApi`](mock::MockTodoApi) in tests.
//!
//! - Every successful mutation bumps the refresh version exactly once and
//!   broadcasts [`TodoAction::ListInvalidated`]
//! - Forms are validated before any request is made
//! - A second submit is ignored while the first is in flight
//! - Deleting always goes through a confirmation step
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use todo_workflow::session::{FileSessionStore, SessionContext};
//! use todo_workflow::{TodoAction, TodoEnvironment, TodoReducer, TodoState};
//! use todo_workflow_client::BackendClient;
//! use todo_workflow_core::environment::SystemClock;
//! use todo_workflow_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileSessionStore::new(".todo-session"));
//! let Some(session) = SessionContext::restore(store, "loggedInUser").await? else {
//!     return Ok(());
//! };
//!
//! let env = TodoEnvironment::new(
//!     Arc::new(BackendClient::new("http://localhost:1337/api")),
//!     Arc::new(session),
//!     Arc::new(SystemClock),
//! );
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! store
//!     .send_and_wait_for(
//!         TodoAction::Load,
//!         |a| matches!(a, TodoAction::TodosLoaded { .. } | TodoAction::LoadFailed { .. }),
//!         Duration::from_secs(10),
//!     )
//!     .await?;
//!
//! let view = store.state(TodoState::view).await;
//! println!("{:?}", view.list);
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod config;
pub mod environment;
pub mod error;
pub mod mock;
pub mod profile;
pub mod reducer;
pub mod session;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use environment::{TodoApi, TodoEnvironment};
pub use error::WorkflowError;
pub use profile::{ProfileAction, ProfileReducer, ProfileState};
pub use reducer::TodoReducer;
pub use session::{SessionContext, SessionStore};
pub use types::{
    ListView, Modal, Notification, NotificationKind, ProfileInput, Session, Todo, TodoAction,
    TodoInput, TodoState, TodoView, User,
};
