//! # Todo Backend Client
//!
//! Thin authenticated REST client for the todo backend.
//!
//! ## Example
//!
//! ```no_run
//! use todo_workflow_client::{BackendClient, TodoInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BackendClient::new("http://localhost:1337/api");
//!
//!     let me = client.me_with_todos("jwt-token").await?;
//!     println!("{} has {} todos", me.username, me.todos.len());
//!
//!     client
//!         .create_todo("jwt-token", me.id, &TodoInput::new("Water plants", "x".repeat(50)))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! - `GET /users/me?populate=todos`
//! - `POST /todos` with `{data: {title, description, user: [id]}}`
//! - `PUT /todos/{documentId}` with `{data: {title, description}}`
//! - `DELETE /todos/{documentId}`
//! - `PUT /users/{id}` with `{username, email}`
//!
//! All requests carry `Authorization: Bearer <jwt>`.

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::BackendClient;
pub use error::ApiError;
pub use types::{CreateTodoBody, DataEnvelope, MeResponse, Todo, TodoInput, UserPatch};
