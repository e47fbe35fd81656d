//! Wire types exchanged with the backend

use serde::{Deserialize, Serialize};

/// A user-owned task record
///
/// Fields the backend adds (timestamps, locale, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Numeric identifier, shown in the list
    pub id: u64,
    /// Opaque identifier used in mutation URLs
    #[serde(rename = "documentId", default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
}

/// Title and description as entered in the add/edit forms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoInput {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
}

impl TodoInput {
    /// Create a new input
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<&Todo> for TodoInput {
    fn from(todo: &Todo) -> Self {
        Self::new(todo.title.clone(), todo.description.clone())
    }
}

/// Partial profile update, sent as the body of `PUT /users/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response of `GET /users/me?populate=todos`
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    /// User id
    pub id: u64,
    /// Username
    #[serde(default)]
    pub username: String,
    /// Email
    #[serde(default)]
    pub email: String,
    /// The user's todos, in server order
    #[serde(default)]
    pub todos: Vec<Todo>,
}

/// `{ "data": ... }` request envelope used by the todo endpoints
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    /// Wrapped payload
    pub data: T,
}

/// Body of `POST /todos`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTodoBody {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Owning user ids
    pub user: Vec<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn todo_reads_document_id_and_ignores_unknown_fields() {
        let todo: Todo = serde_json::from_value(json!({
            "id": 7,
            "documentId": "abc123",
            "title": "Buy milk",
            "description": "From the shop",
            "createdAt": "2025-01-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(todo.id, 7);
        assert_eq!(todo.document_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn todo_without_document_id() {
        let todo: Todo = serde_json::from_value(json!({"id": 1, "title": "t"})).unwrap();
        assert!(todo.document_id.is_none());
        assert!(todo.description.is_empty());
    }

    #[test]
    fn create_body_is_wrapped_in_data() {
        let body = DataEnvelope {
            data: CreateTodoBody {
                title: "title".into(),
                description: "description".into(),
                user: vec![3],
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"data": {"title": "title", "description": "description", "user": [3]}})
        );
    }

    #[test]
    fn user_patch_skips_missing_fields() {
        let patch = UserPatch {
            username: Some("bobby1".into()),
            email: None,
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"username": "bobby1"}));
    }

    #[test]
    fn me_response_defaults_to_no_todos() {
        let me: MeResponse =
            serde_json::from_value(json!({"id": 1, "username": "a", "email": "a@x.com"})).unwrap();
        assert!(me.todos.is_empty());
    }
}
