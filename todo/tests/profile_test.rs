//! Integration tests for the profile flow with Store and a file session store

#![allow(clippy::unwrap_used)] // Test code

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use todo_workflow::mock::{MockTodoApi, Operation};
use todo_workflow::session::FileSessionStore;
use todo_workflow::types::{MSG_SOMETHING_WENT_WRONG, MSG_USER_UPDATED};
use todo_workflow::{
    NotificationKind, ProfileAction, ProfileInput, ProfileReducer, ProfileState, Session,
    SessionContext, TodoApi, TodoEnvironment, WorkflowError,
};
use todo_workflow_runtime::Store;
use todo_workflow_testing::test_clock;

const WAIT: Duration = Duration::from_secs(5);
const KEY: &str = "loggedInUser";

fn stored_session() -> Session {
    serde_json::from_value(json!({
        "jwt": "token-123",
        "user": {
            "id": 42,
            "username": "alice1",
            "email": "alice@example.com",
            "confirmed": true,
            "provider": "local"
        },
        "issuedBy": "login-form"
    }))
    .unwrap()
}

async fn setup(
    dir: &tempfile::TempDir,
    api: &Arc<MockTodoApi>,
) -> (
    Store<ProfileState, ProfileAction, TodoEnvironment, ProfileReducer>,
    Arc<SessionContext>,
) {
    let files = Arc::new(FileSessionStore::new(dir.path()));
    let session = Arc::new(SessionContext::login(files, KEY, stored_session()).await.unwrap());
    let env = TodoEnvironment::new(
        Arc::clone(api) as Arc<dyn TodoApi>,
        Arc::clone(&session),
        Arc::new(test_clock()),
    );
    let user = session.snapshot().await.user;
    (Store::new(ProfileState::new(user), ProfileReducer::new(), env), session)
}

fn is_result(action: &ProfileAction) -> bool {
    matches!(
        action,
        ProfileAction::ProfileUpdated(_) | ProfileAction::UpdateFailed { .. }
    )
}

#[tokio::test]
async fn test_profile_update_merges_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockTodoApi::new());
    let (store, session) = setup(&dir, &api).await;

    let _ = store.send(ProfileAction::OpenEdit).await;
    let result = store
        .send_and_wait_for(
            ProfileAction::Submit(ProfileInput {
                username: "alice_renamed".into(),
                email: "alice@example.com".into(),
            }),
            is_result,
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, ProfileAction::ProfileUpdated(_)));
    assert_eq!(api.update_user_calls(), 1);

    let state = store.state(Clone::clone).await;
    assert!(!state.modal_open);
    assert_eq!(state.user.username, "alice_renamed");
    assert_eq!(state.notifications[0].kind, NotificationKind::Success);
    assert_eq!(state.notifications[0].message, MSG_USER_UPDATED);

    // In memory
    let current = session.snapshot().await;
    assert_eq!(current.jwt, "token-123");
    assert_eq!(current.user.extra["confirmed"], json!(true));

    // On disk, read back by a fresh context
    let files = Arc::new(FileSessionStore::new(dir.path()));
    let restored = SessionContext::restore(files, KEY).await.unwrap().unwrap();
    let restored = restored.snapshot().await;
    assert_eq!(restored.user.id, 42);
    assert_eq!(restored.user.username, "alice_renamed");
    assert_eq!(restored.user.email, "alice@example.com");
    assert_eq!(restored.user.extra["provider"], json!("local"));
    assert_eq!(restored.extra["issuedBy"], json!("login-form"));
}

#[tokio::test]
async fn test_rejected_update_leaves_session_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockTodoApi::new());
    api.fail(
        Operation::UpdateUser,
        WorkflowError::UnexpectedStatus {
            status: 400,
            message: "Username already taken".into(),
        },
    );
    let (store, session) = setup(&dir, &api).await;

    let _ = store.send(ProfileAction::OpenEdit).await;
    let result = store
        .send_and_wait_for(
            ProfileAction::Submit(ProfileInput {
                username: "bobby_taken".into(),
                email: "bob@example.com".into(),
            }),
            is_result,
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, ProfileAction::UpdateFailed { .. }));

    let state = store.state(Clone::clone).await;
    assert!(state.modal_open);
    assert_eq!(state.user.username, "alice1");
    assert_eq!(state.notifications[0].message, MSG_SOMETHING_WENT_WRONG);
    assert_eq!(session.snapshot().await, stored_session());
}

#[tokio::test]
async fn test_invalid_profile_makes_no_request() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(MockTodoApi::new());
    let (store, _session) = setup(&dir, &api).await;

    let _ = store.send(ProfileAction::OpenEdit).await;
    let _ = store
        .send(ProfileAction::Submit(ProfileInput {
            username: "al".into(),
            email: "alice@example".into(),
        }))
        .await;

    let state = store.state(Clone::clone).await;
    assert!(state.modal_open);
    assert!(state.errors.contains_key("username"));
    assert!(state.errors.contains_key("email"));
    assert_eq!(api.update_user_calls(), 0);
}
