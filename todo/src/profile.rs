//! Profile update flow.
//!
//! Submitting the profile form sends `PUT /users/{id}`; on success the patch
//! is merged into the session user and the whole session is re-persisted.

use crate::environment::TodoEnvironment;
use crate::error::WorkflowError;
use crate::types::{
    Notification, ProfileInput, User, UserPatch, MSG_SOMETHING_WENT_WRONG, MSG_USER_UPDATED,
};
use crate::validation::{self, FieldErrors};
use todo_workflow_core::{effect::Effect, reducer::Reducer, smallvec, try_effect, SmallVec};

/// State of the profile page
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileState {
    /// User as last stored in the session
    pub user: User,
    /// Edit modal is open
    pub modal_open: bool,
    /// Contents of the edit form
    pub form: ProfileInput,
    /// Validation errors of the edit form
    pub errors: FieldErrors,
    /// Update request in flight
    pub submitting: bool,
    /// Toast queue, oldest first
    pub notifications: Vec<Notification>,
    /// Most recent failure
    pub last_error: Option<WorkflowError>,
}

impl ProfileState {
    /// Profile page for `user`, modal closed
    #[must_use]
    pub fn new(user: User) -> Self {
        Self {
            user,
            modal_open: false,
            form: ProfileInput::default(),
            errors: FieldErrors::new(),
            submitting: false,
            notifications: Vec::new(),
            last_error: None,
        }
    }
}

/// Actions of the profile flow
#[derive(Clone, Debug, PartialEq)]
pub enum ProfileAction {
    /// Open the edit modal prefilled with the current user
    OpenEdit,
    /// Close the edit modal and reset its form
    CloseEdit,
    /// Validate and send the update
    Submit(ProfileInput),
    /// Update accepted and merged into the session
    ProfileUpdated(User),
    /// Update or session write failed
    UpdateFailed {
        /// Failure
        error: WorkflowError,
    },
    /// Remove a toast
    DismissNotification {
        /// Position in the queue
        index: usize,
    },
}

/// Reducer for the profile flow
#[derive(Clone, Debug, Default)]
pub struct ProfileReducer;

impl ProfileReducer {
    /// Creates a new `ProfileReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for ProfileReducer {
    type State = ProfileState;
    type Action = ProfileAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ProfileAction::OpenEdit => {
                state.form = ProfileInput::from(&state.user);
                state.errors.clear();
                state.modal_open = true;
                SmallVec::new()
            },

            ProfileAction::CloseEdit => {
                state.form = ProfileInput::default();
                state.errors.clear();
                state.modal_open = false;
                SmallVec::new()
            },

            ProfileAction::Submit(input) => {
                if state.submitting {
                    return SmallVec::new();
                }
                state.form = input.clone();

                if let Err(errors) = validation::profile().validate(&input) {
                    state.errors.clone_from(&errors);
                    state.last_error = Some(WorkflowError::Validation(errors));
                    return SmallVec::new();
                }

                state.errors.clear();
                state.submitting = true;
                let request = env.update_profile(UserPatch::from(&input));
                smallvec![try_effect! {
                    run: request,
                    on_success: |session| ProfileAction::ProfileUpdated(session.user),
                    on_error: |error| ProfileAction::UpdateFailed { error }
                }]
            },

            ProfileAction::ProfileUpdated(user) => {
                tracing::info!(user_id = user.id, "Profile updated");
                state.user = user;
                state.submitting = false;
                state.last_error = None;
                state
                    .notifications
                    .push(Notification::success(MSG_USER_UPDATED, env.clock.now()));
                state.form = ProfileInput::default();
                state.modal_open = false;
                SmallVec::new()
            },

            ProfileAction::UpdateFailed { error } => {
                tracing::warn!(error = %error, "Profile update failed");
                state.submitting = false;
                state
                    .notifications
                    .push(Notification::error(MSG_SOMETHING_WENT_WRONG, env.clock.now()));
                state.last_error = Some(error);
                SmallVec::new()
            },

            ProfileAction::DismissNotification { index } => {
                if index < state.notifications.len() {
                    state.notifications.remove(index);
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::TodoApi;
    use crate::mock::MockTodoApi;
    use crate::session::SessionContext;
    use crate::types::{NotificationKind, Session};
    use std::sync::Arc;
    use todo_workflow_testing::{assertions, collect_actions, test_clock, ReducerTest};

    fn user() -> User {
        User::new(1, "alice1", "alice@example.com")
    }

    fn env_with(api: Arc<MockTodoApi>) -> (TodoEnvironment, Arc<SessionContext>) {
        let session = Arc::new(SessionContext::ephemeral(Session::new("jwt", user())));
        let env = TodoEnvironment::new(
            api as Arc<dyn TodoApi>,
            Arc::clone(&session),
            Arc::new(test_clock()),
        );
        (env, session)
    }

    fn env() -> TodoEnvironment {
        env_with(Arc::new(MockTodoApi::new())).0
    }

    #[test]
    fn test_open_edit_prefills_form() {
        ReducerTest::new(ProfileReducer::new())
            .with_env(env())
            .given_state(ProfileState::new(user()))
            .when_action(ProfileAction::OpenEdit)
            .then_state(|state| {
                assert!(state.modal_open);
                assert_eq!(state.form.username, "alice1");
                assert_eq!(state.form.email, "alice@example.com");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        ReducerTest::new(ProfileReducer::new())
            .with_env(env())
            .given_state(ProfileState::new(user()))
            .when_action(ProfileAction::OpenEdit)
            .when_action(ProfileAction::Submit(ProfileInput {
                username: "bob".into(),
                email: "not-an-email".into(),
            }))
            .then_state(|state| {
                assert!(state.modal_open);
                assert!(!state.submitting);
                assert_eq!(state.errors.len(), 2);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_failure_keeps_modal_open() {
        ReducerTest::new(ProfileReducer::new())
            .with_env(env())
            .given_state(ProfileState::new(user()))
            .when_action(ProfileAction::OpenEdit)
            .when_action(ProfileAction::UpdateFailed {
                error: WorkflowError::Transport("timeout".into()),
            })
            .then_state(|state| {
                assert!(state.modal_open);
                assert_eq!(state.notifications[0].kind, NotificationKind::Error);
                assert_eq!(state.notifications[0].message, MSG_SOMETHING_WENT_WRONG);
            })
            .run();
    }

    #[tokio::test]
    async fn test_submit_merges_into_session() {
        let api = Arc::new(MockTodoApi::new());
        let (env, session) = env_with(Arc::clone(&api));
        let reducer = ProfileReducer::new();
        let mut state = ProfileState::new(user());

        let _ = reducer.reduce(&mut state, ProfileAction::OpenEdit, &env);
        let effects = reducer.reduce(
            &mut state,
            ProfileAction::Submit(ProfileInput {
                username: "bobby1".into(),
                email: "alice@example.com".into(),
            }),
            &env,
        );
        assert!(state.submitting);

        let actions = collect_actions(effects).await;
        assert_eq!(actions.len(), 1);
        for action in actions {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(api.update_user_calls(), 1);
        assert!(!state.modal_open);
        assert_eq!(state.user.username, "bobby1");
        assert_eq!(state.notifications[0].message, MSG_USER_UPDATED);
        assert_eq!(session.snapshot().await.user.username, "bobby1");
        assert_eq!(session.snapshot().await.user.id, 1);
    }
}
