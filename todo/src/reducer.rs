//! Reducer logic for the todo workflow controller.
//!
//! The list is never edited locally. Every successful mutation bumps the
//! refresh version and emits [`TodoAction::ListInvalidated`], which both
//! triggers the re-fetch and tells subscribers the list is stale. Fetch
//! results for an older version are discarded.

use crate::environment::TodoEnvironment;
use crate::error::WorkflowError;
use crate::types::{
    ListState, Modal, Notification, Todo, TodoAction, TodoInput, TodoState,
    MSG_SOMETHING_WENT_WRONG, MSG_TODO_DELETED, MSG_TODO_UPDATED,
};
use crate::validation;
use todo_workflow_core::{
    async_effect, effect::Effect, reducer::Reducer, smallvec, try_effect, SmallVec,
};

/// Reducer for the todo workflow controller
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effect fetching the list for `version`
    fn fetch(env: &TodoEnvironment, version: u64) -> Effect<TodoAction> {
        let request = env.list_todos();
        try_effect! {
            run: request,
            on_success: |todos| TodoAction::TodosLoaded { version, todos },
            on_error: |error| TodoAction::LoadFailed { version, error }
        }
    }

    /// Bump the refresh version and emit the invalidation signal
    fn invalidate(state: &mut TodoState) -> Effect<TodoAction> {
        state.refresh_version += 1;
        tracing::debug!(version = state.refresh_version, "List invalidated");
        Effect::send(TodoAction::ListInvalidated {
            version: state.refresh_version,
        })
    }

    /// Common failure path of every mutation: modal and form stay as they are
    fn fail(state: &mut TodoState, env: &TodoEnvironment, operation: &str, error: WorkflowError) {
        tracing::warn!(operation, error = %error, "Todo mutation failed");
        state.submitting = false;
        state.in_flight_document = None;
        state
            .notifications
            .push(Notification::error(MSG_SOMETHING_WENT_WRONG, env.clock.now()));
        state.last_error = Some(error);
    }

    fn reset_add(state: &mut TodoState) {
        state.add_form = TodoInput::default();
        state.add_errors.clear();
        if state.modal == Modal::Add {
            state.modal = Modal::None;
        }
    }

    fn reset_edit(state: &mut TodoState) {
        state.edit_form = TodoInput::default();
        state.edit_errors.clear();
        state.edit_target = None;
        if state.modal == Modal::Edit {
            state.modal = Modal::None;
        }
    }

    /// Whether `target` is the todo the finished request was sent for
    fn is_in_flight(state: &TodoState, target: Option<&Todo>) -> bool {
        target.and_then(|t| t.document_id.as_deref()) == state.in_flight_document.as_deref()
    }

    fn reset_delete(state: &mut TodoState) {
        state.delete_target = None;
        if state.modal == Modal::ConfirmDelete {
            state.modal = Modal::None;
        }
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== List ==========
            TodoAction::Load => smallvec![Self::fetch(env, state.refresh_version)],

            TodoAction::ListInvalidated { version } => {
                if version < state.refresh_version {
                    // A newer invalidation is already on its way
                    return SmallVec::new();
                }
                smallvec![Self::fetch(env, version)]
            },

            TodoAction::TodosLoaded { version, todos } => {
                if version < state.refresh_version {
                    tracing::debug!(version, current = state.refresh_version, "Discarding stale list");
                    return SmallVec::new();
                }
                tracing::debug!(version, count = todos.len(), "List loaded");
                state.list = ListState::Loaded(todos);
                SmallVec::new()
            },

            TodoAction::LoadFailed { version, error } => {
                if version < state.refresh_version {
                    return SmallVec::new();
                }
                tracing::warn!(version, error = %error, "Failed to load todos");
                state.list = ListState::Loaded(Vec::new());
                state.last_error = Some(error);
                SmallVec::new()
            },

            // ========== Add ==========
            TodoAction::OpenAddModal => {
                state.modal = Modal::Add;
                SmallVec::new()
            },

            TodoAction::CloseAddModal => {
                Self::reset_add(state);
                SmallVec::new()
            },

            TodoAction::SubmitAdd(input) => {
                if state.submitting {
                    tracing::debug!("Ignoring add submit while a request is in flight");
                    return SmallVec::new();
                }
                state.add_form = input.clone();

                if let Err(errors) = validation::add_todo().validate(&input) {
                    state.add_errors.clone_from(&errors);
                    state.last_error = Some(WorkflowError::Validation(errors));
                    return SmallVec::new();
                }

                state.add_errors.clear();
                state.submitting = true;
                let request = env.create_todo(input);
                smallvec![try_effect! {
                    run: request,
                    on_success: |()| TodoAction::TodoCreated,
                    on_error: |error| TodoAction::CreateFailed { error }
                }]
            },

            TodoAction::TodoCreated => {
                state.submitting = false;
                state.last_error = None;
                Self::reset_add(state);
                smallvec![Self::invalidate(state)]
            },

            TodoAction::CreateFailed { error } => {
                Self::fail(state, env, "create", error);
                SmallVec::new()
            },

            // ========== Edit ==========
            TodoAction::OpenEditModal(todo) => {
                state.edit_form = TodoInput::from(&todo);
                state.edit_errors.clear();
                state.edit_target = Some(todo);
                state.modal = Modal::Edit;
                SmallVec::new()
            },

            TodoAction::CloseEditModal => {
                Self::reset_edit(state);
                SmallVec::new()
            },

            TodoAction::SubmitEdit(input) => {
                if state.submitting {
                    tracing::debug!("Ignoring edit submit while a request is in flight");
                    return SmallVec::new();
                }
                let Some(target) = state.edit_target.clone() else {
                    tracing::debug!("Edit submitted without a target");
                    return SmallVec::new();
                };
                state.edit_form = input.clone();

                if let Err(errors) = validation::edit_todo().validate(&input) {
                    state.edit_errors.clone_from(&errors);
                    state.last_error = Some(WorkflowError::Validation(errors));
                    return SmallVec::new();
                }
                state.edit_errors.clear();

                let Some(document_id) = target.document_id else {
                    Self::fail(state, env, "update", WorkflowError::MissingDocumentId(target.id));
                    return SmallVec::new();
                };

                state.submitting = true;
                state.in_flight_document = Some(document_id.clone());
                let request = env.update_todo(document_id, input);
                smallvec![try_effect! {
                    run: request,
                    on_success: |()| TodoAction::TodoUpdated,
                    on_error: |error| TodoAction::UpdateFailed { error }
                }]
            },

            TodoAction::TodoUpdated => {
                state.submitting = false;
                state.last_error = None;
                state
                    .notifications
                    .push(Notification::success(MSG_TODO_UPDATED, env.clock.now()));
                // The user may have moved on to another todo meanwhile
                if Self::is_in_flight(state, state.edit_target.as_ref()) {
                    Self::reset_edit(state);
                }
                state.in_flight_document = None;
                smallvec![Self::invalidate(state)]
            },

            TodoAction::UpdateFailed { error } => {
                Self::fail(state, env, "update", error);
                SmallVec::new()
            },

            // ========== Delete ==========
            TodoAction::RequestDelete(todo) => {
                state.delete_target = Some(todo);
                state.modal = Modal::ConfirmDelete;
                SmallVec::new()
            },

            TodoAction::CancelDelete => {
                Self::reset_delete(state);
                SmallVec::new()
            },

            TodoAction::ConfirmDelete => {
                if state.submitting {
                    tracing::debug!("Ignoring delete confirmation while a request is in flight");
                    return SmallVec::new();
                }
                let Some(target) = state.delete_target.clone() else {
                    tracing::debug!("Delete confirmed without a pending request");
                    return SmallVec::new();
                };
                let Some(document_id) = target.document_id else {
                    Self::fail(state, env, "delete", WorkflowError::MissingDocumentId(target.id));
                    return SmallVec::new();
                };

                state.submitting = true;
                state.in_flight_document = Some(document_id.clone());
                let request = env.delete_todo(document_id);
                smallvec![try_effect! {
                    run: request,
                    on_success: |()| TodoAction::TodoDeleted,
                    on_error: |error| TodoAction::DeleteFailed { error }
                }]
            },

            TodoAction::TodoDeleted => {
                state.submitting = false;
                state.last_error = None;
                state
                    .notifications
                    .push(Notification::success(MSG_TODO_DELETED, env.clock.now()));
                if Self::is_in_flight(state, state.delete_target.as_ref()) {
                    Self::reset_delete(state);
                }
                state.in_flight_document = None;
                smallvec![Self::invalidate(state)]
            },

            TodoAction::DeleteFailed { error } => {
                Self::fail(state, env, "delete", error);
                SmallVec::new()
            },

            // ========== Bulk ==========
            TodoAction::GenerateTodos { count } => {
                if state.generating {
                    tracing::debug!("Ignoring bulk generation while a run is in progress");
                    return SmallVec::new();
                }
                state.generating = true;
                let run = env.generate_todos(count);
                smallvec![async_effect! {
                    let outcome = run.await;
                    Some(TodoAction::TodosGenerated {
                        attempted: outcome.attempted,
                        failed: outcome.failed,
                    })
                }]
            },

            TodoAction::TodosGenerated { attempted, failed } => {
                state.generating = false;
                if failed > 0 {
                    state.notifications.push(Notification::error(
                        format!("{failed} of {attempted} generated todos could not be created"),
                        env.clock.now(),
                    ));
                }
                smallvec![Self::invalidate(state)]
            },

            // ========== Notifications ==========
            TodoAction::DismissNotification { index } => {
                if index < state.notifications.len() {
                    state.notifications.remove(index);
                }
                SmallVec::new()
            },
        }
    }
}
