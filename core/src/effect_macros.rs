//! Declarative macros for ergonomic effect construction
//!
//! Most workflow effects are "call the backend, then turn the result into an
//! action". These macros keep that boilerplate out of the reducers.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use todo_workflow_core::async_effect;
///
/// async_effect! {
///     let todos = api.list_todos(&jwt).await;
///     Some(TodoAction::TodosLoaded { version, todos })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Future` that turns a `Result` into one of two actions
///
/// # Example
///
/// ```rust,ignore
/// use todo_workflow_core::try_effect;
///
/// try_effect! {
///     run: api.delete_todo(&jwt, &document_id),
///     on_success: |()| TodoAction::TodoDeleted,
///     on_error: |error| TodoAction::DeleteFailed { error }
/// }
/// ```
#[macro_export]
macro_rules! try_effect {
    (
        run: $fut:expr,
        on_success: |$ok:pat_param| $success_body:expr,
        on_error: |$err:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $fut.await {
                ::std::result::Result::Ok($ok) => ::std::option::Option::Some($success_body),
                ::std::result::Result::Err($err) => ::std::option::Option::Some($error_body),
            }
        }))
    };
}
