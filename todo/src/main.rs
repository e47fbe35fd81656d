//! Command-line demo of the todo workflow.
//!
//! Restores the stored session, loads the user's todos and prints them.
//! With `generate` as the first argument, a bulk run of `TODO_BULK_COUNT`
//! synthetic todos is made first.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use todo_workflow::session::FileSessionStore;
use todo_workflow::types::MSG_NO_TODOS;
use todo_workflow::{
    Config, ListView, SessionContext, TodoAction, TodoEnvironment, TodoReducer, TodoState,
};
use todo_workflow_client::BackendClient;
use todo_workflow_core::environment::SystemClock;
use todo_workflow_runtime::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for the first list result
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to wait for a bulk run and the re-fetch it triggers
const BULK_TIMEOUT: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let sessions = Arc::new(FileSessionStore::new(&config.session_dir));
    let Some(session) = SessionContext::restore(sessions, config.session_key.clone())
        .await
        .context("Failed to read stored session")?
    else {
        println!(
            "No stored session under {}; log in first.",
            config.session_dir.display()
        );
        return Ok(());
    };

    let client = match config.request_timeout {
        Some(timeout) => BackendClient::with_timeout(&config.api_url, timeout)
            .context("Failed to build HTTP client")?,
        None => BackendClient::new(&config.api_url),
    };

    let env = TodoEnvironment::new(Arc::new(client), Arc::new(session), Arc::new(SystemClock))
        .with_bulk_concurrency(config.bulk_concurrency);
    let store = Store::new(TodoState::new(), TodoReducer::new(), env);

    tracing::info!(api_url = %config.api_url, "Loading todos");

    let result = store
        .send_and_wait_for(
            TodoAction::Load,
            |a| matches!(a, TodoAction::TodosLoaded { .. } | TodoAction::LoadFailed { .. }),
            LOAD_TIMEOUT,
        )
        .await
        .context("List request did not complete")?;

    if let TodoAction::LoadFailed { error, .. } = result {
        tracing::warn!(error = %error, "Could not load todos");
    }

    if std::env::args().nth(1).as_deref() == Some("generate") {
        println!("Generating {} todos...", config.bulk_count);
        store
            .send_and_wait_for(
                TodoAction::GenerateTodos {
                    count: config.bulk_count,
                },
                |a| matches!(a, TodoAction::TodosLoaded { .. } | TodoAction::LoadFailed { .. }),
                BULK_TIMEOUT,
            )
            .await
            .context("Bulk run did not complete")?;

        for notification in store.state(|s| s.notifications.clone()).await {
            println!("{}", notification.message);
        }
    }

    match store.state(TodoState::view).await.list {
        ListView::Items(todos) => {
            for todo in todos {
                println!("{} - {}", todo.id, todo.title);
            }
        },
        ListView::Empty | ListView::Loading => println!("{MSG_NO_TODOS}"),
    }

    store
        .shutdown(Duration::from_secs(5))
        .await
        .context("Store did not shut down cleanly")?;

    Ok(())
}
