//! Bulk generation of synthetic todos.
//!
//! A run makes exactly `count` create attempts. Requests go through a
//! semaphore bulkhead of `concurrency` permits (1 = strictly sequential);
//! failures are logged and counted, never propagated.

use crate::environment::TodoApi;
use crate::types::{Session, TodoInput};
use crate::validation::{DESCRIPTION_MIN_LEN, TITLE_MIN_LEN};
use futures::future::join_all;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::Semaphore;

const WORDS: &[&str] = &[
    "apple", "river", "garden", "window", "planet", "silver", "harbor", "meadow", "candle",
    "forest", "market", "winter", "bridge", "pencil", "orange", "rocket", "shadow", "valley",
    "copper", "ladder", "island", "thunder", "basket", "mirror", "anchor", "canvas", "lantern",
    "puzzle", "summit", "velvet", "quiet", "brave", "rapid", "gentle", "bright", "hollow",
    "ancient", "golden", "narrow", "steady", "clean", "fix", "write", "paint", "sort", "plan",
    "review", "call", "build", "water",
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
];

/// Number of words in a generated title
const TITLE_WORDS: usize = 5;

/// Number of sentences in a generated description
const DESCRIPTION_SENTENCES: usize = 2;

/// Result of a bulk run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Create attempts made
    pub attempted: usize,
    /// Attempts that failed
    pub failed: usize,
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or("todo")
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(6..=12);
    let mut sentence = (0..len).map(|_| pick(rng, LOREM)).collect::<Vec<_>>().join(" ");
    if let Some(first) = sentence.get(..1) {
        sentence.replace_range(..1, &first.to_uppercase());
    }
    sentence.push('.');
    sentence
}

/// One synthetic todo: a five-word title and a two-sentence description
///
/// Both fields always satisfy the add-todo schema.
pub fn random_todo<R: Rng + ?Sized>(rng: &mut R) -> TodoInput {
    let mut title = (0..TITLE_WORDS)
        .map(|_| pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ");
    while title.chars().count() < TITLE_MIN_LEN {
        title.push(' ');
        title.push_str(pick(rng, WORDS));
    }

    let mut description = (0..DESCRIPTION_SENTENCES)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ");
    while description.chars().count() < DESCRIPTION_MIN_LEN {
        description.push(' ');
        description.push_str(&sentence(rng));
    }

    TodoInput { title, description }
}

/// `count` synthetic todos
#[must_use]
pub fn synthetic_todos(count: usize) -> Vec<TodoInput> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| random_todo(&mut rng)).collect()
}

/// Create every input for the session user, at most `concurrency` at a time
pub async fn create_all(
    api: Arc<dyn TodoApi>,
    session: Session,
    inputs: Vec<TodoInput>,
    concurrency: usize,
) -> BulkOutcome {
    let attempted = inputs.len();
    // More permits than attempts buys nothing; the semaphore panics above MAX_PERMITS
    let concurrency = concurrency
        .min(attempted)
        .clamp(1, Semaphore::MAX_PERMITS);
    let permits = Arc::new(Semaphore::new(concurrency));

    tracing::info!(attempted, concurrency, "Starting bulk run");

    let results = join_all(inputs.into_iter().enumerate().map(|(index, input)| {
        let api = Arc::clone(&api);
        let permits = Arc::clone(&permits);
        let session = &session;
        async move {
            // The semaphore is never closed, so acquire only fails if it were
            let Ok(_permit) = permits.acquire().await else {
                return false;
            };
            match api.create_todo(&session.jwt, session.user.id, &input).await {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(index, error = %error, "Bulk create failed");
                    false
                },
            }
        }
    }))
    .await;

    let failed = results.iter().filter(|ok| !**ok).count();
    tracing::info!(attempted, failed, "Bulk run finished");

    BulkOutcome { attempted, failed }
}
