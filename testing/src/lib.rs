//! # Todo Workflow Testing
//!
//! Testing utilities and helpers for the todo workflow.
//!
//! This crate provides:
//! - A fixed clock for deterministic notification timestamps
//! - The [`ReducerTest`] Given-When-Then harness
//! - Helpers that drive effects without a running store
//!
//! ## Example
//!
//! ```ignore
//! use todo_workflow_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_env())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::OpenAddModal)
//!     .then_state(|state| assert_eq!(state.modal, Modal::Add))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todo_workflow_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_workflow_testing::mocks::FixedClock;
    /// use todo_workflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities
pub mod helpers {
    use todo_workflow_core::effect::Effect;

    /// Run effects to completion and collect the actions they produce
    ///
    /// Futures are awaited in order, delays are skipped (their action is
    /// returned immediately), and nested parallel/sequential effects are
    /// flattened. Produced actions are NOT fed back into any reducer, which
    /// lets a test drive the feedback loop by hand.
    pub async fn collect_actions<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A> {
        let mut actions = Vec::new();
        let mut pending: Vec<Effect<A>> = effects.into_iter().collect();
        pending.reverse();

        while let Some(effect) = pending.pop() {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        actions.push(action);
                    }
                },
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Parallel(nested) | Effect::Sequential(nested) => {
                    pending.extend(nested.into_iter().rev());
                },
            }
        }

        actions
    }

    /// Install a `tracing` subscriber for test output
    ///
    /// Honors `RUST_LOG`; safe to call from every test since only the
    /// first call installs the subscriber.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::{collect_actions, init_test_tracing};
pub use mocks::{test_clock, FixedClock};
