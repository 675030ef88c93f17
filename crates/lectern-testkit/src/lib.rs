//! Lectern Testing Infrastructure
//!
//! Shared fixtures for unit and integration tests of the Lectern crates:
//! invokers with explicit permission sets, a manually advanced clock,
//! executors that record their calls, ready-made command definitions and
//! proptest strategies.

//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! lectern-testkit = { path = "../lectern-testkit" }
//! ```
//!
//! ```rust
//! use lectern_testkit::{fixtures, RecordingExecutor, TestInvoker};
//!
//! let recorder = RecordingExecutor::new();
//! let (framework, _clock) = fixtures::framework();
//! framework.register(fixtures::tp_command(&recorder)).unwrap();
//!
//! framework.execute("tp 5", &TestInvoker::player("Alex")).unwrap();
//! assert_eq!(recorder.count(), 1);
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod executor;
pub mod fixtures;
pub mod invoker;
pub mod strategies;
pub mod time;

pub use executor::{Invocation, RecordingExecutor};
pub use invoker::TestInvoker;
pub use time::ManualClock;
