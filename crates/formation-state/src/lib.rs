//! formation-state — embedded state store for apps and releases.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for the apps whose stack parameters carry formation state, and
//! for their release snapshots. Also provides [`LocalStack`], a stack engine
//! that applies parameter patches to the stored apps.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Release keys are `{app}:{release_id}`; app names may not contain `:`.
//! A `stacks` index maps each stack name to the one app that owns it, and is
//! kept in step with `apps` inside the same write transaction.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and implements the `AppStore` and `ReleaseStore` collaborator traits.

pub mod error;
pub mod stack;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use stack::LocalStack;
pub use store::{StackPatch, StateStore};
