//! In-Memory Resource Store
//!
//! A [`MemoryStore`] implements the full [`resource_api::Client`] capability
//! set against process memory. It is the backing store used by tests that need
//! real create/read/update/delete behavior without an external server.
//!
//! # Semantics
//!
//! - `create` assigns uid, resourceVersion, generation and creation time
//! - `update` rejects stale resourceVersions with `Conflict`
//! - writes to the primary resource never touch `status`; the status
//!   sub-resource writes nothing else
//! - `DryRun` options validate without persisting
//! - an exceeded context deadline fails the call with `Timeout`

mod store;
mod views;

pub use store::MemoryStore;
