//! Resource Mock - selective call overrides for resource clients
//!
//! This crate wraps a real resource [`Client`](resource_api::Client) in a
//! [`MockClient`] that answers configured calls itself (an error, or canned
//! data for reads) and forwards every other call to the real store unchanged.
//! Tests use it to inject "not found", "conflict" or "forbidden" outcomes
//! without replacing the storage layer.

pub mod fixture;
pub mod loader;
pub mod logging;
pub mod mock;

pub use resource_api as api;

pub use fixture::{Fixture, FixtureError, Scheme};
pub use loader::get_object;
pub use mock::{
    mocked_context, mocked_context_with_client, mocked_resource_and_error, CallDisposition,
    CallRecord, MockClient, MockData, Operation, OverrideEntry, OverrideKey, OverrideRegistry,
    SubResourceDispatcher,
};
