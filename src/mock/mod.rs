//! Call Override Dispatch
//!
//! Wraps a real [`Client`](resource_api::Client) so tests can force chosen
//! calls to fail or return canned data while every other call reaches the
//! real store.
//!
//! # Components
//!
//! - [`OverrideRegistry`]: frozen (operation, kind, sub-resource) → outcome table
//! - [`MockClient`]: the dispatching client
//! - [`SubResourceDispatcher`]: `status()` and `sub_resource(name)` views
//! - [`MockData`]: the legacy value-on-context mechanism
//!
//! # Routing
//!
//! - error configured: returned verbatim, the delegate is never called
//! - result configured on a get or list: deep-copied into the caller's output
//! - anything else: forwarded to the delegate unchanged

mod client;
mod context;
mod operation;
mod registry;
mod sub_resource;

pub use client::{CallDisposition, CallRecord, MockClient};
pub use context::{mocked_context, mocked_context_with_client, mocked_resource_and_error, MockData};
pub use operation::{Operation, ParseOperationError};
pub use registry::{OverrideEntry, OverrideKey, OverrideRegistry};
pub use sub_resource::SubResourceDispatcher;
