//! Structured logging helpers.
//!
//! Every event the dispatch layer emits goes through one of these functions so
//! field names stay consistent across the registry, the client and fixtures.

use std::path::Path;

use resource_api::ResourceType;

use crate::mock::{Operation, OverrideEntry};

/// Log a call answered from an override.
pub fn log_override_hit(operation: Operation, resource_type: ResourceType, sub_resource: &str) {
    tracing::debug!(
        operation = operation.as_str(),
        resource_type = resource_type.name(),
        sub_resource,
        "Call answered by override"
    );
}

/// Log a call forwarded to the delegate.
pub fn log_delegated(operation: Operation, resource_type: ResourceType, sub_resource: &str) {
    tracing::trace!(
        operation = operation.as_str(),
        resource_type = resource_type.name(),
        sub_resource,
        "Call delegated"
    );
}

/// Log registry construction.
pub fn log_registry_built(entries: usize) {
    tracing::debug!(entries, "Override registry built");
}

/// Log an entry shadowed by an earlier one with the same key.
pub fn log_duplicate_override(index: usize, entry: &OverrideEntry) {
    tracing::warn!(
        index,
        operation = entry.operation.as_str(),
        resource_type = entry.resource_type.name(),
        sub_resource = entry.sub_resource.as_str(),
        "Duplicate override ignored; the first registration wins"
    );
}

/// Log an entry that carries neither a result nor an error.
pub fn log_empty_override(index: usize, entry: &OverrideEntry) {
    tracing::warn!(
        index,
        operation = entry.operation.as_str(),
        resource_type = entry.resource_type.name(),
        "Override has neither result nor error and never intercepts"
    );
}

/// Log a loaded fixture file.
pub fn log_fixture_loaded(path: &Path, overrides: usize, digest: &str) {
    tracing::info!(
        path = %path.display(),
        overrides,
        digest,
        "Override fixture loaded"
    );
}
