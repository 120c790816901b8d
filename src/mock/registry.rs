//! Call Override Registry
//!
//! An immutable, ordered set of [`OverrideEntry`] values keyed by
//! (operation, resource type, sub-resource). The registry is frozen at
//! construction and shared by reference, so concurrent lookups need no lock.

use std::collections::HashSet;
use std::sync::Arc;

use resource_api::{Resource, ResourceType, StatusError, MAIN_RESOURCE};

use super::operation::Operation;
use crate::logging;

/// Lookup key of an override
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverrideKey {
    pub operation: Operation,
    pub resource_type: ResourceType,
    pub sub_resource: String,
}

/// One configured interception
#[derive(Debug, Clone)]
pub struct OverrideEntry {
    /// Call being intercepted
    pub operation: Operation,
    /// Concrete kind of the object passed to the call
    pub resource_type: ResourceType,
    /// Empty for the primary resource
    pub sub_resource: String,
    /// Copied into the caller's output on a matched read
    pub result: Option<Arc<dyn Resource>>,
    /// Returned verbatim on any match; wins over `result`
    pub error: Option<StatusError>,
}

impl OverrideEntry {
    /// Override for calls against objects of kind `T` on the primary resource
    pub fn new<T: Resource>(operation: Operation) -> Self {
        Self::for_type(operation, ResourceType::of::<T>())
    }

    /// Override for calls against objects of the given kind
    pub fn for_type(operation: Operation, resource_type: ResourceType) -> Self {
        Self {
            operation,
            resource_type,
            sub_resource: MAIN_RESOURCE.to_string(),
            result: None,
            error: None,
        }
    }

    /// Fail `operation` on kind `T` with `error`
    pub fn error<T: Resource>(operation: Operation, error: StatusError) -> Self {
        Self::new::<T>(operation).with_error(error)
    }

    /// Answer `operation` on kind `T` with a copy of `result`
    pub fn result<T: Resource>(operation: Operation, result: T) -> Self {
        Self::new::<T>(operation).with_result(result)
    }

    pub fn with_error(mut self, error: StatusError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_result<R: Resource>(mut self, result: R) -> Self {
        self.result = Some(Arc::new(result));
        self
    }

    pub fn with_boxed_result(mut self, result: Box<dyn Resource>) -> Self {
        self.result = Some(Arc::from(result));
        self
    }

    /// Target the named sub-resource instead of the primary resource
    pub fn on_sub_resource(mut self, name: impl Into<String>) -> Self {
        self.sub_resource = name.into();
        self
    }

    pub fn key(&self) -> OverrideKey {
        OverrideKey {
            operation: self.operation,
            resource_type: self.resource_type,
            sub_resource: self.sub_resource.clone(),
        }
    }

    /// Returns true if the entry can never intercept a call
    pub fn is_inert(&self) -> bool {
        self.result.is_none() && self.error.is_none()
    }

    fn matches(&self, operation: Operation, resource_type: ResourceType, sub_resource: &str) -> bool {
        self.operation == operation
            && self.resource_type == resource_type
            && self.sub_resource == sub_resource
    }
}

/// Frozen collection of overrides
#[derive(Debug, Clone)]
pub struct OverrideRegistry {
    entries: Arc<[OverrideEntry]>,
}

impl OverrideRegistry {
    /// Freeze `entries` in registration order.
    ///
    /// Duplicate keys and inert entries are logged as warnings; they are not
    /// errors.
    pub fn new(entries: impl IntoIterator<Item = OverrideEntry>) -> Self {
        let entries: Arc<[OverrideEntry]> = entries.into_iter().collect();

        let mut seen = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.is_inert() {
                logging::log_empty_override(index, entry);
            }
            if !seen.insert(entry.key()) {
                logging::log_duplicate_override(index, entry);
            }
        }
        logging::log_registry_built(entries.len());

        Self { entries }
    }

    /// Registry that never intercepts
    pub fn empty() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
        }
    }

    /// First entry registered under the key, if any
    pub fn lookup(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        sub_resource: &str,
    ) -> Option<&OverrideEntry> {
        self.entries
            .iter()
            .find(|entry| entry.matches(operation, resource_type, sub_resource))
    }

    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<OverrideEntry>> for OverrideRegistry {
    fn from(entries: Vec<OverrideEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<OverrideEntry> for OverrideRegistry {
    fn from_iter<I: IntoIterator<Item = OverrideEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}
