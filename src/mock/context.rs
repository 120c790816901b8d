//! Context-Carried Mock Data
//!
//! The legacy single-value mechanism: a resource/error pair stored on a
//! [`Context`] under an integer key and fetched by the code under test.
//! Fetching a key that was never attached is a broken test setup and panics.

use std::sync::Arc;

use resource_api::{Client, Context, ContextKey, Kind, Resource, StatusError};

use super::client::MockClient;
use super::registry::{OverrideEntry, OverrideRegistry};

/// Resource and error attached to a context under `context_key`
#[derive(Debug, Clone)]
pub struct MockData {
    pub context_key: ContextKey,
    pub resource: Option<Arc<dyn Resource>>,
    pub error: Option<StatusError>,
}

impl MockData {
    pub fn new(context_key: impl Into<ContextKey>) -> Self {
        Self {
            context_key: context_key.into(),
            resource: None,
            error: None,
        }
    }

    pub fn with_resource<R: Resource>(mut self, resource: R) -> Self {
        self.resource = Some(Arc::new(resource));
        self
    }

    pub fn with_error(mut self, error: StatusError) -> Self {
        self.error = Some(error);
        self
    }
}

/// New context carrying every entry of `mock_data` under its key.
///
/// `ctx` itself is left untouched. A later entry with the same key shadows an
/// earlier one.
pub fn mocked_context(ctx: &Context, mock_data: impl IntoIterator<Item = MockData>) -> Context {
    mock_data.into_iter().fold(ctx.clone(), |ctx, data| {
        let key = data.context_key;
        ctx.with_value(key, data)
    })
}

/// Mocked context plus a [`MockClient`] wrapping `delegate`.
pub fn mocked_context_with_client<C: Client + 'static>(
    ctx: &Context,
    delegate: C,
    mock_data: impl IntoIterator<Item = MockData>,
    overrides: impl IntoIterator<Item = OverrideEntry>,
) -> (Context, MockClient) {
    let ctx = mocked_context(ctx, mock_data);
    let client = MockClient::new(delegate, OverrideRegistry::new(overrides));
    (ctx, client)
}

/// Resource and error stored under `key`, the resource cast to `T`.
///
/// # Panics
///
/// Panics if nothing was attached under `key`, or if the stored resource is
/// not a `T`.
pub fn mocked_resource_and_error<T: Kind>(
    ctx: &Context,
    key: impl Into<ContextKey>,
) -> (Option<T>, Option<StatusError>) {
    let key = key.into();
    let Some(data) = ctx.value_as::<MockData>(key) else {
        panic!("Mocked data not found in the context for key {}", key);
    };

    let resource = data.resource.as_ref().map(|resource| {
        match resource.as_any().downcast_ref::<T>() {
            Some(resource) => resource.clone(),
            None => panic!(
                "Mocked data for key {} holds {}, not {}",
                key,
                resource.resource_type(),
                std::any::type_name::<T>()
            ),
        }
    });
    (resource, data.error.clone())
}
