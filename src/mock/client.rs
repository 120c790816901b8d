//! Dispatching Mock Client
//!
//! [`MockClient`] implements the full [`Client`] capability set. Every call is
//! first looked up in the [`OverrideRegistry`]; a matching override answers
//! the call, anything else is forwarded unchanged to the delegate.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use resource_api::{
    Client, Context, CreateOption, DeleteAllOfOption, DeleteOption, GetOption, ListOption,
    Object, ObjectKey, ObjectList, Patch, PatchOption, Resource, ResourceType, Result,
    StatusError, SubResourceClient, SubResourceWriter, UpdateOption, MAIN_RESOURCE,
};

use super::operation::Operation;
use super::registry::OverrideRegistry;
use super::sub_resource::SubResourceDispatcher;
use crate::logging;

/// How a call was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDisposition {
    /// Answered by an override; the delegate never saw the call
    Mocked,
    /// Forwarded to the delegate
    Delegated,
}

/// One call observed by a [`MockClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub operation: Operation,
    pub resource_type: ResourceType,
    pub sub_resource: String,
    pub disposition: CallDisposition,
}

impl CallRecord {
    pub fn is_mocked(&self) -> bool {
        self.disposition == CallDisposition::Mocked
    }
}

/// Routing decision for a single call
pub(crate) enum Intercept<'a> {
    /// Return this error without calling the delegate
    Fail(StatusError),
    /// Copy this value into the caller's output
    Inject(&'a dyn Resource),
    /// Forward to the delegate
    Pass,
}

type CallLog = Arc<Mutex<Vec<CallRecord>>>;

/// Client that answers configured calls itself and forwards the rest.
///
/// Routing depends only on the immutable registry. Call recording is off
/// unless enabled with [`MockClient::with_call_log`]; an enabled log keeps
/// every call until [`MockClient::clear_calls`].
///
/// Clones share the delegate, the registry and the call log.
#[derive(Clone)]
pub struct MockClient {
    delegate: Arc<dyn Client>,
    registry: OverrideRegistry,
    calls: Option<CallLog>,
}

impl MockClient {
    /// Wrap `delegate` with the overrides in `registry`
    pub fn new<C: Client + 'static>(delegate: C, registry: OverrideRegistry) -> Self {
        Self::with_shared_delegate(Arc::new(delegate), registry)
    }

    /// Wrap a delegate already shared elsewhere
    pub fn with_shared_delegate(delegate: Arc<dyn Client>, registry: OverrideRegistry) -> Self {
        Self {
            delegate,
            registry,
            calls: None,
        }
    }

    /// Record every call from now on, shared with later clones
    pub fn with_call_log(mut self) -> Self {
        self.calls.get_or_insert_with(CallLog::default);
        self
    }

    pub fn records_calls(&self) -> bool {
        self.calls.is_some()
    }

    pub fn registry(&self) -> &OverrideRegistry {
        &self.registry
    }

    pub fn delegate(&self) -> &dyn Client {
        &*self.delegate
    }

    /// Every call recorded so far, oldest first; empty when recording is off
    pub fn calls(&self) -> Vec<CallRecord> {
        match &self.calls {
            Some(log) => log.lock().unwrap_or_else(PoisonError::into_inner).clone(),
            None => Vec::new(),
        }
    }

    /// Calls of one operation, oldest first
    pub fn calls_for(&self, operation: Operation) -> Vec<CallRecord> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    pub fn clear_calls(&self) {
        if let Some(log) = &self.calls {
            log.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    /// Decide how to answer a call and record the decision.
    ///
    /// An override's error always wins. A result only answers reads; a write
    /// matched by a result-only override is forwarded.
    pub(crate) fn intercept(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        sub_resource: &str,
    ) -> Intercept<'_> {
        let decision = match self.registry.lookup(operation, resource_type, sub_resource) {
            Some(entry) => match (&entry.error, &entry.result) {
                (Some(err), _) => Intercept::Fail(err.clone()),
                (None, Some(result)) if operation.is_read() => Intercept::Inject(&**result),
                _ => Intercept::Pass,
            },
            None => Intercept::Pass,
        };

        let disposition = match decision {
            Intercept::Pass => {
                logging::log_delegated(operation, resource_type, sub_resource);
                CallDisposition::Delegated
            }
            _ => {
                logging::log_override_hit(operation, resource_type, sub_resource);
                CallDisposition::Mocked
            }
        };
        if let Some(log) = &self.calls {
            log.lock().unwrap_or_else(PoisonError::into_inner).push(CallRecord {
                operation,
                resource_type,
                sub_resource: sub_resource.to_string(),
                disposition,
            });
        }
        decision
    }

    /// Returns the override error for a write, if one is configured
    pub(crate) fn fail_if_mocked(
        &self,
        operation: Operation,
        resource_type: ResourceType,
        sub_resource: &str,
    ) -> Result<()> {
        match self.intercept(operation, resource_type, sub_resource) {
            Intercept::Fail(err) => Err(err),
            Intercept::Inject(_) | Intercept::Pass => Ok(()),
        }
    }
}

/// Panics when an override result cannot be copied into the caller's output.
///
/// This is a broken fixture, never a runtime condition.
pub(crate) fn result_type_mismatch(result: &dyn Resource, target: ResourceType) -> ! {
    panic!(
        "Mocked result of type {} cannot be assigned to {}",
        result.resource_type(),
        target
    )
}

impl fmt::Debug for MockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClient")
            .field("registry", &self.registry)
            .field("calls", &self.calls.as_ref().map(|_| self.calls().len()))
            .finish_non_exhaustive()
    }
}

impl Client for MockClient {
    fn get(
        &self,
        ctx: &Context,
        key: &ObjectKey,
        obj: &mut dyn Object,
        opts: &[GetOption],
    ) -> Result<()> {
        match self.intercept(Operation::Get, obj.resource_type(), MAIN_RESOURCE) {
            Intercept::Fail(err) => Err(err),
            Intercept::Inject(result) => {
                if !obj.assign_from(result.as_any()) {
                    result_type_mismatch(result, obj.resource_type());
                }
                Ok(())
            }
            Intercept::Pass => self.delegate.get(ctx, key, obj, opts),
        }
    }

    fn list(&self, ctx: &Context, list: &mut dyn ObjectList, opts: &[ListOption]) -> Result<()> {
        match self.intercept(Operation::List, list.resource_type(), MAIN_RESOURCE) {
            Intercept::Fail(err) => Err(err),
            Intercept::Inject(result) => {
                if !list.assign_from(result.as_any()) {
                    result_type_mismatch(result, list.resource_type());
                }
                Ok(())
            }
            Intercept::Pass => self.delegate.list(ctx, list, opts),
        }
    }

    fn create(&self, ctx: &Context, obj: &mut dyn Object, opts: &[CreateOption]) -> Result<()> {
        self.fail_if_mocked(Operation::Create, obj.resource_type(), MAIN_RESOURCE)?;
        self.delegate.create(ctx, obj, opts)
    }

    fn delete(&self, ctx: &Context, obj: &dyn Object, opts: &[DeleteOption]) -> Result<()> {
        self.fail_if_mocked(Operation::Delete, obj.resource_type(), MAIN_RESOURCE)?;
        self.delegate.delete(ctx, obj, opts)
    }

    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()> {
        self.fail_if_mocked(Operation::Update, obj.resource_type(), MAIN_RESOURCE)?;
        self.delegate.update(ctx, obj, opts)
    }

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()> {
        self.fail_if_mocked(Operation::Patch, obj.resource_type(), MAIN_RESOURCE)?;
        self.delegate.patch(ctx, obj, patch, opts)
    }

    fn delete_all_of(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        opts: &[DeleteAllOfOption],
    ) -> Result<()> {
        self.fail_if_mocked(Operation::DeleteAllOf, obj.resource_type(), MAIN_RESOURCE)?;
        self.delegate.delete_all_of(ctx, obj, opts)
    }

    fn status(&self) -> Box<dyn SubResourceWriter + '_> {
        Box::new(SubResourceDispatcher::status(self))
    }

    fn sub_resource(&self, name: &str) -> Box<dyn SubResourceClient + '_> {
        Box::new(SubResourceDispatcher::named(self, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::OverrideEntry;
    use resource_api::{ConfigMap, ConfigMapList, Secret};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Delegate that counts calls and answers every one with `NotFound`
    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
    }

    impl CountingClient {
        fn hit(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StatusError::not_found(
                &resource_api::GroupResource::new("", "things"),
                "delegate",
            ))
        }
    }

    impl Client for CountingClient {
        fn get(&self, _: &Context, _: &ObjectKey, _: &mut dyn Object, _: &[GetOption]) -> Result<()> {
            self.hit()
        }

        fn list(&self, _: &Context, _: &mut dyn ObjectList, _: &[ListOption]) -> Result<()> {
            self.hit()
        }

        fn create(&self, _: &Context, _: &mut dyn Object, _: &[CreateOption]) -> Result<()> {
            self.hit()
        }

        fn delete(&self, _: &Context, _: &dyn Object, _: &[DeleteOption]) -> Result<()> {
            self.hit()
        }

        fn update(&self, _: &Context, _: &mut dyn Object, _: &[UpdateOption]) -> Result<()> {
            self.hit()
        }

        fn patch(&self, _: &Context, _: &mut dyn Object, _: &Patch, _: &[PatchOption]) -> Result<()> {
            self.hit()
        }

        fn delete_all_of(&self, _: &Context, _: &dyn Object, _: &[DeleteAllOfOption]) -> Result<()> {
            self.hit()
        }

        fn status(&self) -> Box<dyn SubResourceWriter + '_> {
            unimplemented!("status writes are not used by these tests")
        }

        fn sub_resource(&self, _: &str) -> Box<dyn SubResourceClient + '_> {
            unimplemented!("sub-resources are not used by these tests")
        }
    }

    fn client_with(entries: Vec<OverrideEntry>) -> (MockClient, Arc<CountingClient>) {
        let delegate = Arc::new(CountingClient::default());
        let client = MockClient::with_shared_delegate(delegate.clone(), OverrideRegistry::new(entries))
            .with_call_log();
        (client, delegate)
    }

    #[test]
    fn test_error_override_skips_delegate() {
        let (client, delegate) = client_with(vec![OverrideEntry::error::<ConfigMap>(
            Operation::Update,
            StatusError::bad_request("mocked update error"),
        )]);

        let mut cm = ConfigMap::new("cm", "default");
        let err = client
            .update(&Context::background(), &mut cm, &[])
            .unwrap_err();

        assert_eq!(err, StatusError::bad_request("mocked update error"));
        assert_eq!(delegate.calls.load(Ordering::SeqCst), 0);
        assert!(client.calls()[0].is_mocked());
    }

    #[test]
    fn test_unmatched_call_is_delegated_verbatim() {
        let (client, delegate) = client_with(vec![OverrideEntry::error::<Secret>(
            Operation::Update,
            StatusError::bad_request("secret only"),
        )]);

        let mut cm = ConfigMap::new("cm", "default");
        let err = client
            .update(&Context::background(), &mut cm, &[])
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.details.unwrap().name, "delegate");
        assert_eq!(delegate.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.calls()[0].disposition, CallDisposition::Delegated);
    }

    #[test]
    fn test_error_wins_over_result() {
        let entry = OverrideEntry::result::<ConfigMap>(Operation::Get, ConfigMap::new("r", "default"))
            .with_error(StatusError::bad_request("error wins"));
        let (client, _) = client_with(vec![entry]);

        let mut out = ConfigMap::default();
        let err = client
            .get(&Context::background(), &ObjectKey::new("r", "default"), &mut out, &[])
            .unwrap_err();
        assert_eq!(err.message, "error wins");
        assert!(out.metadata.name.is_empty());
    }

    #[test]
    fn test_result_only_write_override_is_delegated() {
        let (client, delegate) = client_with(vec![OverrideEntry::result::<ConfigMap>(
            Operation::Create,
            ConfigMap::new("ignored", "default"),
        )]);

        let mut cm = ConfigMap::new("cm", "default");
        assert!(client.create(&Context::background(), &mut cm, &[]).is_err());
        assert_eq!(delegate.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cm.metadata.name, "cm");
    }

    #[test]
    fn test_list_result_is_deep_copied() {
        let mocked = ConfigMapList::new(vec![ConfigMap::new("a", "default"), ConfigMap::new("b", "default")]);
        let (client, delegate) = client_with(vec![OverrideEntry::result::<ConfigMapList>(
            Operation::List,
            mocked.clone(),
        )]);

        let mut list = ConfigMapList::default();
        client.list(&Context::background(), &mut list, &[]).unwrap();
        assert_eq!(list, mocked);

        list.items[0].metadata.name = "changed".to_string();
        let mut again = ConfigMapList::default();
        client.list(&Context::background(), &mut again, &[]).unwrap();
        assert_eq!(again.items[0].metadata.name, "a");
        assert_eq!(delegate.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    #[should_panic(expected = "cannot be assigned to")]
    fn test_mismatched_result_type_panics() {
        let entry = OverrideEntry::new::<ConfigMap>(Operation::Get).with_result(Secret::new("s", "default"));
        let (client, _) = client_with(vec![entry]);

        let mut out = ConfigMap::default();
        let _ = client.get(&Context::background(), &ObjectKey::new("s", "default"), &mut out, &[]);
    }

    #[test]
    fn test_call_log_filters_and_clears() {
        let (client, _) = client_with(Vec::new());
        let ctx = Context::background();
        let cm = ConfigMap::new("cm", "default");

        let _ = client.delete(&ctx, &cm, &[]);
        let _ = client.delete_all_of(&ctx, &cm, &[]);
        assert_eq!(client.calls().len(), 2);
        assert_eq!(client.calls_for(Operation::Delete).len(), 1);
        assert_eq!(
            client.calls_for(Operation::DeleteAllOf)[0].resource_type,
            ResourceType::of::<ConfigMap>()
        );

        client.clear_calls();
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_call_log_is_off_by_default() {
        let client = MockClient::new(CountingClient::default(), OverrideRegistry::empty());
        let ctx = Context::background();
        let cm = ConfigMap::new("cm", "default");

        for _ in 0..1000 {
            let _ = client.delete(&ctx, &cm, &[]);
        }
        assert!(!client.records_calls());
        assert!(client.calls().is_empty());
        client.clear_calls();
    }

    #[test]
    fn test_call_log_survives_poisoned_lock() {
        let (client, _) = client_with(Vec::new());
        let ctx = Context::background();
        let cm = ConfigMap::new("cm", "default");
        let _ = client.delete(&ctx, &cm, &[]);

        let poisoner = client.clone();
        let _ = std::thread::spawn(move || {
            let log = poisoner.calls.as_ref().unwrap();
            let _guard = log.lock().unwrap();
            panic!("poison the call log");
        })
        .join();

        let _ = client.delete(&ctx, &cm, &[]);
        assert_eq!(client.calls().len(), 2);
        client.clear_calls();
        assert!(client.calls().is_empty());
    }
}
