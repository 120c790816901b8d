//! Thread-safe object storage.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use resource_api::{
    apply_merge_patch, Client, Context, CreateOption, DeleteAllOfOption, DeleteOption, GetOption,
    GroupResource, ListOption, ListOptions, Object, ObjectKey, ObjectList, Patch, PatchOption,
    Resource, ResourceType, Result, StatusError, SubResourceClient, SubResourceWriter,
    UpdateOption,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::views::{StatusView, SubResourceView};

type Bucket = BTreeMap<ObjectKey, Box<dyn Object>>;

/// Shared in-memory store. Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Objects by kind, then by namespace/name.
    objects: HashMap<ResourceType, Bucket>,
    /// Last issued resourceVersion.
    revision: u64,
}

impl StoreInner {
    fn next_revision(&mut self) -> String {
        self.revision += 1;
        self.revision.to_string()
    }

    fn stored(
        &self,
        resource_type: ResourceType,
        key: &ObjectKey,
    ) -> Option<&(dyn Object + 'static)> {
        self.objects
            .get(&resource_type)
            .and_then(|bucket| bucket.get(key))
            .map(|obj| &**obj)
    }
}

/// Part of an object a write is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facet {
    /// Everything except `status`
    Main,
    /// Only `status`
    Status,
}

/// How a write derives the new object.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Change<'a> {
    Replace,
    Patch(&'a Patch),
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| StatusError::internal("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|_| StatusError::internal("memory store lock poisoned"))
    }

    /// Number of stored objects of the given kind.
    pub fn count(&self, resource_type: ResourceType) -> usize {
        self.read()
            .map(|inner| inner.objects.get(&resource_type).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Check if an object of the given kind exists at `key`.
    pub fn contains(&self, resource_type: ResourceType, key: &ObjectKey) -> bool {
        self.read()
            .map(|inner| inner.stored(resource_type, key).is_some())
            .unwrap_or(false)
    }

    /// Last resourceVersion issued by this store.
    pub fn revision(&self) -> u64 {
        self.read().map(|inner| inner.revision).unwrap_or(0)
    }

    /// Remove every object. The revision counter keeps counting.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.write() {
            inner.objects.clear();
        }
    }

    /// Copies the stored object matching `obj`'s kind and key into `target`.
    pub(crate) fn read_into(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        target: &mut dyn Resource,
    ) -> Result<()> {
        check_deadline(ctx, "get")?;
        let key = obj.key();
        let inner = self.read()?;
        let stored = inner
            .stored(obj.resource_type(), &key)
            .ok_or_else(|| StatusError::not_found(&group_resource(obj), &key.name))?;
        if !target.assign_from(stored.as_any()) {
            return Err(StatusError::bad_request(format!(
                "{} {} cannot be read into {}",
                stored.kind(),
                key,
                target.kind()
            )));
        }
        Ok(())
    }

    /// Applies an update or patch to one facet of a stored object and writes
    /// the result back into `obj`.
    pub(crate) fn modify(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        change: Change<'_>,
        facet: Facet,
        dry_run: bool,
    ) -> Result<()> {
        check_deadline(ctx, "write")?;
        let resource = group_resource(obj);
        let key = obj.key();
        let mut inner = self.write()?;

        let stored = inner
            .stored(obj.resource_type(), &key)
            .map(|stored| stored.clone_object())
            .ok_or_else(|| StatusError::not_found(&resource, &key.name))?;
        let stored_value = stored.to_value().map_err(StatusError::internal)?;
        let current = obj.to_value().map_err(StatusError::internal)?;

        let next_value = match change {
            Change::Replace => {
                let expected = &obj.meta().resource_version;
                if !expected.is_empty() && *expected != stored.meta().resource_version {
                    return Err(StatusError::conflict(
                        &resource,
                        &key.name,
                        "the object has been modified; please apply your changes to the latest version and try again",
                    ));
                }
                replace_facet(stored_value, current, facet)
            }
            Change::Patch(patch) => {
                let mut document = patch.data(&current);
                restrict_to_facet(&mut document, facet);
                let mut value = stored_value;
                apply_merge_patch(&mut value, &document);
                value
            }
        };

        let mut next = stored.clone_object();
        next.assign_value(next_value).map_err(|err| {
            StatusError::invalid(obj.kind(), &key.name, err)
        })?;
        {
            let before = stored.meta();
            let meta = next.meta_mut();
            meta.name = before.name.clone();
            meta.namespace = before.namespace.clone();
            meta.uid = before.uid.clone();
            meta.creation_timestamp = before.creation_timestamp;
            meta.resource_version = before.resource_version.clone();
            meta.generation = match facet {
                Facet::Main => before.generation + 1,
                Facet::Status => before.generation,
            };
        }

        if !dry_run {
            next.meta_mut().resource_version = inner.next_revision();
            inner
                .objects
                .entry(obj.resource_type())
                .or_default()
                .insert(key.clone(), next.clone_object());
            debug!(
                kind = obj.kind(),
                key = %key,
                facet = ?facet,
                resource_version = %next.meta().resource_version,
                "updated object"
            );
        }
        obj.assign_from(next.as_any());
        Ok(())
    }
}

fn group_resource(obj: &dyn Object) -> GroupResource {
    GroupResource::for_kind(obj.kind())
}

fn check_deadline(ctx: &Context, operation: &str) -> Result<()> {
    if ctx.deadline_exceeded() {
        return Err(StatusError::timeout(
            format!("context deadline exceeded before {}", operation),
            0,
        ));
    }
    Ok(())
}

/// New document for a full-object write: `facet` comes from `current`, the
/// rest from `stored`.
fn replace_facet(stored: Value, current: Value, facet: Facet) -> Value {
    match facet {
        Facet::Main => {
            let mut next = current;
            if let Some(next) = next.as_object_mut() {
                match stored.get("status") {
                    Some(status) => {
                        next.insert("status".to_string(), status.clone());
                    }
                    None => {
                        next.remove("status");
                    }
                }
            }
            next
        }
        Facet::Status => {
            let mut next = stored;
            if let Some(next) = next.as_object_mut() {
                match current.get("status") {
                    Some(status) => {
                        next.insert("status".to_string(), status.clone());
                    }
                    None => {
                        next.remove("status");
                    }
                }
            }
            next
        }
    }
}

fn restrict_to_facet(document: &mut Value, facet: Facet) {
    if let Some(fields) = document.as_object_mut() {
        match facet {
            Facet::Main => {
                fields.remove("status");
            }
            Facet::Status => fields.retain(|field, _| field == "status"),
        }
    }
}

impl Client for MemoryStore {
    fn get(
        &self,
        ctx: &Context,
        key: &ObjectKey,
        obj: &mut dyn Object,
        _opts: &[GetOption],
    ) -> Result<()> {
        check_deadline(ctx, "get")?;
        let inner = self.read()?;
        let stored = inner
            .stored(obj.resource_type(), key)
            .ok_or_else(|| StatusError::not_found(&group_resource(obj), &key.name))?;
        obj.assign_from(stored.as_any());
        Ok(())
    }

    fn list(&self, ctx: &Context, list: &mut dyn ObjectList, opts: &[ListOption]) -> Result<()> {
        check_deadline(ctx, "list")?;
        let selector = ListOptions::from_options(opts);
        let inner = self.read()?;

        list.clear();
        if let Some(bucket) = inner.objects.get(&list.item_type()) {
            let matching = bucket
                .values()
                .filter(|obj| selector.matches(obj.meta()))
                .take(selector.limit.unwrap_or(usize::MAX));
            for obj in matching {
                list.push(&**obj);
            }
        }
        list.list_meta_mut().resource_version = inner.revision.to_string();
        Ok(())
    }

    fn create(&self, ctx: &Context, obj: &mut dyn Object, opts: &[CreateOption]) -> Result<()> {
        check_deadline(ctx, "create")?;
        let key = obj.key();
        if key.name.is_empty() {
            return Err(StatusError::invalid(
                obj.kind(),
                "",
                "metadata.name: Required value: name is required",
            ));
        }

        let mut inner = self.write()?;
        if inner.stored(obj.resource_type(), &key).is_some() {
            return Err(StatusError::already_exists(&group_resource(obj), &key.name));
        }
        if opts.iter().any(CreateOption::is_dry_run) {
            return Ok(());
        }

        let revision = inner.next_revision();
        let meta = obj.meta_mut();
        meta.uid = Uuid::new_v4().to_string();
        meta.resource_version = revision;
        meta.generation = 1;
        meta.creation_timestamp = Some(Utc::now());

        inner
            .objects
            .entry(obj.resource_type())
            .or_default()
            .insert(key.clone(), obj.clone_object());
        debug!(kind = obj.kind(), key = %key, "created object");
        Ok(())
    }

    fn delete(&self, ctx: &Context, obj: &dyn Object, opts: &[DeleteOption]) -> Result<()> {
        check_deadline(ctx, "delete")?;
        let resource = group_resource(obj);
        let key = obj.key();
        let mut inner = self.write()?;

        let Some(bucket) = inner.objects.get_mut(&obj.resource_type()) else {
            return Err(StatusError::not_found(&resource, &key.name));
        };
        let Some(stored) = bucket.get(&key) else {
            return Err(StatusError::not_found(&resource, &key.name));
        };
        for opt in opts {
            if let DeleteOption::Preconditions(preconditions) = opt {
                if let Some(field) = preconditions.violation(stored.meta()) {
                    return Err(StatusError::conflict(
                        &resource,
                        &key.name,
                        format!("Precondition failed: {} does not match", field),
                    ));
                }
            }
        }
        if opts.iter().any(DeleteOption::is_dry_run) {
            return Ok(());
        }

        bucket.remove(&key);
        debug!(kind = obj.kind(), key = %key, "deleted object");
        Ok(())
    }

    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()> {
        let dry_run = opts.iter().any(UpdateOption::is_dry_run);
        self.modify(ctx, obj, Change::Replace, Facet::Main, dry_run)
    }

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()> {
        let dry_run = opts.iter().any(PatchOption::is_dry_run);
        self.modify(ctx, obj, Change::Patch(patch), Facet::Main, dry_run)
    }

    fn delete_all_of(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        opts: &[DeleteAllOfOption],
    ) -> Result<()> {
        check_deadline(ctx, "deletecollection")?;
        let selector = ListOptions::from_options(opts.iter().filter_map(|opt| match opt {
            DeleteAllOfOption::List(list) => Some(list),
            DeleteAllOfOption::Delete(_) => None,
        }));
        let dry_run = opts
            .iter()
            .any(|opt| matches!(opt, DeleteAllOfOption::Delete(delete) if delete.is_dry_run()));

        let mut inner = self.write()?;
        if let Some(bucket) = inner.objects.get_mut(&obj.resource_type()) {
            let before = bucket.len();
            if !dry_run {
                bucket.retain(|_, stored| !selector.matches(stored.meta()));
            }
            debug!(
                kind = obj.kind(),
                removed = before - bucket.len(),
                "deleted collection"
            );
        }
        Ok(())
    }

    fn status(&self) -> Box<dyn SubResourceWriter + '_> {
        Box::new(StatusView::new(self))
    }

    fn sub_resource(&self, name: &str) -> Box<dyn SubResourceClient + '_> {
        Box::new(SubResourceView::new(self, name))
    }
}
