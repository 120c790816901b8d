//! Sub-resource views over a [`MemoryStore`].

use resource_api::{
    Context, GetOption, GroupResource, Object, Patch, PatchOption, Resource, Result, StatusError,
    SubResourceClient, SubResourceWriter, UpdateOption, STATUS_SUBRESOURCE,
};

use crate::store::{Change, Facet, MemoryStore};

/// Writer returned by [`Client::status`](resource_api::Client::status).
pub(crate) struct StatusView<'a> {
    store: &'a MemoryStore,
}

impl<'a> StatusView<'a> {
    pub(crate) fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }
}

impl SubResourceWriter for StatusView<'_> {
    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()> {
        let dry_run = opts.iter().any(UpdateOption::is_dry_run);
        self.store.modify(ctx, obj, Change::Replace, Facet::Status, dry_run)
    }

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()> {
        let dry_run = opts.iter().any(PatchOption::is_dry_run);
        self.store.modify(ctx, obj, Change::Patch(patch), Facet::Status, dry_run)
    }
}

/// Client returned by [`Client::sub_resource`](resource_api::Client::sub_resource).
///
/// Only the status sub-resource is stored; any other name answers `NotFound`.
pub(crate) struct SubResourceView<'a> {
    store: &'a MemoryStore,
    name: String,
}

impl<'a> SubResourceView<'a> {
    pub(crate) fn new(store: &'a MemoryStore, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
        }
    }

    fn status(&self, obj: &dyn Object) -> Result<StatusView<'a>> {
        if self.name == STATUS_SUBRESOURCE {
            return Ok(StatusView::new(self.store));
        }
        let parent = GroupResource::for_kind(obj.kind());
        let resource = GroupResource::new(parent.group, format!("{}/{}", parent.resource, self.name));
        Err(StatusError::not_found(&resource, &obj.meta().name))
    }
}

impl SubResourceWriter for SubResourceView<'_> {
    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()> {
        self.status(obj)?.update(ctx, obj, opts)
    }

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()> {
        self.status(obj)?.patch(ctx, obj, patch, opts)
    }
}

impl SubResourceClient for SubResourceView<'_> {
    fn get(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        sub_resource: &mut dyn Resource,
        _opts: &[GetOption],
    ) -> Result<()> {
        self.status(obj)?;
        self.store.read_into(ctx, obj, sub_resource)
    }
}
