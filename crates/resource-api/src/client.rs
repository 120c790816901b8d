//! Client capability set.
//!
//! [`Client`] covers the primary resource. [`Client::status`] and
//! [`Client::sub_resource`] return narrower views addressing a named facet of
//! an object, such as its status.

use std::sync::Arc;

use crate::context::Context;
use crate::meta::ObjectKey;
use crate::options::{
    CreateOption, DeleteAllOfOption, DeleteOption, GetOption, ListOption, PatchOption,
    UpdateOption,
};
use crate::patch::Patch;
use crate::resource::{Object, ObjectList, Resource};
use crate::Result;

pub trait Client: Send + Sync {
    /// Reads the object at `key` into `obj`.
    fn get(&self, ctx: &Context, key: &ObjectKey, obj: &mut dyn Object, opts: &[GetOption])
        -> Result<()>;

    /// Fills `list` with the stored objects of its item kind.
    fn list(&self, ctx: &Context, list: &mut dyn ObjectList, opts: &[ListOption]) -> Result<()>;

    fn create(&self, ctx: &Context, obj: &mut dyn Object, opts: &[CreateOption]) -> Result<()>;

    fn delete(&self, ctx: &Context, obj: &dyn Object, opts: &[DeleteOption]) -> Result<()>;

    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()>;

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()>;

    /// Deletes every object of `obj`'s kind selected by `opts`.
    fn delete_all_of(&self, ctx: &Context, obj: &dyn Object, opts: &[DeleteAllOfOption])
        -> Result<()>;

    /// Writer for the status sub-resource.
    fn status(&self) -> Box<dyn SubResourceWriter + '_>;

    /// Client for the sub-resource called `name`.
    fn sub_resource(&self, name: &str) -> Box<dyn SubResourceClient + '_>;
}

/// Writes addressed to one sub-resource of an object.
pub trait SubResourceWriter {
    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()>;

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()>;
}

/// Reads and writes addressed to one sub-resource of an object.
pub trait SubResourceClient: SubResourceWriter {
    /// Reads the sub-resource of `obj` into `sub_resource`.
    fn get(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        sub_resource: &mut dyn Resource,
        opts: &[GetOption],
    ) -> Result<()>;
}

impl<C: Client + ?Sized> Client for Arc<C> {
    fn get(
        &self,
        ctx: &Context,
        key: &ObjectKey,
        obj: &mut dyn Object,
        opts: &[GetOption],
    ) -> Result<()> {
        (**self).get(ctx, key, obj, opts)
    }

    fn list(&self, ctx: &Context, list: &mut dyn ObjectList, opts: &[ListOption]) -> Result<()> {
        (**self).list(ctx, list, opts)
    }

    fn create(&self, ctx: &Context, obj: &mut dyn Object, opts: &[CreateOption]) -> Result<()> {
        (**self).create(ctx, obj, opts)
    }

    fn delete(&self, ctx: &Context, obj: &dyn Object, opts: &[DeleteOption]) -> Result<()> {
        (**self).delete(ctx, obj, opts)
    }

    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()> {
        (**self).update(ctx, obj, opts)
    }

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()> {
        (**self).patch(ctx, obj, patch, opts)
    }

    fn delete_all_of(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        opts: &[DeleteAllOfOption],
    ) -> Result<()> {
        (**self).delete_all_of(ctx, obj, opts)
    }

    fn status(&self) -> Box<dyn SubResourceWriter + '_> {
        (**self).status()
    }

    fn sub_resource(&self, name: &str) -> Box<dyn SubResourceClient + '_> {
        (**self).sub_resource(name)
    }
}
