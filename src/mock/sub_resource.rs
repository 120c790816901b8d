//! Sub-Resource Dispatch
//!
//! [`SubResourceDispatcher`] is the view returned by [`MockClient::status`]
//! and [`MockClient::sub_resource`]. It applies the same lookup-then-route
//! logic as the primary client, keyed by its sub-resource name.
//!
//! [`MockClient::status`]: resource_api::Client::status
//! [`MockClient::sub_resource`]: resource_api::Client::sub_resource

use resource_api::{
    Context, GetOption, Object, Patch, PatchOption, Resource, Result, SubResourceClient,
    SubResourceWriter, UpdateOption, STATUS_SUBRESOURCE,
};

use super::client::{result_type_mismatch, Intercept, MockClient};
use super::operation::Operation;

/// Which delegate view a dispatcher forwards to
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    /// `delegate.status()`
    Status,
    /// `delegate.sub_resource(name)`
    Named(String),
}

/// Sub-resource view of a [`MockClient`]
#[derive(Debug)]
pub struct SubResourceDispatcher<'a> {
    client: &'a MockClient,
    route: Route,
}

impl<'a> SubResourceDispatcher<'a> {
    pub(crate) fn status(client: &'a MockClient) -> Self {
        Self {
            client,
            route: Route::Status,
        }
    }

    pub(crate) fn named(client: &'a MockClient, name: &str) -> Self {
        Self {
            client,
            route: Route::Named(name.to_string()),
        }
    }

    /// Sub-resource name used as the override key
    pub fn name(&self) -> &str {
        match &self.route {
            Route::Status => STATUS_SUBRESOURCE,
            Route::Named(name) => name,
        }
    }
}

impl SubResourceWriter for SubResourceDispatcher<'_> {
    fn update(&self, ctx: &Context, obj: &mut dyn Object, opts: &[UpdateOption]) -> Result<()> {
        self.client.fail_if_mocked(Operation::Update, obj.resource_type(), self.name())?;
        match &self.route {
            Route::Status => self.client.delegate().status().update(ctx, obj, opts),
            Route::Named(name) => self.client.delegate().sub_resource(name).update(ctx, obj, opts),
        }
    }

    fn patch(
        &self,
        ctx: &Context,
        obj: &mut dyn Object,
        patch: &Patch,
        opts: &[PatchOption],
    ) -> Result<()> {
        self.client.fail_if_mocked(Operation::Patch, obj.resource_type(), self.name())?;
        match &self.route {
            Route::Status => self.client.delegate().status().patch(ctx, obj, patch, opts),
            Route::Named(name) => self
                .client
                .delegate()
                .sub_resource(name)
                .patch(ctx, obj, patch, opts),
        }
    }
}

impl SubResourceClient for SubResourceDispatcher<'_> {
    /// Matches on the parent object's kind; an injected result is copied into
    /// `sub_resource`.
    fn get(
        &self,
        ctx: &Context,
        obj: &dyn Object,
        sub_resource: &mut dyn Resource,
        opts: &[GetOption],
    ) -> Result<()> {
        match self.client.intercept(Operation::Get, obj.resource_type(), self.name()) {
            Intercept::Fail(err) => Err(err),
            Intercept::Inject(result) => {
                if !sub_resource.assign_from(result.as_any()) {
                    result_type_mismatch(result, sub_resource.resource_type());
                }
                Ok(())
            }
            Intercept::Pass => self
                .client
                .delegate()
                .sub_resource(self.name())
                .get(ctx, obj, sub_resource, opts),
        }
    }
}
