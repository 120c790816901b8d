//! Object loading helpers.

use resource_api::{Client, Context, Object, ObjectKey, Result};

/// Loads the object `name` in `namespace` into `obj` through `client`.
///
/// Works the same against a [`MockClient`](crate::MockClient) and a real
/// store; `obj` is overwritten on success.
pub fn get_object(
    name: &str,
    namespace: &str,
    client: &dyn Client,
    ctx: &Context,
    obj: &mut dyn Object,
) -> Result<()> {
    client.get(ctx, &ObjectKey::new(name, namespace), obj, &[])
}
