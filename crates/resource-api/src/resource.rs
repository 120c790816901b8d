//! Resource traits and runtime type descriptors.
//!
//! Every kind stored behind a [`Client`](crate::Client) implements [`Kind`],
//! which provides [`Resource`] through a blanket impl. Calls take objects as
//! `&dyn Object`, so the concrete kind is always recoverable through
//! [`Resource::resource_type`] regardless of how the caller holds the value.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::meta::{ListMeta, ObjectKey, ObjectMeta};

/// Identity of a concrete resource kind.
///
/// Equality and hashing use the [`TypeId`] only, so two kinds with identical
/// shape never compare equal. The type name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct ResourceType {
    id: TypeId,
    name: &'static str,
}

impl ResourceType {
    /// Descriptor for the kind `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name of the kind.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if this descriptor names the kind `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ResourceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourceType {}

impl Hash for ResourceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceType({})", self.name)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A concrete, serializable resource kind.
pub trait Kind: Any + Clone + fmt::Debug + Send + Sync + Serialize + DeserializeOwned {
    /// API kind name, e.g. `ConfigMap`.
    const KIND: &'static str;

    /// Kind name of a [`List`] of this kind, e.g. `ConfigMapList`.
    const LIST_KIND: &'static str = "List";
}

/// Object-safe view of any resource value: single objects and lists alike.
pub trait Resource: Any + fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    fn resource_type(&self) -> ResourceType;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Deep copy behind a fresh box.
    fn clone_resource(&self) -> Box<dyn Resource>;

    /// Overwrites `self` with a deep copy of `source`.
    ///
    /// Returns false, leaving `self` untouched, when `source` is a different
    /// concrete kind.
    fn assign_from(&mut self, source: &dyn Any) -> bool;

    fn to_value(&self) -> Result<Value, serde_json::Error>;

    /// Replaces `self` with the kind decoded from `value`.
    fn assign_value(&mut self, value: Value) -> Result<(), serde_json::Error>;
}

impl<T: Kind> Resource for T {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_resource(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }

    fn assign_from(&mut self, source: &dyn Any) -> bool {
        match source.downcast_ref::<T>() {
            Some(source) => {
                *self = source.clone();
                true
            }
            None => false,
        }
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn assign_value(&mut self, value: Value) -> Result<(), serde_json::Error> {
        *self = serde_json::from_value(value)?;
        Ok(())
    }
}

/// Access to the standard object metadata of a kind.
pub trait HasMetadata {
    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}

/// A single named resource object.
pub trait Object: Resource {
    fn meta(&self) -> &ObjectMeta;

    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn clone_object(&self) -> Box<dyn Object>;

    fn key(&self) -> ObjectKey {
        ObjectKey::from_meta(self.meta())
    }
}

impl<T: Kind + HasMetadata> Object for T {
    fn meta(&self) -> &ObjectMeta {
        self.metadata()
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        self.metadata_mut()
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }
}

/// A container of objects of a single kind.
pub trait ObjectList: Resource {
    /// Kind of the contained items.
    fn item_type(&self) -> ResourceType;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Appends a deep copy of `item`; false if `item` is not the item kind.
    fn push(&mut self, item: &dyn Object) -> bool;

    fn items(&self) -> Vec<&dyn Object>;

    fn list_meta(&self) -> &ListMeta;

    fn list_meta_mut(&mut self) -> &mut ListMeta;
}

/// Generic list container. `List<ConfigMap>` and `List<Secret>` are distinct
/// kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List<T> {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> List<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            metadata: ListMeta::default(),
            items,
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Kind + HasMetadata> Kind for List<T> {
    const KIND: &'static str = T::LIST_KIND;
}

impl<T: Kind + HasMetadata> ObjectList for List<T> {
    fn item_type(&self) -> ResourceType {
        ResourceType::of::<T>()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn push(&mut self, item: &dyn Object) -> bool {
        match item.as_any().downcast_ref::<T>() {
            Some(item) => {
                self.items.push(item.clone());
                true
            }
            None => false,
        }
    }

    fn items(&self) -> Vec<&dyn Object> {
        self.items.iter().map(|item| item as &dyn Object).collect()
    }

    fn list_meta(&self) -> &ListMeta {
        &self.metadata
    }

    fn list_meta_mut(&mut self) -> &mut ListMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{ConfigMap, ConfigMapList, Secret};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct LookalikeConfigMap {
        metadata: ObjectMeta,
        data: std::collections::BTreeMap<String, String>,
    }

    impl Kind for LookalikeConfigMap {
        const KIND: &'static str = "ConfigMap";
    }

    #[test]
    fn test_resource_type_is_nominal() {
        assert_eq!(ResourceType::of::<ConfigMap>(), ResourceType::of::<ConfigMap>());
        assert_ne!(
            ResourceType::of::<ConfigMap>(),
            ResourceType::of::<LookalikeConfigMap>()
        );
        assert_ne!(ResourceType::of::<ConfigMap>(), ResourceType::of::<Secret>());
    }

    #[test]
    fn test_resource_type_of_value_matches_static() {
        let cm = ConfigMap::new("a", "default");
        let boxed: Box<dyn Object> = Box::new(cm.clone());
        assert_eq!(cm.resource_type(), ResourceType::of::<ConfigMap>());
        assert_eq!(boxed.resource_type(), ResourceType::of::<ConfigMap>());
        assert!(boxed.resource_type().is::<ConfigMap>());
    }

    #[test]
    fn test_list_types_are_distinct() {
        assert_ne!(
            ResourceType::of::<ConfigMapList>(),
            ResourceType::of::<List<Secret>>()
        );
        assert_ne!(
            ResourceType::of::<ConfigMapList>(),
            ResourceType::of::<ConfigMap>()
        );
    }

    #[test]
    fn test_assign_from_deep_copies() {
        let mut source = ConfigMap::new("source", "default");
        source.data.insert("key".to_string(), "value".to_string());

        let mut target = ConfigMap::default();
        assert!(target.assign_from(source.as_any()));
        assert_eq!(target, source);

        source.data.insert("key".to_string(), "changed".to_string());
        assert_eq!(target.data["key"], "value");
    }

    #[test]
    fn test_assign_from_rejects_other_kind() {
        let source = Secret::new("s", "default");
        let mut target = ConfigMap::new("keep", "default");
        assert!(!target.assign_from(source.as_any()));
        assert_eq!(target.metadata.name, "keep");
    }

    #[test]
    fn test_list_kind_follows_item_kind() {
        assert_eq!(ConfigMapList::default().kind(), "ConfigMapList");
        assert_eq!(List::<Secret>::default().kind(), "SecretList");
        assert_eq!(LookalikeConfigMap::LIST_KIND, "List");
    }

    #[test]
    fn test_list_push_checks_item_kind() {
        let mut list = ConfigMapList::default();
        assert!(list.push(&ConfigMap::new("a", "default")));
        assert!(!list.push(&Secret::new("b", "default")));
        assert_eq!(list.len(), 1);
        assert_eq!(list.item_type(), ResourceType::of::<ConfigMap>());
        assert_eq!(list.items()[0].meta().name, "a");
    }
}
