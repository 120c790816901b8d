//! Kind Registry for Fixtures
//!
//! Maps the kind names used in fixture files to resource types and decoders.

use std::collections::BTreeMap;
use std::fmt;

use resource_api::{
    ConfigMap, ConfigMapList, Kind, Pod, PodList, Resource, ResourceType, Secret, SecretList,
};
use serde_json::Value;

type Decoder = fn(Value) -> Result<Box<dyn Resource>, serde_json::Error>;

#[derive(Clone, Copy)]
struct KindEntry {
    resource_type: ResourceType,
    decode: Decoder,
}

fn decode_as<T: Kind>(value: Value) -> Result<Box<dyn Resource>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

/// Named kinds a fixture may refer to
#[derive(Clone, Default)]
pub struct Scheme {
    kinds: BTreeMap<String, KindEntry>,
}

impl Scheme {
    /// Empty scheme
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheme knowing ConfigMap, Secret, Pod and their lists
    pub fn with_builtin_kinds() -> Self {
        let mut scheme = Self::new();
        scheme
            .register::<ConfigMap>(ConfigMap::KIND)
            .register::<ConfigMapList>(ConfigMapList::KIND)
            .register::<Secret>(Secret::KIND)
            .register::<SecretList>(SecretList::KIND)
            .register::<Pod>(Pod::KIND)
            .register::<PodList>(PodList::KIND);
        scheme
    }

    /// Register `T` under `name`, replacing any kind already using the name
    pub fn register<T: Kind>(&mut self, name: impl Into<String>) -> &mut Self {
        self.kinds.insert(
            name.into(),
            KindEntry {
                resource_type: ResourceType::of::<T>(),
                decode: decode_as::<T>,
            },
        );
        self
    }

    pub fn resource_type(&self, name: &str) -> Option<ResourceType> {
        self.kinds.get(name).map(|entry| entry.resource_type)
    }

    /// Decode `value` as the kind registered under `name`.
    ///
    /// Returns None for an unknown name.
    pub fn decode(
        &self,
        name: &str,
        value: Value,
    ) -> Option<Result<Box<dyn Resource>, serde_json::Error>> {
        self.kinds.get(name).map(|entry| (entry.decode)(value))
    }

    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.kinds
                    .iter()
                    .map(|(name, entry)| (name, entry.resource_type)),
            )
            .finish()
    }
}
