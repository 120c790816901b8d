//! Resource API Types
//!
//! Defines the client capability set used to create, read, update and delete
//! structured resource objects, plus the object model those calls operate on.

pub mod client;
pub mod context;
pub mod error;
pub mod kinds;
pub mod meta;
pub mod options;
pub mod patch;
pub mod resource;

pub use client::{Client, SubResourceClient, SubResourceWriter};
pub use context::{Context, ContextKey};
pub use error::{GroupResource, StatusDetails, StatusError, StatusReason};
pub use kinds::{
    ConfigMap, ConfigMapList, Container, Pod, PodCondition, PodList, PodSpec, PodStatus, Secret,
    SecretList,
};
pub use meta::{ListMeta, ObjectKey, ObjectMeta};
pub use options::{
    CreateOption, DeleteAllOfOption, DeleteOption, GetOption, ListOption, ListOptions,
    PatchOption, Preconditions, UpdateOption,
};
pub use patch::{apply_merge_patch, create_merge_patch, Patch};
pub use resource::{HasMetadata, Kind, List, Object, ObjectList, Resource, ResourceType};

/// Result type returned by every client call.
pub type Result<T> = std::result::Result<T, StatusError>;

/// Sub-resource name of the primary resource.
pub const MAIN_RESOURCE: &str = "";

/// Sub-resource name of the status facet.
pub const STATUS_SUBRESOURCE: &str = "status";
