//! Shared helpers for integration tests
//!
//! Each test binary pulls in the helpers it needs; the rest are unused there.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use resource_mock::api::{Client, ConfigMap, Context, ObjectKey, Pod};
use resource_store::MemoryStore;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber once per binary.
///
/// `RUST_LOG` overrides the default `warn` filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Path to a file under tests/data
pub fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

pub fn config_map(name: &str) -> ConfigMap {
    ConfigMap::new(name, "default")
}

pub fn pod(name: &str) -> Pod {
    Pod::new(name, "default")
}

/// Empty store plus a background context
pub fn store() -> (MemoryStore, Context) {
    init_tracing();
    (MemoryStore::new(), Context::background())
}

/// Create `obj` directly in `store`, bypassing any mock
pub fn seed<T: resource_mock::api::Object>(store: &MemoryStore, ctx: &Context, mut obj: T) -> T {
    store.create(ctx, &mut obj, &[]).expect("seed object");
    obj
}

pub fn key(name: &str) -> ObjectKey {
    ObjectKey::new(name, "default")
}
