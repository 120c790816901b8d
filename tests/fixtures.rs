//! Fixture Loading Tests
//!
//! Loads override fixtures from disk and drives a mock client with them.

mod common;

use std::io::Write;

use common::{config_map, data_path, key, pod, seed, store};
use resource_mock::api::{
    Client, ConfigMap, Pod, ResourceType, SecretList, StatusReason, SubResourceClient,
    SubResourceWriter, STATUS_SUBRESOURCE,
};
use resource_mock::{Fixture, FixtureError, MockClient, Operation, Scheme};
use tempfile::NamedTempFile;

// =============================================================================
// Loading
// =============================================================================

/// Test: the shared fixture parses into entries in file order
#[test]
fn test_load_shared_fixture() {
    common::init_tracing();
    let path = data_path("overrides.toml");
    let fixture = Fixture::load(&path, &Scheme::with_builtin_kinds()).unwrap();

    assert_eq!(fixture.path.as_deref(), Some(path.as_path()));
    assert_eq!(fixture.overrides.len(), 5);
    let operations: Vec<_> = fixture.overrides.iter().map(|o| o.operation).collect();
    assert_eq!(
        operations,
        vec![
            Operation::Create,
            Operation::List,
            Operation::Get,
            Operation::Update,
            Operation::Get
        ]
    );
    assert_eq!(fixture.overrides[1].resource_type, ResourceType::of::<SecretList>());
}

/// Test: the same bytes always yield the same digest
#[test]
fn test_digest_tracks_content() {
    let scheme = Scheme::with_builtin_kinds();
    let shared = Fixture::load(data_path("overrides.toml"), &scheme).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&std::fs::read(data_path("overrides.toml")).unwrap())
        .unwrap();
    let copy = Fixture::load(file.path(), &scheme).unwrap();
    assert_eq!(shared.digest, copy.digest);

    writeln!(file, "\n# trailing comment").unwrap();
    let edited = Fixture::load(file.path(), &scheme).unwrap();
    assert_ne!(shared.digest, edited.digest);
    assert_eq!(edited.overrides.len(), shared.overrides.len());
}

/// Test: kinds registered by the caller are usable in fixtures
#[test]
fn test_custom_kind_name() {
    let mut scheme = Scheme::new();
    scheme.register::<ConfigMap>("Settings");

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "[[override]]\noperation = \"delete\"\nkind = \"Settings\"\nerror = {{ reason = \"Conflict\" }}\n"
    )
    .unwrap();

    let fixture = Fixture::load(file.path(), &scheme).unwrap();
    assert_eq!(fixture.overrides[0].resource_type, ResourceType::of::<ConfigMap>());

    let err = Fixture::load(data_path("overrides.toml"), &scheme).unwrap_err();
    assert!(matches!(err, FixtureError::UnknownKind { index: 0, .. }));
}

/// Test: a primary-resource read whose result is another kind is rejected at load time
#[test]
fn test_mismatched_result_kind_rejected_at_load() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "[[override]]\noperation = \"get\"\nkind = \"ConfigMap\"\nresult_kind = \"Secret\"\nresult = {{ metadata = {{ name = \"s\" }} }}\n"
    )
    .unwrap();

    let err = Fixture::load(file.path(), &Scheme::with_builtin_kinds()).unwrap_err();
    match err {
        FixtureError::InvalidResult { index, kind, message } => {
            assert_eq!(index, 0);
            assert_eq!(kind, "Secret");
            assert!(message.contains("cannot answer ConfigMap calls"), "{}", message);
        }
        other => panic!("expected InvalidResult, got {:?}", other),
    }
}

// =============================================================================
// Driving a mock client
// =============================================================================

/// Test: every fixture entry takes effect; everything else reaches the store
#[test]
fn test_fixture_drives_mock_client() {
    let (store, ctx) = store();
    seed(&store, &ctx, pod("web"));
    let registry = Fixture::load(data_path("overrides.toml"), &Scheme::with_builtin_kinds())
        .unwrap()
        .into_registry();
    let client = MockClient::new(store.clone(), registry).with_call_log();

    let err = client.create(&ctx, &mut config_map("new"), &[]).unwrap_err();
    assert_eq!(err.reason, StatusReason::BadRequest);
    assert_eq!(err.message, "mocked create error");

    let mut secrets = SecretList::default();
    let err = client.list(&ctx, &mut secrets, &[]).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.retry_after_seconds(), Some(5));

    let mut cm = ConfigMap::default();
    client.get(&ctx, &key("anything"), &mut cm, &[]).unwrap();
    assert_eq!(cm.metadata.labels["test"], "mocked");
    assert_eq!(cm.data["key"], "value");

    let mut web = Pod::default();
    client.get(&ctx, &key("web"), &mut web, &[]).unwrap();
    assert!(client.status().update(&ctx, &mut web, &[]).unwrap_err().is_forbidden());
    client.update(&ctx, &mut web, &[]).unwrap();

    let mut status = Pod::default();
    client
        .sub_resource(STATUS_SUBRESOURCE)
        .get(&ctx, &web, &mut status, &[])
        .unwrap();
    assert_eq!(status.status.phase, "Running");

    let delegated = client
        .calls()
        .iter()
        .filter(|call| !call.is_mocked())
        .count();
    assert_eq!(delegated, 2, "only the pod get and update reach the store");
}
