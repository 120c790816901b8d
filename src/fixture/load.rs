//! Fixture Loading
//!
//! Parses TOML fixture files into override entries, recording where each
//! fixture came from and a digest of its bytes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use resource_api::StatusError;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::scheme::Scheme;
use super::FixtureError;
use crate::logging;
use crate::mock::{Operation, OverrideEntry, OverrideRegistry};

/// Top-level fixture document
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureDocument {
    #[serde(default, rename = "override")]
    overrides: Vec<OverrideSpec>,
}

/// One `[[override]]` table
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideSpec {
    operation: String,
    kind: String,
    #[serde(default)]
    sub_resource: String,
    #[serde(default)]
    result: Option<Value>,
    /// Kind of `result` when it differs from `kind`, e.g. a sub-resource read
    #[serde(default)]
    result_kind: Option<String>,
    #[serde(default)]
    error: Option<StatusError>,
}

impl OverrideSpec {
    fn into_entry(self, index: usize, scheme: &Scheme) -> Result<OverrideEntry, FixtureError> {
        let operation = self
            .operation
            .parse::<Operation>()
            .map_err(|err| FixtureError::UnknownOperation { index, name: err.0 })?;
        let resource_type = scheme
            .resource_type(&self.kind)
            .ok_or_else(|| FixtureError::UnknownKind {
                index,
                name: self.kind.clone(),
            })?;

        match (&self.error, &self.result) {
            (None, None) => return Err(FixtureError::EmptyOverride { index }),
            (None, Some(_)) if !operation.is_read() => {
                return Err(FixtureError::ResultOnWrite { index, operation });
            }
            _ => {}
        }

        let on_main_resource = self.sub_resource.is_empty();
        let mut entry =
            OverrideEntry::for_type(operation, resource_type).on_sub_resource(self.sub_resource);
        if let Some(value) = self.result {
            let kind = self.result_kind.unwrap_or_else(|| self.kind.clone());
            let result = scheme
                .decode(&kind, value)
                .ok_or_else(|| FixtureError::UnknownKind {
                    index,
                    name: kind.clone(),
                })?
                .map_err(|err| FixtureError::InvalidResult {
                    index,
                    kind: kind.clone(),
                    message: err.to_string(),
                })?;
            // Primary-resource reads copy the result into the caller's own object.
            if on_main_resource && result.resource_type() != resource_type {
                return Err(FixtureError::InvalidResult {
                    index,
                    kind,
                    message: format!(
                        "a {} result cannot answer {} calls",
                        result.kind(),
                        self.kind
                    ),
                });
            }
            entry = entry.with_boxed_result(result);
        }
        if let Some(error) = self.error {
            entry = entry.with_error(error);
        }
        Ok(entry)
    }
}

/// Overrides parsed from one fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Source file (None when parsed from a string)
    pub path: Option<PathBuf>,
    /// SHA-256 digest of the raw fixture bytes
    pub digest: String,
    pub loaded_at: DateTime<Utc>,
    /// Entries in file order
    pub overrides: Vec<OverrideEntry>,
}

impl Fixture {
    /// Load and parse the fixture file at `path`
    pub fn load(path: impl AsRef<Path>, scheme: &Scheme) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| FixtureError::Io(format!("{}: {}", path.display(), e)))?;
        let contents = String::from_utf8(bytes)
            .map_err(|e| FixtureError::Parse(format!("Invalid UTF-8: {}", e)))?;

        let mut fixture = Self::parse(&contents, scheme)?;
        fixture.path = Some(path.to_path_buf());
        logging::log_fixture_loaded(path, fixture.overrides.len(), &fixture.digest);
        Ok(fixture)
    }

    /// Parse fixture text
    pub fn parse(contents: &str, scheme: &Scheme) -> Result<Self, FixtureError> {
        let digest = hex::encode(Sha256::digest(contents.as_bytes()));

        let toml_value: toml::Value = toml::from_str(contents)
            .map_err(|e| FixtureError::Parse(format!("TOML parse error: {}", e)))?;
        let document: FixtureDocument = serde_json::from_value(toml_to_json(toml_value))
            .map_err(|e| FixtureError::Document(e.to_string()))?;

        let overrides = document
            .overrides
            .into_iter()
            .enumerate()
            .map(|(index, spec)| spec.into_entry(index, scheme))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path: None,
            digest,
            loaded_at: Utc::now(),
            overrides,
        })
    }

    /// Freeze the overrides into a registry
    pub fn into_registry(self) -> OverrideRegistry {
        OverrideRegistry::new(self.overrides)
    }
}

/// Convert a TOML value to JSON; datetimes become RFC 3339 strings
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_api::{ConfigMap, Pod, ResourceType};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIXTURE: &str = r#"
[[override]]
operation = "create"
kind = "ConfigMap"
error = { reason = "BadRequest", message = "mocked create error" }

[[override]]
operation = "get"
kind = "Pod"
sub_resource = "status"
result = { metadata = { name = "pod", namespace = "default", creationTimestamp = 2024-01-02T03:04:05Z }, status = { phase = "Running" } }
"#;

    #[test]
    fn test_parse_entries_in_order() {
        let fixture = Fixture::parse(FIXTURE, &Scheme::with_builtin_kinds()).unwrap();
        assert_eq!(fixture.overrides.len(), 2);
        assert!(fixture.path.is_none());

        let create = &fixture.overrides[0];
        assert_eq!(create.operation, Operation::Create);
        assert_eq!(create.resource_type, ResourceType::of::<ConfigMap>());
        assert_eq!(
            create.error,
            Some(StatusError::bad_request("mocked create error"))
        );

        let status = &fixture.overrides[1];
        assert_eq!(status.sub_resource, "status");
        let pod = status
            .result
            .as_ref()
            .unwrap()
            .as_any()
            .downcast_ref::<Pod>()
            .unwrap();
        assert_eq!(pod.status.phase, "Running");
        assert!(pod.metadata.creation_timestamp.is_some());
    }

    #[test]
    fn test_digest_is_stable() {
        let scheme = Scheme::with_builtin_kinds();
        let a = Fixture::parse(FIXTURE, &scheme).unwrap();
        let b = Fixture::parse(FIXTURE, &scheme).unwrap();
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.digest.len(), 64);
    }

    #[test]
    fn test_unknown_kind_and_operation() {
        let scheme = Scheme::with_builtin_kinds();

        let err = Fixture::parse(
            "[[override]]\noperation = \"get\"\nkind = \"Deployment\"\nerror = { reason = \"NotFound\" }\n",
            &scheme,
        )
        .unwrap_err();
        assert!(matches!(err, FixtureError::UnknownKind { index: 0, .. }));

        let err = Fixture::parse(
            "[[override]]\noperation = \"watch\"\nkind = \"Pod\"\nerror = { reason = \"NotFound\" }\n",
            &scheme,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "override 0: unknown operation `watch`");
    }

    #[test]
    fn test_rejects_inert_and_write_results() {
        let scheme = Scheme::with_builtin_kinds();

        let err = Fixture::parse("[[override]]\noperation = \"get\"\nkind = \"Pod\"\n", &scheme)
            .unwrap_err();
        assert!(matches!(err, FixtureError::EmptyOverride { index: 0 }));

        let err = Fixture::parse(
            "[[override]]\noperation = \"update\"\nkind = \"Pod\"\nresult = {}\n",
            &scheme,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FixtureError::ResultOnWrite {
                operation: Operation::Update,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_results() {
        let scheme = Scheme::with_builtin_kinds();

        let err = Fixture::parse(
            "[[override]]\noperation = \"get\"\nkind = \"Pod\"\nreslt = {}\n",
            &scheme,
        )
        .unwrap_err();
        assert!(matches!(err, FixtureError::Document(_)));

        let err = Fixture::parse(
            "[[override]]\noperation = \"get\"\nkind = \"ConfigMap\"\nresult = { data = 5 }\n",
            &scheme,
        )
        .unwrap_err();
        assert!(matches!(err, FixtureError::InvalidResult { .. }));

        let err = Fixture::parse("[[override]\n", &scheme).unwrap_err();
        assert!(matches!(err, FixtureError::Parse(_)));
    }

    #[test]
    fn test_result_kind_must_match_main_resource() {
        let scheme = Scheme::with_builtin_kinds();

        let err = Fixture::parse(
            "[[override]]\noperation = \"get\"\nkind = \"ConfigMap\"\nresult_kind = \"Secret\"\nresult = {}\n",
            &scheme,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "override 0: invalid Secret result: a Secret result cannot answer ConfigMap calls"
        );

        let fixture = Fixture::parse(
            "[[override]]\noperation = \"get\"\nkind = \"Pod\"\nsub_resource = \"scale\"\nresult_kind = \"ConfigMap\"\nresult = {}\n",
            &scheme,
        )
        .unwrap();
        assert_eq!(fixture.overrides[0].sub_resource, "scale");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let fixture = Fixture::load(file.path(), &Scheme::with_builtin_kinds()).unwrap();
        assert_eq!(fixture.path.as_deref(), Some(file.path()));

        let registry = fixture.into_registry();
        assert!(registry
            .lookup(Operation::Get, ResourceType::of::<Pod>(), "status")
            .is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Fixture::load("/nonexistent/overrides.toml", &Scheme::with_builtin_kinds())
            .unwrap_err();
        assert!(matches!(err, FixtureError::Io(_)));
    }
}
