//! JSON merge patches (RFC 7386).

use serde::Serialize;
use serde_json::{Map, Value};

/// Patch passed to `patch` calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Explicit merge patch document
    Merge(Value),
    /// Snapshot of the original object; the patch is the difference between
    /// the snapshot and the object handed to `patch`
    MergeFrom(Value),
}

impl Patch {
    pub fn merge(document: Value) -> Self {
        Self::Merge(document)
    }

    /// Snapshot `original` for a later diff.
    pub fn merge_from<T: Serialize>(original: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::MergeFrom(serde_json::to_value(original)?))
    }

    /// Merge patch document to apply, given the serialized object passed to
    /// the call.
    pub fn data(&self, current: &Value) -> Value {
        match self {
            Self::Merge(document) => document.clone(),
            Self::MergeFrom(original) => create_merge_patch(original, current),
        }
    }
}

/// Applies `patch` to `target` in place.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                apply_merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Smallest merge patch turning `original` into `modified`.
pub fn create_merge_patch(original: &Value, modified: &Value) -> Value {
    match (original, modified) {
        (Value::Object(original), Value::Object(modified)) => {
            let mut patch = Map::new();
            for (key, before) in original {
                match modified.get(key) {
                    None => {
                        patch.insert(key.clone(), Value::Null);
                    }
                    Some(after) if after != before => {
                        patch.insert(key.clone(), create_merge_patch(before, after));
                    }
                    Some(_) => {}
                }
            }
            for (key, after) in modified {
                if !original.contains_key(key) {
                    patch.insert(key.clone(), after.clone());
                }
            }
            Value::Object(patch)
        }
        _ => modified.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_merge_patch_rfc_examples() {
        let mut target = json!({"a": "b", "c": {"d": "e", "f": "g"}});
        apply_merge_patch(&mut target, &json!({"a": "z", "c": {"f": null}}));
        assert_eq!(target, json!({"a": "z", "c": {"d": "e"}}));

        let mut target = json!({"a": ["b"]});
        apply_merge_patch(&mut target, &json!({"a": "c"}));
        assert_eq!(target, json!({"a": "c"}));

        let mut target = json!(["a", "b"]);
        apply_merge_patch(&mut target, &json!({"a": "b"}));
        assert_eq!(target, json!({"a": "b"}));
    }

    #[test]
    fn test_create_merge_patch_reverses_apply() {
        let original = json!({"metadata": {"name": "cm", "labels": {"x": "1"}}, "data": {"k": "v"}});
        let modified = json!({"metadata": {"name": "cm", "labels": {"y": "2"}}, "data": {"k": "v"}});

        let patch = create_merge_patch(&original, &modified);
        assert_eq!(patch, json!({"metadata": {"labels": {"x": null, "y": "2"}}}));

        let mut applied = original.clone();
        apply_merge_patch(&mut applied, &patch);
        assert_eq!(applied, modified);
    }

    #[test]
    fn test_merge_from_diffs_against_current() {
        let patch = Patch::merge_from(&json!({"data": {"k": "v"}})).unwrap();
        let data = patch.data(&json!({"data": {"k": "v2"}}));
        assert_eq!(data, json!({"data": {"k": "v2"}}));

        let unchanged = patch.data(&json!({"data": {"k": "v"}}));
        assert_eq!(unchanged, json!({}));
    }
}
