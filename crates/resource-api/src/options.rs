//! Call options.
//!
//! Options are order-insensitive modifiers. Wrappers forward them unexamined;
//! only the backing store interprets them.

use std::collections::BTreeMap;

use crate::meta::ObjectMeta;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOption {
    /// Validate without persisting
    DryRun,
    FieldManager(String),
}

impl CreateOption {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOption {
    DryRun,
    FieldManager(String),
}

impl UpdateOption {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOption {
    DryRun,
    FieldManager(String),
    /// Take ownership of conflicting fields
    Force,
}

impl PatchOption {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetOption {
    ResourceVersion(String),
}

/// Conditions that must hold on the stored object for a delete to proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preconditions {
    pub uid: Option<String>,
    pub resource_version: Option<String>,
}

impl Preconditions {
    /// Returns the first violated field, if any.
    pub fn violation(&self, meta: &ObjectMeta) -> Option<&'static str> {
        if self.uid.as_ref().is_some_and(|uid| *uid != meta.uid) {
            return Some("uid");
        }
        if self
            .resource_version
            .as_ref()
            .is_some_and(|rv| *rv != meta.resource_version)
        {
            return Some("resourceVersion");
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOption {
    DryRun,
    GracePeriodSeconds(i64),
    Preconditions(Preconditions),
}

impl DeleteOption {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOption {
    InNamespace(String),
    MatchingLabels(BTreeMap<String, String>),
    Limit(usize),
}

impl ListOption {
    pub fn in_namespace(namespace: impl Into<String>) -> Self {
        Self::InNamespace(namespace.into())
    }

    pub fn matching_labels<K, V>(labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::MatchingLabels(
            labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAllOfOption {
    List(ListOption),
    Delete(DeleteOption),
}

impl From<ListOption> for DeleteAllOfOption {
    fn from(option: ListOption) -> Self {
        Self::List(option)
    }
}

impl From<DeleteOption> for DeleteAllOfOption {
    fn from(option: DeleteOption) -> Self {
        Self::Delete(option)
    }
}

/// List options folded into a single selector.
///
/// Later options win for namespace and limit; label selectors accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn from_options<'a>(options: impl IntoIterator<Item = &'a ListOption>) -> Self {
        let mut resolved = Self::default();
        for option in options {
            match option {
                ListOption::InNamespace(namespace) => resolved.namespace = Some(namespace.clone()),
                ListOption::MatchingLabels(labels) => resolved
                    .labels
                    .extend(labels.iter().map(|(k, v)| (k.clone(), v.clone()))),
                ListOption::Limit(limit) => resolved.limit = Some(*limit),
            }
        }
        resolved
    }

    pub fn matches(&self, meta: &ObjectMeta) -> bool {
        if let Some(namespace) = &self.namespace {
            if !namespace.is_empty() && *namespace != meta.namespace {
                return false;
            }
        }
        self.labels
            .iter()
            .all(|(key, value)| meta.labels.get(key) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_fold() {
        let options = vec![
            ListOption::in_namespace("a"),
            ListOption::matching_labels([("app", "web")]),
            ListOption::in_namespace("b"),
            ListOption::matching_labels([("tier", "front")]),
            ListOption::Limit(3),
        ];
        let resolved = ListOptions::from_options(&options);

        assert_eq!(resolved.namespace.as_deref(), Some("b"));
        assert_eq!(resolved.labels.len(), 2);
        assert_eq!(resolved.limit, Some(3));
    }

    #[test]
    fn test_list_options_match() {
        let meta = ObjectMeta::new("cm", "default").with_label("app", "web");

        let by_namespace = ListOptions::from_options(&[ListOption::in_namespace("default")]);
        assert!(by_namespace.matches(&meta));

        let other_namespace = ListOptions::from_options(&[ListOption::in_namespace("kube-system")]);
        assert!(!other_namespace.matches(&meta));

        let by_label = ListOptions::from_options(&[ListOption::matching_labels([("app", "db")])]);
        assert!(!by_label.matches(&meta));

        assert!(ListOptions::default().matches(&meta));
    }

    #[test]
    fn test_preconditions() {
        let mut meta = ObjectMeta::new("cm", "default");
        meta.uid = "u-1".to_string();
        meta.resource_version = "4".to_string();

        let ok = Preconditions {
            uid: Some("u-1".to_string()),
            resource_version: None,
        };
        assert_eq!(ok.violation(&meta), None);

        let stale = Preconditions {
            uid: None,
            resource_version: Some("3".to_string()),
        };
        assert_eq!(stale.violation(&meta), Some("resourceVersion"));
    }
}
