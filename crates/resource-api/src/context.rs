//! Request-scoped context.
//!
//! A [`Context`] is immutable: [`Context::with_value`] and
//! [`Context::with_deadline`] return a new context and leave the receiver as
//! it was, so a context handed to concurrent callers never changes under them.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

/// Integer key for values carried on a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey(pub i32);

impl From<i32> for ContextKey {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type ContextValue = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<ContextKey, ContextValue>>,
    deadline: Option<DateTime<Utc>>,
}

impl Context {
    /// Empty context with no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// New context carrying `value` under `key`, shadowing any previous value.
    pub fn with_value<V: Any + Send + Sync>(&self, key: ContextKey, value: V) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key, Arc::new(value));
        Self {
            values: Arc::new(values),
            deadline: self.deadline,
        }
    }

    pub fn value(&self, key: ContextKey) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(&key).map(|value| value.as_ref())
    }

    /// Value under `key` if it is present and of type `V`.
    pub fn value_as<V: Any>(&self, key: ContextKey) -> Option<&V> {
        self.value(key)?.downcast_ref::<V>()
    }

    pub fn with_deadline(&self, deadline: DateTime<Utc>) -> Self {
        Self {
            values: Arc::clone(&self.values),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Utc::now() + timeout)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|deadline| Utc::now() >= deadline)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().copied().collect();
        keys.sort();
        f.debug_struct("Context")
            .field("keys", &keys)
            .field("deadline", &self.deadline)
            .finish()
    }
}
