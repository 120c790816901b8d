//! Intercepted Operations
//!
//! The closed set of client calls an override can target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of client call being intercepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
    /// Merge patch against the stored object
    Patch,
    /// Read one object by key
    Get,
    /// Read every object of a list's item kind
    List,
    /// Delete every object of a kind matching a selector
    DeleteAllOf,
}

/// Returned when parsing an unknown operation name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation: {0}")]
pub struct ParseOperationError(pub String);

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Patch,
        Operation::Get,
        Operation::List,
        Operation::DeleteAllOf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Patch => "patch",
            Operation::Get => "get",
            Operation::List => "list",
            Operation::DeleteAllOf => "delete_all_of",
        }
    }

    /// Returns true if the call fills an output object, so an override may
    /// inject a result instead of an error
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::Get | Operation::List)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseOperationError(s.to_string()))
    }
}
