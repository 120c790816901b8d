//! Override Fixtures
//!
//! Overrides can be declared in TOML instead of code:
//!
//! ```toml
//! [[override]]
//! operation = "create"
//! kind = "ConfigMap"
//! error = { reason = "BadRequest", message = "mocked create error" }
//!
//! [[override]]
//! operation = "get"
//! kind = "Pod"
//! sub_resource = "status"
//! result = { metadata = { name = "pod" }, status = { phase = "Running" } }
//! ```
//!
//! `kind` names are resolved through a [`Scheme`]. `result_kind` names the
//! kind of `result` when it differs from `kind`.

mod load;
mod scheme;

pub use load::Fixture;
pub use scheme::Scheme;

use crate::mock::Operation;

/// Fixture errors
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid fixture document: {0}")]
    Document(String),

    #[error("override {index}: unknown operation `{name}`")]
    UnknownOperation { index: usize, name: String },

    #[error("override {index}: unknown kind `{name}`")]
    UnknownKind { index: usize, name: String },

    #[error("override {index}: invalid {kind} result: {message}")]
    InvalidResult {
        index: usize,
        kind: String,
        message: String,
    },

    #[error("override {index}: neither result nor error is set")]
    EmptyOverride { index: usize },

    #[error("override {index}: {operation} can only fail, set error instead of result")]
    ResultOnWrite { index: usize, operation: Operation },
}
