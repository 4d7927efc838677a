//! Bulk interchange document for backup and restore.
//!
//! # Responsibility
//! - Define the `{projects, users, version, exportedAt}` JSON document.
//! - Decode untrusted import payloads into typed collections.
//!
//! # Invariants
//! - Decoding never mutates state; callers replace registries only on `Ok`.
//! - Legacy project records inside an import are upgraded like stored ones.

use crate::model::project::Project;
use crate::model::record::{upgrade_all, ProjectRecord};
use crate::model::user::User;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Interchange format version written by this build.
pub const TRANSFER_FORMAT_VERSION: u32 = 1;

/// Full dashboard backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBundle {
    pub projects: Vec<Project>,
    pub users: Vec<User>,
    pub version: u32,
    /// Unix epoch milliseconds.
    pub exported_at: i64,
}

impl TransferBundle {
    pub fn new(projects: Vec<Project>, users: Vec<User>, exported_at: i64) -> Self {
        Self {
            projects,
            users,
            version: TRANSFER_FORMAT_VERSION,
            exported_at,
        }
    }
}

/// Rejection reasons for an import payload.
#[derive(Debug)]
pub enum ImportError {
    /// Payload is not valid JSON.
    Parse(serde_json::Error),
    /// Top-level value is not a JSON object.
    NotAnObject,
    /// Required collection is absent.
    MissingCollection(&'static str),
    /// Required collection is present but not an array.
    NotASequence(&'static str),
    /// One record inside a collection does not match its schema.
    MalformedRecord {
        collection: &'static str,
        index: usize,
        source: serde_json::Error,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "import payload is not valid JSON: {err}"),
            Self::NotAnObject => write!(f, "import payload must be a JSON object"),
            Self::MissingCollection(name) => write!(f, "import payload is missing `{name}`"),
            Self::NotASequence(name) => write!(f, "import field `{name}` must be an array"),
            Self::MalformedRecord {
                collection,
                index,
                source,
            } => write!(f, "malformed record {collection}[{index}]: {source}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MalformedRecord { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Typed collections decoded from an import payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImport {
    pub projects: Vec<Project>,
    pub users: Vec<User>,
    /// Number of legacy project records upgraded during decoding.
    pub upgraded_projects: usize,
}

/// Decodes an import payload from JSON text.
pub fn decode_import(text: &str) -> Result<DecodedImport, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::Parse)?;
    decode_import_value(&value)
}

/// Decodes an already-parsed import payload.
///
/// `version` and `exportedAt` are informational and not checked.
pub fn decode_import_value(value: &Value) -> Result<DecodedImport, ImportError> {
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;
    let raw_projects = sequence(object.get("projects"), "projects")?;
    let raw_users = sequence(object.get("users"), "users")?;

    let records = decode_records::<ProjectRecord>(raw_projects, "projects")?;
    let users = decode_records::<User>(raw_users, "users")?;
    let (projects, upgraded_projects) = upgrade_all(records);

    Ok(DecodedImport {
        projects,
        users,
        upgraded_projects,
    })
}

fn sequence<'a>(
    value: Option<&'a Value>,
    name: &'static str,
) -> Result<&'a Vec<Value>, ImportError> {
    match value {
        None => Err(ImportError::MissingCollection(name)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ImportError::NotASequence(name)),
    }
}

fn decode_records<T: serde::de::DeserializeOwned>(
    items: &[Value],
    collection: &'static str,
) -> Result<Vec<T>, ImportError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).map_err(|source| ImportError::MalformedRecord {
                collection,
                index,
                source,
            })
        })
        .collect()
}
