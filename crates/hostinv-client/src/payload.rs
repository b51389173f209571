//! Payload shapes and form field names

use hostinv_inventory::InventoryDocument;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What goes into the data field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// The whole document as JSON
    #[default]
    FullDocument,
    /// System packages only, as positional tuples
    PackageTuples,
}

impl std::fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullDocument => write!(f, "full_document"),
            Self::PackageTuples => write!(f, "package_tuples"),
        }
    }
}

/// One system package in the reduced payload
///
/// The collection endpoint keys columns by number: 77 is the package name,
/// 78 the version and 79 the reporting server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTuple {
    /// Package name
    #[serde(rename = "77")]
    pub name: String,
    /// Installed version
    #[serde(rename = "78")]
    pub version: String,
    /// Reporting server
    #[serde(rename = "79")]
    pub server_id: String,
}

impl PayloadShape {
    /// Encode the data field for `doc`
    ///
    /// Returns `None` when there is nothing to send, which only happens for
    /// the tuple shape on a host without system packages.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn encode(self, doc: &InventoryDocument, server_id: &str) -> Result<Option<String>> {
        match self {
            Self::FullDocument => Ok(Some(serde_json::to_string(doc)?)),
            Self::PackageTuples => {
                let tuples = package_tuples(doc, server_id);
                if tuples.is_empty() {
                    return Ok(None);
                }
                Ok(Some(serde_json::to_string(&tuples)?))
            }
        }
    }
}

/// Reduce a document to its system package tuples, in document order
pub fn package_tuples(doc: &InventoryDocument, server_id: &str) -> Vec<PackageTuple> {
    doc.system_packages()
        .map(|pkg| PackageTuple {
            name: pkg.name.clone(),
            version: pkg.version.clone(),
            server_id: server_id.to_string(),
        })
        .collect()
}

/// Names of the multipart form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    /// Field carrying the trigger name
    pub trigger_field: String,
    /// Trigger name the endpoint dispatches on
    pub trigger: String,
    /// Field carrying the payload
    pub data_field: String,
    /// Field carrying the access token
    pub token_field: String,
    /// Field carrying the server identifier
    pub server_id_field: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            trigger_field: "RStrigger".to_string(),
            trigger: "newServerData".to_string(),
            data_field: "RSdata".to_string(),
            token_field: "RStoken".to_string(),
            server_id_field: "RSserverID".to_string(),
        }
    }
}
