//! Change detection
//!
//! A document's fingerprint is the SHA-256 of its canonical JSON form with
//! `system.collected_at` removed. Canonical means object keys sorted and array
//! elements sorted by their own canonical encoding, so two runs that observe
//! the same facts in a different order produce the same fingerprint.

use std::collections::BTreeMap;

use hostinv_inventory::InventoryDocument;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a document's content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a document
    ///
    /// # Errors
    /// Returns an error if the document cannot be converted to JSON.
    pub fn of(doc: &InventoryDocument) -> Result<Self, serde_json::Error> {
        let mut value = serde_json::to_value(doc)?;
        if let Some(system) = value.get_mut("system").and_then(Value::as_object_mut) {
            system.remove("collected_at");
        }

        let canonical = canonicalize(value).to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Parse a persisted fingerprint
    ///
    /// Returns `None` unless the text is exactly 64 hex digits (surrounding
    /// whitespace ignored).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let valid = text.len() == 64 && text.bytes().all(|b| b.is_ascii_hexdigit());
        valid.then(|| Self(text.to_ascii_lowercase()))
    }

    /// Return the full hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars)
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<_, _>>())
        }
        Value::Array(items) => {
            let mut items: Vec<(String, Value)> = items
                .into_iter()
                .map(|item| {
                    let item = canonicalize(item);
                    (item.to_string(), item)
                })
                .collect();
            items.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Array(items.into_iter().map(|(_, item)| item).collect())
        }
        other => other,
    }
}

/// Whether unchanged documents are still delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePolicy {
    /// Deliver only when the fingerprint differs from the last delivered one
    #[default]
    Fingerprint,
    /// Deliver on every run
    AlwaysSend,
}

/// Outcome of change detection for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDecision {
    /// No fingerprint from a previous delivery
    SendFirstRun,
    /// Content differs from the last delivery
    SendChanged,
    /// Policy or operator asked for delivery regardless of content
    SendForced,
    /// Content identical to the last delivery
    SkipUnchanged,
}

impl ChangeDecision {
    /// Whether this run proceeds to persistence and delivery
    pub fn should_send(self) -> bool {
        !matches!(self, Self::SkipUnchanged)
    }
}

impl std::fmt::Display for ChangeDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendFirstRun => write!(f, "first run"),
            Self::SendChanged => write!(f, "inventory changed"),
            Self::SendForced => write!(f, "always send"),
            Self::SkipUnchanged => write!(f, "unchanged"),
        }
    }
}

/// Compare a new fingerprint against the previous one
pub fn decide(new: &Fingerprint, previous: Option<&Fingerprint>) -> ChangeDecision {
    match previous {
        None => ChangeDecision::SendFirstRun,
        Some(previous) if previous == new => ChangeDecision::SkipUnchanged,
        Some(_) => ChangeDecision::SendChanged,
    }
}

/// Apply `policy` on top of [`decide`]
pub fn decide_with_policy(
    policy: ChangePolicy,
    new: &Fingerprint,
    previous: Option<&Fingerprint>,
) -> ChangeDecision {
    match policy {
        ChangePolicy::AlwaysSend => ChangeDecision::SendForced,
        ChangePolicy::Fingerprint => decide(new, previous),
    }
}
