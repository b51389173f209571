//! Transport seam between delivery and the network

use async_trait::async_trait;

use crate::error::Result;

/// Ordered text fields of one multipart form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    fields: Vec<(String, String)>,
}

impl FormSubmission {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Value of the first field called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// All fields in insertion order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Total size of all field values in bytes
    pub fn payload_bytes(&self) -> usize {
        self.fields.iter().map(|(_, value)| value.len()).sum()
    }
}

/// Raw answer from the endpoint, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can post a form to the collection endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post the form and return the raw response
    async fn post_form(&self, form: FormSubmission) -> Result<TransportResponse>;

    /// Endpoint this transport posts to
    fn endpoint(&self) -> &str;
}
