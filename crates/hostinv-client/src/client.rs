//! Delivery client

use std::sync::Arc;
use std::time::Duration;

use hostinv_inventory::InventoryDocument;
use tracing::{debug, info, instrument, warn};

use crate::error::{DeliveryError, Result};
use crate::payload::{FormFields, PayloadShape};
use crate::transport::{FormSubmission, Transport};

/// Ceiling on one whole delivery
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(35);

/// Identity and shape of what is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    /// Access token
    pub token: String,
    /// Identifier of this host at the endpoint
    pub server_id: String,
    /// Payload shape
    pub payload: PayloadShape,
    /// Form field names
    pub fields: FormFields,
    /// Ceiling on the whole transfer
    pub timeout: Duration,
}

impl DeliverySettings {
    /// Settings with the default payload, field names and timeout
    pub fn new(token: impl Into<String>, server_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            server_id: server_id.into(),
            payload: PayloadShape::default(),
            fields: FormFields::default(),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}

/// Successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Endpoint accepted the form
    Sent {
        /// HTTP status code
        status: u16,
        /// Size of the data field in bytes
        payload_bytes: usize,
    },
    /// Payload shape produced nothing to send; no request was made
    NothingToSend,
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent {
                status,
                payload_bytes,
            } => write!(f, "sent {payload_bytes} bytes (HTTP {status})"),
            Self::NothingToSend => write!(f, "nothing to send"),
        }
    }
}

/// Sends documents to the collection endpoint
///
/// One attempt per call. Success is a completed request with a 2xx status;
/// the response body is logged but never interpreted.
#[derive(Clone)]
pub struct DeliveryClient {
    transport: Arc<dyn Transport>,
    settings: DeliverySettings,
}

impl std::fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("endpoint", &self.transport.endpoint())
            .field("server_id", &self.settings.server_id)
            .field("payload", &self.settings.payload)
            .finish_non_exhaustive()
    }
}

impl DeliveryClient {
    /// Create a new delivery client
    pub fn new(transport: Arc<dyn Transport>, settings: DeliverySettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Endpoint documents are sent to
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Deliver one document
    ///
    /// # Errors
    /// Returns an error if the payload cannot be encoded, the transfer fails
    /// or exceeds its ceiling, or the endpoint answers with a non-2xx status.
    #[instrument(skip(self, doc), fields(endpoint = %self.endpoint(), payload = %self.settings.payload))]
    pub async fn deliver(&self, doc: &InventoryDocument) -> Result<DeliveryOutcome> {
        let Some(data) = self.settings.payload.encode(doc, &self.settings.server_id)? else {
            info!("no system packages to report, skipping request");
            return Ok(DeliveryOutcome::NothingToSend);
        };

        let payload_bytes = data.len();
        let fields = &self.settings.fields;
        let form = FormSubmission::new()
            .text(&fields.trigger_field, &fields.trigger)
            .text(&fields.data_field, data)
            .text(&fields.token_field, &self.settings.token)
            .text(&fields.server_id_field, &self.settings.server_id);

        info!(bytes = payload_bytes, "sending inventory");
        let timeout = self.settings.timeout;
        let response = match tokio::time::timeout(timeout, self.transport.post_form(form)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(?timeout, "delivery timed out");
                return Err(DeliveryError::Timeout { timeout });
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "endpoint rejected inventory");
            return Err(DeliveryError::Status {
                status: response.status,
                body: response.body,
            });
        }

        debug!(status = response.status, "delivery accepted");
        Ok(DeliveryOutcome::Sent {
            status: response.status,
            payload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use hostinv_exec::{Probe, ScriptedRunner};
    use hostinv_inventory::{AssemblerOptions, InventoryAssembler};
    use hostinv_pkg::dpkg::DPKG_QUERY;

    use super::*;
    use crate::transport::TransportResponse;

    struct MockTransport {
        status: u16,
        delay: Duration,
        forms: Mutex<Vec<FormSubmission>>,
    }

    impl MockTransport {
        fn answering(status: u16) -> Self {
            Self {
                status,
                delay: Duration::ZERO,
                forms: Mutex::new(Vec::new()),
            }
        }

        fn forms(&self) -> Vec<FormSubmission> {
            self.forms.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_form(&self, form: FormSubmission) -> Result<TransportResponse> {
            self.forms.lock().unwrap().push(form);
            tokio::time::sleep(self.delay).await;
            Ok(TransportResponse {
                status: self.status,
                body: "ok".to_string(),
            })
        }

        fn endpoint(&self) -> &str {
            "http://mock.invalid/"
        }
    }

    async fn document(dpkg_output: &str) -> InventoryDocument {
        let runner = ScriptedRunner::new()
            .with_binary("dpkg")
            .with_output(DPKG_QUERY, dpkg_output);
        InventoryAssembler::new(Probe::new(Arc::new(runner)), AssemblerOptions::default())
            .assemble()
            .await
    }

    #[tokio::test]
    async fn test_deliver_sends_all_fields() {
        let transport = Arc::new(MockTransport::answering(200));
        let client = DeliveryClient::new(transport.clone(), DeliverySettings::new("tok", "srv-1"));
        let doc = document("curl\t7.68.0\tinstall ok installed").await;

        let outcome = client.deliver(&doc).await.unwrap();

        assert!(matches!(outcome, DeliveryOutcome::Sent { status: 200, .. }));
        let forms = transport.forms();
        assert_eq!(forms.len(), 1);
        let form = &forms[0];
        assert_eq!(form.get("RStrigger"), Some("newServerData"));
        assert_eq!(form.get("RStoken"), Some("tok"));
        assert_eq!(form.get("RSserverID"), Some("srv-1"));
        let data: InventoryDocument = serde_json::from_str(form.get("RSdata").unwrap()).unwrap();
        assert_eq!(data, doc);
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let transport = Arc::new(MockTransport::answering(500));
        let client = DeliveryClient::new(transport, DeliverySettings::new("tok", "srv-1"));
        let doc = document("").await;

        let err = client.deliver(&doc).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let transport = Arc::new(MockTransport {
            delay: Duration::from_secs(5),
            ..MockTransport::answering(200)
        });
        let mut settings = DeliverySettings::new("tok", "srv-1");
        settings.timeout = Duration::from_millis(50);
        let client = DeliveryClient::new(transport, settings);
        let doc = document("").await;

        let err = client.deliver(&doc).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Timeout { .. }));
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_empty_tuples_skip_request() {
        let transport = Arc::new(MockTransport::answering(200));
        let mut settings = DeliverySettings::new("tok", "srv-1");
        settings.payload = PayloadShape::PackageTuples;
        let client = DeliveryClient::new(transport.clone(), settings);
        let doc = document("").await;

        let outcome = client.deliver(&doc).await.unwrap();

        assert_eq!(outcome, DeliveryOutcome::NothingToSend);
        assert!(transport.forms().is_empty());
    }

    #[tokio::test]
    async fn test_custom_field_names() {
        let transport = Arc::new(MockTransport::answering(201));
        let mut settings = DeliverySettings::new("tok", "srv-1");
        settings.payload = PayloadShape::PackageTuples;
        settings.fields.data_field = "payload".to_string();
        let client = DeliveryClient::new(transport.clone(), settings);
        let doc = document("curl\t7.68.0\tinstall ok installed").await;

        client.deliver(&doc).await.unwrap();

        let forms = transport.forms();
        assert_eq!(
            forms[0].get("payload"),
            Some(r#"[{"77":"curl","78":"7.68.0","79":"srv-1"}]"#)
        );
    }
}
