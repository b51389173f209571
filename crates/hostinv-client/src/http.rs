//! Multipart HTTP transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::Form;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{DeliveryError, Result};
use crate::transport::{FormSubmission, Transport, TransportResponse};

/// HTTP transport posting multipart forms with reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for `endpoint`
    ///
    /// `timeout` bounds each request end to end, connect included.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid http(s) URL or the
    /// client cannot be built.
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("hostinv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(endpoint, client)
    }

    /// Create a transport with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid http(s) URL.
    pub fn with_client(endpoint: impl AsRef<str>, client: Client) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        match endpoint.scheme() {
            "http" | "https" => Ok(Self { client, endpoint }),
            other => Err(DeliveryError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, form), fields(endpoint = %self.endpoint))]
    async fn post_form(&self, form: FormSubmission) -> Result<TransportResponse> {
        let bytes = form.payload_bytes();
        let multipart = form
            .fields()
            .iter()
            .fold(Form::new(), |multipart, (name, value)| {
                multipart.text(name.clone(), value.clone())
            });

        debug!(bytes, "posting form");
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(multipart)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!(status, body = %body, "endpoint responded");

        Ok(TransportResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}
