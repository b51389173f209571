//! hostinv-client: Inventory delivery
//!
//! Sends an [`InventoryDocument`](hostinv_inventory::InventoryDocument) to the
//! collection endpoint as a multipart form, with a hard ceiling on the whole
//! transfer and no retries.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use hostinv_client::{DeliveryClient, DeliverySettings, HttpTransport};
//!
//! # async fn example(doc: hostinv_inventory::InventoryDocument) -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("https://inventory.example.com/api", Duration::from_secs(35))?;
//! let settings = DeliverySettings::new("secret-token", "server-42");
//! let client = DeliveryClient::new(Arc::new(transport), settings);
//!
//! let outcome = client.deliver(&doc).await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod payload;
pub mod transport;

pub use client::{DEFAULT_DELIVERY_TIMEOUT, DeliveryClient, DeliveryOutcome, DeliverySettings};
pub use error::{DeliveryError, Result};
pub use http::HttpTransport;
pub use payload::{FormFields, PackageTuple, PayloadShape};
pub use transport::{FormSubmission, Transport, TransportResponse};
