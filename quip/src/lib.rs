//! # Quip API Client
//!
//! Client library for the Quip platform REST API.
//!
//! Typical usage:
//!
//! ```rust,no_run
//! use quip::{QuipApi, QuipClient};
//!
//! # async fn run() -> quip::Result<()> {
//! let client = QuipClient::with_access_token("...");
//! let user = client.get_authenticated_user().await?;
//! let desktop_id = user["desktop_folder_id"].as_str().unwrap_or_default();
//! if let Some(desktop) = client.get_folder(desktop_id).await? {
//!     println!("{} items on the desktop", desktop["children"].as_array().map_or(0, Vec::len));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every method issues at most one HTTP round-trip against the configured
//! base URL and returns the parsed JSON body, or a typed error carrying the
//! failure (transport, malformed body, or non-200 API response).

pub mod api;
pub mod client;
pub mod error;
pub mod service;
pub mod websocket;

pub use api::blobs::Blob;
pub use api::folders::{FolderColor, NewFolder, UpdateFolder};
pub use api::messages::{MessageOptions, NewMessage};
pub use api::threads::{DocumentFormat, EditDocument, NewDocument, Operation, RecentThreads};
pub use client::{ApiObject, ClientConfig, QuipClient};
pub use error::{ClientError, Error, Result};
pub use service::QuipApi;
pub use websocket::QuipSocket;
