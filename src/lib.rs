//! A small blocking S3 client.
//!
//! Requests are signed with AWS Signature Version 4 when the credentials
//! carry a region, and with the legacy v2 scheme otherwise. Listing and
//! error bodies are decoded by a streaming XML reader; listings are walked
//! with a cursor-driven [`Pager`].
//!
//! ## Quick start
//!
//! ```no_run
//! # fn demo() -> Result<(), pico_s3::Error> {
//! use pico_s3::{Client, Credentials};
//!
//! let client = Client::builder("https://s3.example.com")?
//!     .credentials(Credentials::new("AKID", "secret")?.with_region("us-east-1")?)
//!     .build()?;
//!
//! client
//!     .objects()
//!     .put("my-bucket", "notes/hello.txt")
//!     .content_type("text/plain")
//!     .body_bytes("hello")
//!     .send()?;
//!
//! if let Some(obj) = client.objects().get("my-bucket", "notes/hello.txt").send()? {
//!     println!("{} bytes", obj.body.len());
//! }
//!
//! for page in client.objects().list("my-bucket").prefix("notes/").pager() {
//!     for object in page?.items {
//!         println!("{} {}", object.key, object.size);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Not found
//!
//! A `404` is not an error: `get` and `head` return `None`, `delete` and
//! `exists` return `false`, and listings (`objects().list`,
//! `objects().list_keys`, `buckets().list`) come back empty. Writes still
//! fail on a `404`. Every other non-2xx status maps to [`Error::Client`] or
//! [`Error::Server`].

#[cfg(all(
    feature = "rustls",
    feature = "native-tls",
    not(feature = "allow-both-tls")
))]
compile_error!("Enable only one of: rustls, native-tls.");

/// Service entry points and request builders.
pub mod api;
pub mod clock;
/// Percent-encoding, digests and HMACs used by the signers.
pub mod encoding;
pub mod pagination;
pub mod signing;
pub mod transport;
/// Shared request/response types.
pub mod types;
pub mod xml;

mod auth;
mod client;
mod error;
mod util;

pub use auth::{Credentials, Region, SignatureVersion};
pub use client::{Client, ClientBuilder};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use pagination::{Page, Pager};
pub use transport::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    CannedAcl, CopyObjectOutput, GetObjectOutput, ObjectMetadata, PutObjectOutput,
};
