//! Storage access for receipt ingestion.
//!
//! A raw `<protocol>://<path>` string is resolved to a [`Backend`] through a
//! fixed protocol table; the backend then lists its files and opens them as
//! seekable byte streams.

pub mod backend;
pub mod error;
pub mod registry;
pub mod uri;

pub use backend::any::{AnyBackend, AnyEntry, AnyStream};
pub use backend::{Backend, ByteStream};
pub use error::{Error, ErrorKind, Result};
pub use registry::{resolve, supported_protocols};
pub use uri::Uri;
