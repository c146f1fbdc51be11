//! Storage backends.
//!
//! A backend is bound to one storage root. It enumerates the files under that
//! root and hands out readable streams for them. Entries are only meaningful
//! to the backend that listed them.

pub mod any;
pub mod local;

use std::fmt;
use std::io::{self, Read, Seek};

use crate::error::{Error, Result};
use crate::uri::Uri;

/// A readable, seekable byte stream of known length.
///
/// Dropping the stream releases the underlying handle.
pub trait ByteStream: Read + Seek {
    /// Total length in bytes, independent of the current position.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }
}

pub trait Backend: Sized {
    /// Backend-scoped identifier of one listed item.
    type Entry: fmt::Display;
    type Stream: ByteStream;
    type Entries: Iterator<Item = Result<Self::Entry>>;

    /// Bind a backend to the location in `uri`.
    ///
    /// Must not touch storage; a missing location surfaces on `list` or `fetch`.
    fn from_uri(uri: &Uri) -> Result<Self>;

    /// Lazily enumerate the files under the root. Containers are skipped.
    ///
    /// Each call starts a fresh, single-pass read of the current state.
    fn list(&self) -> Self::Entries;

    fn fetch(&self, entry: &Self::Entry) -> Result<Self::Stream>;

    /// Fetch `entry`, hand the stream to `f` and release it before returning,
    /// whether `f` succeeds or not.
    fn with_stream<T, F>(&self, entry: &Self::Entry, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self::Stream) -> io::Result<T>,
    {
        let mut stream = self.fetch(entry)?;
        f(&mut stream).map_err(|source| Error::Io {
            location: entry.to_string(),
            source,
        })
    }
}
