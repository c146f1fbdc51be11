//! The closed set of registered backends behind one type.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use super::local::{FileStream, LocalBackend, LocalEntries, LocalEntry};
use super::{Backend, ByteStream};
use crate::error::Result;
use crate::registry;
use crate::uri::Uri;

/// A backend chosen by protocol at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyBackend {
    Local(LocalBackend),
}

impl AnyBackend {
    pub fn protocol(&self) -> &'static str {
        match self {
            AnyBackend::Local(_) => "file",
        }
    }
}

impl Backend for AnyBackend {
    type Entry = AnyEntry;
    type Stream = AnyStream;
    type Entries = AnyEntries;

    /// Dispatch on `uri.protocol` through the registry table.
    fn from_uri(uri: &Uri) -> Result<Self> {
        registry::build(uri)
    }

    fn list(&self) -> AnyEntries {
        match self {
            AnyBackend::Local(backend) => AnyEntries::Local(backend.list()),
        }
    }

    fn fetch(&self, entry: &AnyEntry) -> Result<AnyStream> {
        match (self, entry) {
            (AnyBackend::Local(backend), AnyEntry::Local(entry)) => {
                backend.fetch(entry).map(AnyStream::Local)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnyEntry {
    Local(LocalEntry),
}

impl AnyEntry {
    /// Last component of the entry's location.
    pub fn name(&self) -> String {
        match self {
            AnyEntry::Local(entry) => entry.file_name(),
        }
    }

    /// Filesystem path of the entry, for backends that have one.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            AnyEntry::Local(entry) => Some(entry.path()),
        }
    }
}

impl fmt::Display for AnyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyEntry::Local(entry) => fmt::Display::fmt(entry, f),
        }
    }
}

pub enum AnyEntries {
    Local(LocalEntries),
}

impl Iterator for AnyEntries {
    type Item = Result<AnyEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            AnyEntries::Local(entries) => entries.next().map(|r| r.map(AnyEntry::Local)),
        }
    }
}

#[derive(Debug)]
pub enum AnyStream {
    Local(FileStream),
}

impl Read for AnyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            AnyStream::Local(stream) => stream.read(buf),
        }
    }
}

impl Seek for AnyStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            AnyStream::Local(stream) => stream.seek(pos),
        }
    }
}

impl ByteStream for AnyStream {
    fn len(&self) -> u64 {
        match self {
            AnyStream::Local(stream) => stream.len(),
        }
    }
}
