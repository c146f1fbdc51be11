//! Protocol to backend dispatch.
//!
//! The table below is the complete set of supported protocols. Supporting a
//! new storage technology means adding an `AnyBackend` variant and a row here.

use std::sync::LazyLock;

use tracing::debug;

use crate::backend::Backend;
use crate::backend::any::AnyBackend;
use crate::backend::local::LocalBackend;
use crate::error::{Error, Result};
use crate::uri::Uri;

type Constructor = fn(&Uri) -> Result<AnyBackend>;

struct Registration {
    protocol: &'static str,
    build: Constructor,
}

const REGISTRY: &[Registration] = &[Registration {
    protocol: "file",
    build: build_local,
}];

static SUPPORTED_PROTOCOLS: LazyLock<Vec<String>> = LazyLock::new(|| {
    REGISTRY
        .iter()
        .map(|r| format!("{}://", r.protocol))
        .collect()
});

fn build_local(uri: &Uri) -> Result<AnyBackend> {
    LocalBackend::from_uri(uri).map(AnyBackend::Local)
}

/// Supported protocols in table order, rendered as `<protocol>://`.
///
/// For display only.
pub fn supported_protocols() -> &'static [String] {
    &SUPPORTED_PROTOCOLS
}

pub(crate) fn build(uri: &Uri) -> Result<AnyBackend> {
    // Exact, case-sensitive match.
    let registration = REGISTRY
        .iter()
        .find(|r| r.protocol == uri.protocol)
        .ok_or_else(|| Error::UnsupportedBackend {
            protocol: uri.protocol.clone(),
            supported: supported_protocols().to_vec(),
        })?;
    debug!(protocol = registration.protocol, path = %uri.path, "building backend");
    (registration.build)(uri)
}

/// Parse `raw` and construct the backend registered for its protocol.
pub fn resolve(raw: &str) -> Result<AnyBackend> {
    let uri = Uri::parse(raw)?;
    AnyBackend::from_uri(&uri)
}
