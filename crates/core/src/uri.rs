use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const DELIMITER: &str = "://";

/// A parsed `<protocol>://<path>` location.
///
/// The path is kept verbatim; backends decide what it means.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    pub protocol: String,
    pub path: String,
}

impl Uri {
    /// Split `raw` at the first `://`.
    ///
    /// An empty protocol is accepted here and rejected later by the registry.
    pub fn parse(raw: &str) -> Result<Self> {
        let (protocol, path) = raw
            .split_once(DELIMITER)
            .ok_or_else(|| Error::MalformedUri {
                raw: raw.to_string(),
            })?;
        Ok(Self {
            protocol: protocol.to_string(),
            path: path.to_string(),
        })
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}{}", self.protocol, self.path)
    }
}
