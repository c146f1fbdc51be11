pub mod backends;
pub mod digest;
pub mod fetch;
pub mod list;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// List the files available at one or more sources
    List(list::ListArgs),
    /// Stream one file from a source to stdout or a local path
    Fetch(fetch::FetchArgs),
    /// Print the BLAKE3 digest of every file at one or more sources
    Digest(digest::DigestArgs),
    /// Show the supported URI protocols
    Backends,
}

/// Human-readable size with binary units, one decimal above bytes.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
