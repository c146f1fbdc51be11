use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use tracing::{debug, info};

use receipt2tx_core::{AnyBackend, AnyEntry, AnyStream, Backend, ByteStream, Error, resolve};

use crate::progress;

const COPY_BUF_SIZE: usize = 64 * 1024;

#[derive(Args)]
pub struct FetchArgs {
    /// Source URI in the form <protocol>://<path>
    uri: String,

    /// File name, as listed by `list`
    name: String,

    /// Write to this path instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: FetchArgs) -> Result<()> {
    tokio::task::spawn_blocking(move || fetch_blocking(&args)).await?
}

fn fetch_blocking(args: &FetchArgs) -> Result<()> {
    let backend = resolve(&args.uri)?;
    let entry = find_entry(&backend, &args.name)?
        .with_context(|| format!("no file named {} in {}", args.name, args.uri))?;

    // The source is opened before the target is touched, so a failed open
    // leaves nothing behind.
    let mut stream = backend.fetch(&entry)?;

    let copied = match &args.output {
        Some(path) => {
            if is_same_file(&entry, path) {
                anyhow::bail!(
                    "refusing to fetch {entry} onto itself ({})",
                    path.display()
                );
            }
            let mut out = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let pb = progress::create_bytes_progress(stream.len(), &entry.name());
            let sink = path.display().to_string();
            let copied = copy_stream(&mut stream, &entry, &mut out, &sink, Some(&pb))?;
            pb.finish_and_clear();
            info!(entry = %entry, target = %path.display(), bytes = copied, "Fetched receipt");
            copied
        }
        None => {
            let mut out = io::stdout().lock();
            copy_stream(&mut stream, &entry, &mut out, "stdout", None)?
        }
    };

    drop(stream);
    debug!(bytes = copied, "stream released");
    Ok(())
}

fn find_entry(backend: &AnyBackend, name: &str) -> receipt2tx_core::Result<Option<AnyEntry>> {
    for entry in backend.list() {
        let entry = entry?;
        if entry.name() == name {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// True when `target` already exists and resolves to the entry's own file.
fn is_same_file(entry: &AnyEntry, target: &Path) -> bool {
    let Some(source) = entry.local_path() else {
        return false;
    };
    match (fs::canonicalize(source), fs::canonicalize(target)) {
        (Ok(source), Ok(target)) => source == target,
        _ => false,
    }
}

/// Copy the whole stream into `out`. Read failures are reported against the
/// entry, write failures against `sink`.
fn copy_stream(
    stream: &mut AnyStream,
    entry: &AnyEntry,
    out: &mut dyn Write,
    sink: &str,
    pb: Option<&ProgressBar>,
) -> Result<u64> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut copied = 0u64;
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Io {
                    location: entry.to_string(),
                    source,
                }
                .into());
            }
        };
        out.write_all(&buf[..n])
            .with_context(|| format!("failed to write {sink}"))?;
        copied += n as u64;
        if let Some(pb) = pb {
            pb.inc(n as u64);
        }
    }
    out.flush()
        .with_context(|| format!("failed to write {sink}"))?;
    Ok(copied)
}
