use std::io;

use anyhow::Result;
use clap::Args;
use indicatif::ProgressBar;
use tracing::debug;

use receipt2tx_core::{AnyBackend, Backend, resolve};

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct DigestArgs {
    /// Source URIs in the form <protocol>://<path>
    uris: Vec<String>,
}

pub async fn run(args: DigestArgs, config: &AppConfig) -> Result<()> {
    let uris = config.sources_with(args.uris);
    tokio::task::spawn_blocking(move || digest_all(&uris)).await?
}

fn digest_all(uris: &[String]) -> Result<()> {
    let mut failed = 0;
    for uri in uris {
        if let Err(err) = digest_source(uri) {
            eprintln!("{uri}: {err}");
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} sources could not be hashed", uris.len());
    }
    Ok(())
}

fn digest_source(uri: &str) -> receipt2tx_core::Result<()> {
    let backend = resolve(uri)?;
    let count = progress::with_spinner(&format!("Hashing receipts in {uri}"), |spinner| {
        digest_entries(&backend, spinner)
    })?;
    debug!(uri = %uri, files = count, "hashed source");
    Ok(())
}

fn digest_entries(backend: &AnyBackend, spinner: &ProgressBar) -> receipt2tx_core::Result<u64> {
    let mut count = 0u64;
    for entry in backend.list() {
        let entry = entry?;
        spinner.set_message(format!("Hashing {}", entry.name()));
        let hash = backend.with_stream(&entry, |stream| {
            let mut hasher = blake3::Hasher::new();
            io::copy(stream, &mut hasher)?;
            Ok(hasher.finalize())
        })?;
        spinner.suspend(|| println!("{}  {entry}", hash.to_hex()));
        count += 1;
    }
    Ok(count)
}
