use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use receipt2tx_core::{Backend, ByteStream, resolve};

use super::format_bytes;
use crate::config::AppConfig;

#[derive(Args)]
pub struct ListArgs {
    /// Source URIs in the form <protocol>://<path>
    uris: Vec<String>,

    /// Fetch each file and show its size
    #[arg(long)]
    size: bool,
}

struct ListedFile {
    location: String,
    size: Option<u64>,
}

pub async fn run(args: ListArgs, config: &AppConfig) -> Result<()> {
    let uris = config.sources_with(args.uris);
    if uris.is_empty() {
        info!("No sources given");
        return Ok(());
    }

    // Each source is an independent blocking chain.
    let with_size = args.size;
    let handles: Vec<_> = uris
        .iter()
        .cloned()
        .map(|uri| tokio::task::spawn_blocking(move || list_source(&uri, with_size)))
        .collect();

    let mut failed = 0;
    for (uri, handle) in uris.iter().zip(handles) {
        match handle.await? {
            Ok(files) => {
                debug!(uri = %uri, files = files.len(), "listed source");
                for file in &files {
                    match file.size {
                        Some(size) => println!("{:>10}  {}", format_bytes(size), file.location),
                        None => println!("{}", file.location),
                    }
                }
            }
            Err(err) => {
                eprintln!("{uri}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} sources could not be listed", uris.len());
    }
    Ok(())
}

fn list_source(raw: &str, with_size: bool) -> receipt2tx_core::Result<Vec<ListedFile>> {
    let backend = resolve(raw)?;
    backend
        .list()
        .map(|entry| {
            let entry = entry?;
            let size = if with_size {
                Some(backend.fetch(&entry)?.len())
            } else {
                None
            };
            Ok(ListedFile {
                location: entry.to_string(),
                size,
            })
        })
        .collect()
}
