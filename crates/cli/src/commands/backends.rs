use anyhow::Result;

use receipt2tx_core::supported_protocols;

pub fn run() -> Result<()> {
    for protocol in supported_protocols() {
        println!("{protocol}");
    }
    Ok(())
}
