//! auto-bank CLI: build a synthesizer patch configuration from the
//! sound-bank files in the current directory.
//!
//! Each `.sf2` file is handed to an external preset parser and the results
//! are merged into `<dirname>.yaml`, with a per-file `auto_bank_run_log.txt`.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
