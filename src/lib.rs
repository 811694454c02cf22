pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod peer;
pub mod signaling;
pub mod utils;

pub use config::Config;
pub use error::{DecodeError, EncodeError, HandshakeError, NegotiationError};
pub use signaling::{HandshakePhase, SignalingAdapter};

use clap::Parser;

pub fn run() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();
    logger::init(cli.log_level.as_deref()).map_err(|e| anyhow::anyhow!(e))?;

    let config = cli.net.into_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::dispatch(cli.command, config))
}
