mod config;
mod dump;

use anyhow::Context;
use clap::Parser;
use config::DumpConfig;
use dump::Dumper;
use std::path::PathBuf;
use tracing::info;
use trowel_protocol_core::{Direction, ProtocolAdapter, ProtocolState};
use trowel_protocol_v1_21::V1_21Adapter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode a capture of framed Minecraft 1.21 packets", long_about = None)]
struct Args {
    /// File of varint-length-prefixed packets, uncompressed and unencrypted
    input: PathBuf,
    /// Which way the captured packets travel (serverbound or clientbound)
    #[arg(short, long, default_value = "clientbound")]
    direction: Direction,
    /// Connection state at the start of the capture
    #[arg(short, long, default_value = "handshaking")]
    state: ProtocolState,
    /// TOML file with decode limits and dump options
    #[arg(short, long, default_value = "config/dump.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = DumpConfig::load(&args.config)?;

    let adapter = V1_21Adapter::new();
    let factory = adapter.factory(args.direction, config.limits)?;
    info!(
        "Protocol {}, {:?}, {} packet kinds registered",
        adapter.protocol_version(),
        args.direction,
        factory.registry().len()
    );

    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!("Read {} bytes from {}", data.len(), args.input.display());

    let mut dumper = Dumper::new(factory, args.state, config);
    let stats = dumper.run(&data)?;

    info!(
        "Done: {} decoded, {} unrecognized, {} failed, {} block entities",
        stats.decoded, stats.unrecognized, stats.failed, stats.block_entities
    );
    for (name, count) in &stats.by_name {
        info!("  {:<36} {}", name, count);
    }
    if stats.stopped_at_compression {
        info!("Stopped at SetCompression");
    }
    info!("Final state: {}", dumper.state());

    Ok(())
}
