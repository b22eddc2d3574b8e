use clap::Parser;
use delivery_worldgen::{build_world, WorldConfig};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a world config file (.toml, .yaml or .yml)
    #[arg(short, long, default_value = "./world.toml")]
    config: String,

    /// Override the configured world seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the generated world as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override log level (trace|debug|info|warn|error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = args.log_level.as_deref().unwrap_or("info");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    info!("Starting delivery world generator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = WorldConfig::load_or_default(&args.config);
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    info!("Configuration loaded from: {}", args.config);
    info!("Seed: {}", config.seed);
    info!("World size: {} ({}x{} grid)", config.size, config.resolution, config.resolution);

    let world = build_world(&config)?;

    let stats = world.stats();
    info!("Heights: {:.2}..{:.2}", stats.min_height, stats.max_height);
    info!("Districts:");
    for district in world.districts() {
        info!(
            "  - {} ({}) at ({:.1}, {:.1})",
            district.id,
            district.params().label,
            district.center.x,
            district.center.z
        );
    }
    info!(
        "Road network: {} locations, {} nodes, {} paths",
        stats.locations, stats.nodes, stats.connections
    );
    info!(
        "Objects: {} trees, {} rocks, {} plants, {} decorations",
        stats.trees, stats.rocks, stats.plants, stats.decorations
    );

    if let Some(path) = args.output {
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, &world.export())?;
        info!("World written to {}", path.display());
    }

    Ok(())
}
