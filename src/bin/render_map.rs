//! Render a vacuum map file to PNG
//!
//! Run with: cargo run --bin rrmap-render -- map.bin [-o map.png] [--json]

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rrmap::{MapRenderer, RenderConfig};

#[derive(Parser)]
#[command(name = "rrmap-render")]
#[command(about = "Decode a robot vacuum map file and render it as PNG")]
struct Args {
    /// Raw or gzip-compressed map file
    input: PathBuf,

    /// Output PNG path, defaults to the input path with a .png extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON render config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the decoded map as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RenderConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => RenderConfig::default(),
    };
    let renderer = MapRenderer::new(&config)?;

    let data = std::fs::read(&args.input)?;
    let map = rrmap::parse_map_file(&data)?;
    info!("{}", map);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&map)?);
    }

    let output = args.output.unwrap_or_else(|| args.input.with_extension("png"));
    let png = renderer.render_png(&map)?;
    std::fs::write(&output, &png)?;
    info!(path = %output.display(), bytes = png.len(), "png written");

    Ok(())
}
