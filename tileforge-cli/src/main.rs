//! tileforge CLI - render a Web Mercator tile pyramid from the command line.
//!
//! Renders every tile of the requested bounding box and zoom range into a
//! `tiles/` directory next to the style file, then writes the
//! `metadata.json` the packaging step expects. Building the archive itself
//! is left to an external importer; this binary prepares everything it
//! needs and refuses to run against an already-existing archive.

mod error;

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tileforge::container::{
    ensure_archive_absent, ContainerMetadata, ContainerPackager, NoopPackager,
};
use tileforge::coord::{BoundingBox, MAX_ZOOM, MIN_ZOOM};
use tileforge::pipeline::{
    run_pipeline, CancelToken, PipelineConfig, DEFAULT_TILE_SIZE, DEFAULT_WORKERS,
};
use tileforge::render::{EngineBundle, FlatColorEngine, LonLatToWebMercator, TileFormat};

use error::CliError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImageFormat {
    /// JPEG (lossy, no alpha)
    Jpg,
    /// PNG with default encoder settings
    Png,
    /// 8-bit palette PNG
    Png8,
    /// 24-bit RGB PNG
    Png24,
    /// 32-bit RGBA PNG
    Png32,
    /// 256-color palette PNG
    Png256,
    /// Lossless WebP
    Webp,
}

impl ImageFormat {
    fn to_tile_format(self) -> TileFormat {
        match self {
            ImageFormat::Jpg => TileFormat::Jpg,
            ImageFormat::Png => TileFormat::Png,
            ImageFormat::Png8 => TileFormat::Png8,
            ImageFormat::Png24 => TileFormat::Png24,
            ImageFormat::Png32 => TileFormat::Png32,
            ImageFormat::Png256 => TileFormat::Png256,
            ImageFormat::Webp => TileFormat::Webp,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TileScheme {
    /// Origin at the top-left (slippy-map convention)
    Xyz,
    /// Origin at the bottom-left (MBTiles convention)
    Tms,
}

impl TileScheme {
    fn as_str(self) -> &'static str {
        match self {
            TileScheme::Xyz => "xyz",
            TileScheme::Tms => "tms",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tileforge", version = tileforge::VERSION)]
#[command(about = "Render a Web Mercator tile pyramid to disk", long_about = None)]
struct Args {
    /// Style file handed to the render engine
    input: PathBuf,

    /// Destination archive path (must not already exist)
    output: PathBuf,

    /// Minimum zoom level to render
    #[arg(value_parser = clap::value_parser!(u8).range(MIN_ZOOM as i64..=MAX_ZOOM as i64))]
    min: u8,

    /// Maximum zoom level to render
    #[arg(value_parser = clap::value_parser!(u8).range(MIN_ZOOM as i64..=MAX_ZOOM as i64))]
    max: u8,

    /// Bounding box to render in degrees, clamped to the Web Mercator world
    #[arg(
        long,
        num_args = 4,
        allow_negative_numbers = true,
        value_names = ["WEST", "SOUTH", "EAST", "NORTH"]
    )]
    bbox: Option<Vec<f64>>,

    /// Number of render workers to spawn
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    threads: usize,

    /// Name tag attached to every render request
    #[arg(long, default_value = "unknown")]
    name: String,

    /// Tile edge length in pixels
    #[arg(long, value_parser = parse_tile_size, default_value_t = DEFAULT_TILE_SIZE)]
    size: u32,

    /// Image format of the rendered tiles
    #[arg(long, value_enum, default_value = "png")]
    format: ImageFormat,

    /// Tiling scheme recorded for the packaging step
    #[arg(long, value_enum, default_value = "tms")]
    scheme: TileScheme,

    /// Disable archive compression during packaging
    #[arg(long = "no-compression")]
    no_compression: bool,

    /// Enable debug logging and per-tile diagnostics
    #[arg(long)]
    verbose: bool,
}

fn parse_tile_size(s: &str) -> Result<u32, String> {
    let size: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid tile size", s))?;
    match size {
        256 | 512 | 1024 => Ok(size),
        _ => Err("tile size must be 256, 512, or 1024".to_string()),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    tileforge::logging::init(args.verbose).map_err(CliError::LoggingInit)?;

    if args.min > args.max {
        return Err(CliError::Config(format!(
            "minimum zoom {} is above maximum zoom {}",
            args.min, args.max
        )));
    }
    if !args.input.is_file() {
        return Err(CliError::Config(format!(
            "style file '{}' does not exist",
            args.input.display()
        )));
    }
    ensure_archive_absent(&args.output)?;

    let bbox = match &args.bbox {
        Some(v) => BoundingBox::new(v[0], v[1], v[2], v[3]),
        None => BoundingBox::world(),
    };
    let tile_dir = args
        .input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("tiles");
    let format = args.format.to_tile_format();

    let config = PipelineConfig::new(args.name.as_str(), &tile_dir, bbox, args.min, args.max)
        .with_threads(args.threads)
        .with_tile_size(args.size)
        .with_format(format)
        .with_diagnostics(args.verbose);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("Ctrl-C detected, exiting...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    let tile_size = args.size;
    let summary = run_pipeline(
        &config,
        |_| {
            Ok(EngineBundle {
                engine: Box::new(FlatColorEngine::new(tile_size, format)),
                transform: Box::new(LonLatToWebMercator),
            })
        },
        &cancel,
    )?;

    let archive_name = args
        .output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tiles".to_string());
    let metadata = ContainerMetadata::new(
        archive_name,
        format.extension(),
        bbox.to_string(),
        args.min,
        args.max,
    );
    metadata.write(&tile_dir)?;

    let packager = NoopPackager::new(args.scheme.as_str(), !args.no_compression);
    packager.package(&tile_dir, &args.output, &metadata)?;

    println!(
        "Rendered {} tiles ({} skipped) into {}",
        summary.rendered,
        summary.skipped,
        tile_dir.display()
    );
    println!(
        "Ready to import into {} (scheme: {}, compression: {})",
        args.output.display(),
        args.scheme.as_str(),
        if args.no_compression { "off" } else { "on" }
    );

    if summary.failed > 0 {
        return Err(CliError::RenderFailures {
            failed: summary.failed,
            enqueued: summary.enqueued,
        });
    }
    Ok(())
}
