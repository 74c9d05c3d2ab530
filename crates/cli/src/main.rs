use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use spacemap_core::colors::{classify, FileCategory};
use spacemap_core::export::{to_csv, to_json};
use spacemap_core::human::human_bytes;
use spacemap_core::model::{Node, Rect};
use spacemap_core::scanner::ScanStats;
use spacemap_core::search::filter_layout;
use spacemap_core::treemap::layout;
use spacemap_core::worker::{ScanEvent, ScanRequest, ScanWorker};

#[derive(Parser, Debug)]
#[command(name = "spacemap", about = "Disk usage treemap report generator")]
struct Args {
    /// Root directory to scan
    root: PathBuf,
    /// Maximum scan depth
    #[arg(short, long, default_value_t = 4)]
    depth: usize,
    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_symlinks: bool,
    /// Treemap viewport as WIDTHxHEIGHT
    #[arg(long, default_value = "1024x768")]
    viewport: String,
    /// Limit treemap recursion depth in the report
    #[arg(long)]
    layout_depth: Option<usize>,
    /// Restrict the tile listing to paths matching this query
    #[arg(short, long)]
    query: Option<String>,
    /// Write a JSON report
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write a CSV report
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the category color legend after the listing
    #[arg(long)]
    legend: bool,
    /// Keep rescanning at this interval in seconds
    #[arg(long)]
    watch: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let viewport = parse_viewport(&args.viewport)?;

    let (worker, events) = ScanWorker::spawn();
    worker.request(ScanRequest {
        root: args.root.clone(),
        max_depth: args.depth,
        follow_symlinks: args.follow_symlinks,
    });

    match args.watch {
        Some(secs) => watch_loop(&args, viewport, &worker, &events, Duration::from_secs(secs)),
        None => match events.recv()? {
            ScanEvent::Completed { tree, stats, .. } => report(&args, viewport, &tree, &stats),
            ScanEvent::Failed { error, .. } => Err(error.into()),
        },
    }
}

/// Timer-driven rescan loop: every tick enqueues a refresh unless the queue
/// is backlogged; completions are reported only when the tree changed.
fn watch_loop(
    args: &Args,
    viewport: Rect,
    worker: &ScanWorker,
    events: &crossbeam_channel::Receiver<ScanEvent>,
    interval: Duration,
) -> Result<(), Box<dyn Error>> {
    let ticker = crossbeam_channel::tick(interval);
    let mut last_fingerprint = None;
    loop {
        crossbeam_channel::select! {
            recv(events) -> event => match event? {
                ScanEvent::Completed { tree, stats, fingerprint, .. } => {
                    if last_fingerprint == Some(fingerprint) {
                        tracing::debug!("tree unchanged, skipping report");
                    } else {
                        last_fingerprint = Some(fingerprint);
                        report(args, viewport, &tree, &stats)?;
                    }
                }
                ScanEvent::Failed { error, .. } => {
                    tracing::warn!(%error, "rescan failed");
                }
            },
            recv(ticker) -> _ => {
                let accepted = worker.request_refresh(ScanRequest {
                    root: args.root.clone(),
                    max_depth: args.depth,
                    follow_symlinks: args.follow_symlinks,
                });
                if !accepted {
                    tracing::debug!(pending = worker.pending(), "scan queue backlogged, refresh dropped");
                }
            }
        }
    }
}

fn report(args: &Args, viewport: Rect, tree: &Node, stats: &ScanStats) -> Result<(), Box<dyn Error>> {
    println!(
        "{}  {} ({} files, {} dirs)",
        tree.path.display(),
        human_bytes(tree.size),
        stats.files_scanned,
        stats.dirs_scanned,
    );
    if !stats.permission_denied.is_empty() {
        println!("  {} paths denied", stats.permission_denied.len());
    }
    if !stats.errors.is_empty() {
        println!("  {} paths errored", stats.errors.len());
    }

    let tiles = layout(tree, viewport, args.layout_depth);
    let tiles = match &args.query {
        Some(q) => filter_layout(&tiles, q),
        None => tiles,
    };
    for tile in &tiles {
        let category = classify(&tile.node.path, tile.node.is_dir);
        println!(
            "{:indent$}{}  {}  [{}]  {:.0}x{:.0} at ({:.0}, {:.0})",
            "",
            tile.node.name(),
            human_bytes(tile.node.size),
            category.label(),
            tile.rect.width,
            tile.rect.height,
            tile.rect.x,
            tile.rect.y,
            indent = tile.depth * 2,
        );
    }

    if args.legend {
        println!();
        for category in FileCategory::ALL {
            println!("{:>9}  {}", category.label(), category.color());
        }
    }

    if let Some(path) = &args.json {
        let value = to_json(tree, stats);
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    }
    if let Some(path) = &args.csv {
        let file = BufWriter::new(File::create(path)?);
        to_csv(tree, file)?;
    }
    Ok(())
}

fn parse_viewport(raw: &str) -> Result<Rect, Box<dyn Error>> {
    let (w, h) = raw
        .split_once('x')
        .ok_or("viewport must be WIDTHxHEIGHT, e.g. 1024x768")?;
    let width: f64 = w.parse()?;
    let height: f64 = h.parse()?;
    if width <= 0.0 || height <= 0.0 {
        return Err("viewport dimensions must be positive".into());
    }
    Ok(Rect::new(0.0, 0.0, width, height))
}
