//! Replays a recorded pointer trace against an in-memory board and prints
//! each gesture outcome with the commands it issued.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use pix_carousel::{Board, CarouselConfig, CarouselId, Collaborators, DragOutcome};
use pix_core::ItemStore;
use pix_core::sync::{MemoryRemote, SyncEngine};
use pix_model::{DEFAULT_COLLECTION, Item, ItemId, Record, UserId, View};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "pix-replay", about = "Replay a pointer trace against pix carousels")]
struct Cli {
    /// Trace file (JSON)
    trace: PathBuf,
    /// Carousel config (TOML or JSON); defaults otherwise
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print outcomes only, without the issued commands
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Deserialize)]
struct Trace {
    user: String,
    #[serde(default = "default_viewport")]
    viewport: f32,
    #[serde(default)]
    items: Vec<Item>,
    carousels: Vec<TraceCarousel>,
    events: Vec<TraceEvent>,
}

fn default_viewport() -> f32 {
    800.0
}

#[derive(Debug, Deserialize)]
struct TraceCarousel {
    path: String,
    /// Ids of the user's saved view for `path`, if any.
    #[serde(default)]
    view: Option<Vec<ItemId>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TraceEvent {
    Down { carousel: usize, x: f32, y: f32, t: u64 },
    Move { x: f32, y: f32, over: Option<usize>, t: u64 },
    Up { x: f32, over: Option<usize>, t: u64 },
    Frame { t: u64 },
    Cancel,
}

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("pix_carousel", LevelFilter::Debug)
        .filter_module("pix_core", LevelFilter::Debug)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<CarouselConfig> {
    match path {
        Some(path) => CarouselConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => CarouselConfig::load_from_env().context("loading config from env"),
    }
}

fn seed(remote: &MemoryRemote, trace: &Trace) {
    let user = UserId::new(trace.user.clone());
    remote.seed(
        DEFAULT_COLLECTION,
        trace.items.iter().cloned().map(Record::from),
    );
    let views = trace.carousels.iter().filter_map(|carousel| {
        let items = carousel.view.clone()?;
        Some(Record::from(View::private(carousel.path.clone(), user.clone(), items)))
    });
    remote.seed(DEFAULT_COLLECTION, views);
}

fn print_commands(remote: &MemoryRemote, quiet: bool) -> Result<()> {
    let commands = remote.take_commands();
    if quiet {
        return Ok(());
    }
    for command in commands {
        println!("  -> {}", serde_json::to_string(&command)?);
    }
    Ok(())
}

fn describe(outcome: &DragOutcome) -> String {
    match outcome {
        DragOutcome::Tapped(action) => format!("tapped: {action:?}"),
        DragOutcome::Removed(id) => format!("removed {id}"),
        DragOutcome::Transferred { from, to } => format!("transferred {from} -> {to}"),
        other => format!("{other:?}").to_lowercase(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let raw = fs::read_to_string(&cli.trace)
        .with_context(|| format!("reading trace {}", cli.trace.display()))?;
    let trace: Trace = serde_json::from_str(&raw)
        .with_context(|| format!("parsing trace {}", cli.trace.display()))?;
    if trace.carousels.is_empty() {
        bail!("trace has no carousels");
    }

    let remote = Arc::new(MemoryRemote::new());
    seed(&remote, &trace);
    let engine = Arc::new(SyncEngine::new(remote.clone()));
    engine.establish_session();

    let mut board = Board::new(
        config,
        engine,
        ItemStore::new(),
        Collaborators::offline(),
        UserId::new(trace.user.clone()),
    );
    let mut ids: Vec<CarouselId> = Vec::new();
    for carousel in &trace.carousels {
        let id = board.add_carousel();
        let task = board.with_carousel(id, |c| {
            c.set_viewport(trace.viewport);
            c.load_view(&carousel.path, None)
        });
        board.settle(task).await;
        ids.push(id);
    }
    for id in &ids {
        if let Some(carousel) = board.carousel(*id) {
            println!("{id} {}: {:?}", carousel.path(), carousel.get_ids());
        }
    }
    print_commands(&remote, cli.quiet)?;

    let lookup = |index: usize| -> Result<CarouselId> {
        ids.get(index)
            .copied()
            .with_context(|| format!("trace names unknown carousel {index}"))
    };
    let start = Instant::now();
    let at = |t: u64| start + Duration::from_millis(t);

    for event in trace.events {
        match event {
            TraceEvent::Down { carousel, x, y, t } => {
                let id = lookup(carousel)?;
                if !board.pointer_down(id, x, y, at(t)) {
                    println!("down on {id} missed every thumbnail");
                }
            }
            TraceEvent::Move { x, y, over, t } => {
                let over = over.map(lookup).transpose()?;
                board.pointer_move(x, y, over, at(t));
            }
            TraceEvent::Up { x, over, t } => {
                let over = over.map(lookup).transpose()?;
                let (outcome, task) = board.pointer_up(x, over, at(t));
                println!("{}", describe(&outcome));
                board.settle(task).await;
                print_commands(&remote, cli.quiet)?;
            }
            TraceEvent::Frame { t } => {
                board.frame(at(t));
            }
            TraceEvent::Cancel => {
                board.cancel();
                println!("cancelled");
            }
        }
    }

    for id in &ids {
        if let Some(carousel) = board.carousel(*id) {
            println!("{id} {}: {:?}", carousel.path(), carousel.get_ids());
        }
    }
    Ok(())
}
