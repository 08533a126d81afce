//! Terminal cave explorer.
//!
//! Generates a level, walks a random path from the spawn (taking
//! teleporters when stepping on one) and prints what was seen.
//!
//! Run: cargo run --bin cavewalk -- --seed 7 --walk 40 -v

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use delve_core::{Grid, Point, Shade, Tile, TileKind};
use delve_rl::mapgen::{Dungeon, GenConfig, GenEvent, generate};
use delve_rl::Vision;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "cavewalk")]
#[command(about = "Generate a cave level and explore it under fog of war")]
struct Args {
    /// Random seed
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// JSON file with generator settings; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map height, overrides the config file
    #[arg(long)]
    rows: Option<i32>,

    /// Map width, overrides the config file
    #[arg(long)]
    cols: Option<i32>,

    /// Link separate caves with teleporters instead of pruning them
    #[arg(long)]
    disconnected: bool,

    /// Thin wall bands after generation
    #[arg(long)]
    smooth: bool,

    /// View radius in cardinal steps
    #[arg(short, long, default_value_t = 4)]
    radius: i32,

    /// Number of random steps to take from the spawn
    #[arg(short, long, default_value_t = 0)]
    walk: usize,

    /// Print the whole map instead of what was seen
    #[arg(long)]
    reveal: bool,

    /// Dump the generated level as JSON instead of drawing it
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    // Also installs the bridge that forwards `log` records from the library.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

fn load_config(args: &Args) -> Result<GenConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => GenConfig::default(),
    };
    if let Some(rows) = args.rows {
        cfg.rows = rows;
    }
    if let Some(cols) = args.cols {
        cfg.cols = cols;
    }
    cfg.allow_disconnected |= args.disconnected;
    cfg.edge_smoothing |= args.smooth;
    Ok(cfg)
}

/// Random walk over open tiles. Landing on a teleporter moves the walker to
/// its partner. Vision is updated after every step.
fn walk(
    grid: &mut Grid,
    vision: &mut Vision,
    rng: &mut StdRng,
    start: Point,
    steps: usize,
    radius: i32,
) -> Result<Point, Box<dyn Error>> {
    let mut pos = start;
    vision.update(grid, pos, radius)?;
    for _ in 0..steps {
        let moves: Vec<Point> = grid
            .neighbors4(pos)
            .filter(|&n| grid.get(n).is_some_and(|t| t.walkable))
            .collect();
        if moves.is_empty() {
            break;
        }
        pos = moves[rng.random_range(0..moves.len())];
        if let Some(partner) = grid.get(pos).and_then(|t| t.partner) {
            log::info!("teleported from {pos} to {partner}");
            pos = partner;
        }
        if grid.kind_at(pos) == Some(TileKind::Exit) {
            log::info!("reached the exit at {pos}");
        }
        vision.update(grid, pos, radius)?;
    }
    Ok(pos)
}

fn tile_style(t: &Tile) -> (char, Color) {
    let ch = if t.grass { '"' } else { t.kind.glyph() };
    let (r, g, b) = match t.kind {
        TileKind::Wall => (130, 130, 150),
        TileKind::Floor if t.grass => (80, 170, 70),
        TileKind::Floor => (150, 130, 100),
        TileKind::Void => (0, 0, 0),
        TileKind::Water => (60, 110, 220),
        TileKind::Teleporter => (200, 80, 220),
        TileKind::Exit => (240, 210, 80),
    };
    (ch, Color::Rgb { r, g, b })
}

fn dim(c: Color) -> Color {
    match c {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: r / 3,
            g: g / 3,
            b: b / 3,
        },
        other => other,
    }
}

fn draw(out: &mut impl Write, grid: &Grid, player: Point, reveal: bool) -> io::Result<()> {
    for y in 0..grid.rows() {
        for x in 0..grid.cols() {
            let p = Point::new(x, y);
            let Some(t) = grid.get(p) else {
                continue;
            };
            if p == player {
                queue!(
                    out,
                    SetForegroundColor(Color::Rgb {
                        r: 255,
                        g: 220,
                        b: 80
                    }),
                    Print('@')
                )?;
                continue;
            }
            let (ch, fg) = tile_style(t);
            match (t.shade(), reveal) {
                (Shade::Lit, _) => queue!(out, SetForegroundColor(fg), Print(ch))?,
                (Shade::Remembered, _) => queue!(out, SetForegroundColor(dim(fg)), Print(ch))?,
                (Shade::Hidden, true) => queue!(out, SetForegroundColor(dim(fg)), Print(ch))?,
                (Shade::Hidden, false) => queue!(out, Print(' '))?,
            }
        }
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

fn describe(e: &GenEvent) -> String {
    match e {
        GenEvent::Regenerated {
            attempt,
            open_fraction,
        } => format!("attempt {attempt} discarded ({:.1}% open)", open_fraction * 100.0),
        GenEvent::ThresholdRelaxed { attempts } => {
            format!("open-tile threshold relaxed after {attempts} attempts")
        }
        GenEvent::RegionPruned { size } => format!("pruned a cave of {size} tiles"),
        GenEvent::TeleporterPlaced(link) => format!("teleporter {} <-> {}", link.entry, link.exit),
        GenEvent::SpawnCarved { at } => format!("carved a fallback pocket at {at}"),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let cfg = load_config(args)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let Dungeon {
        mut grid,
        spawn,
        exit,
        attempts,
        events,
        teleporters,
        ..
    } = {
        let d = generate(&cfg, &mut rng)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&d)?);
            return Ok(());
        }
        d
    };

    let mut vision = Vision::new(grid.bounds());
    let player = walk(&mut grid, &mut vision, &mut rng, spawn, args.walk, args.radius)?;

    let mut out = io::stdout();
    draw(&mut out, &grid, player, args.reveal)?;
    println!(
        "seed {}: {}x{} after {attempts} attempt(s), spawn {spawn}, exit {exit}, \
         {} teleporter pair(s)",
        args.seed,
        grid.cols(),
        grid.rows(),
        teleporters.len()
    );
    let seen = grid.iter().filter(|t| t.visited).count();
    println!("explored {seen} of {} tiles", grid.len());
    for e in &events {
        println!("  {}", describe(e));
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
