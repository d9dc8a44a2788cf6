use anyhow::Result;
use clap::Parser;
use terrarium_lib::loader;
use terrarium_lib::model::metrics::init_logging;
use terrarium_lib::model::state::WorldEvent;
use terrarium_lib::model::world::World;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.016)]
    dt: f64,

    /// Override the configured world seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the terrain as ASCII after generation and at the end
    #[arg(long)]
    map: bool,

    /// Stream world events to stdout as JSON lines
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = loader::load_or_default(&args.config)?;
    if args.seed.is_some() {
        config.world.seed = args.seed;
    }

    let mut world = World::new(config)?;
    if args.map {
        println!("{}", world.terrain.render_ascii());
    }

    let mut collections = 0usize;
    let mut deaths = 0usize;
    for _ in 0..args.ticks {
        for event in world.step(args.dt) {
            match &event {
                WorldEvent::ResourceCollected { .. } => collections += 1,
                WorldEvent::AgentDied { .. } => deaths += 1,
                _ => {}
            }
            if args.events {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        if world.alive_count() == 0 {
            tracing::info!(tick = world.tick, "No agents left alive");
            break;
        }
    }

    if args.map {
        println!("{}", world.terrain.render_ascii());
    }
    tracing::info!(
        ticks = world.tick,
        sim_time = world.time,
        alive = world.alive_count(),
        collections,
        deaths,
        resources = world.resources.count(),
        elapsed_ms = world.metrics().elapsed().as_millis() as u64,
        "Simulation finished"
    );
    Ok(())
}
