//! worm-netting CLI
//!
//! Net a debt file by cycle cancellation from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Net debt.txt, spawning a worm every tick, writing cycles to solution.txt
//! worm-netting run debt.txt --output solution.txt
//!
//! # Spawn less often and print the summary as JSON
//! worm-netting run debt.txt --spawn-interval 10 --format json
//!
//! # Generate a random debt file for testing
//! worm-netting generate --nodes 100 --obligations 500 --output debt.txt
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::process;
use worm_netting::config::SchedulerConfig;
use worm_netting::core::error::Result;
use worm_netting::core::obligation::ObligationSet;
use worm_netting::graph::weighted_graph::WeightedDirectedGraph;
use worm_netting::optimization::netting::NettedCycle;
use worm_netting::report::cycle_log::{CycleLog, CycleSink};
use worm_netting::report::summary::RunSummary;
use worm_netting::simulation::stress_test::{generate_random_network, NetworkConfig};
use worm_netting::worms::scheduler::WormScheduler;

#[derive(Parser)]
#[command(name = "worm-netting", about = "Multilateral debt netting by cycle cancellation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Net a debt file (`<from> <to> <amount>` per line)
    Run(RunArgs),
    /// Generate a random debt file (for testing)
    Generate(GenerateArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Debt file to net
    debt_file: PathBuf,

    /// Ticks between worm spawn attempts
    #[arg(short, long)]
    spawn_interval: Option<u64>,

    /// Write netted cycles here, one per line
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with a full scheduler configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of concurrent worms
    #[arg(long)]
    max_agents: Option<usize>,

    /// Tick budget
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Seed for spawn-point sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Write the edges left after netting here, in the input format
    #[arg(long)]
    residual: Option<PathBuf>,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Args)]
struct GenerateArgs {
    /// Number of nodes
    #[arg(long, default_value_t = 10)]
    nodes: usize,

    /// Number of obligations
    #[arg(long, default_value_t = 30)]
    obligations: usize,

    /// Largest obligation amount
    #[arg(long, default_value_t = 1_000)]
    max_amount: u64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Cycle log that may be absent, so runs without `--output` still net.
enum Sink {
    File(CycleLog),
    Discard,
}

impl CycleSink for Sink {
    fn record(&mut self, cycle: &NettedCycle) -> Result<()> {
        match self {
            Sink::File(log) => log.record(cycle),
            Sink::Discard => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            Sink::File(log) => log.flush(),
            Sink::Discard => Ok(()),
        }
    }
}

fn scheduler_config(args: &RunArgs) -> Result<SchedulerConfig> {
    let mut config = match &args.config {
        Some(path) => SchedulerConfig::from_json_file(path)?,
        None => SchedulerConfig::default(),
    };
    if let Some(interval) = args.spawn_interval {
        config.spawn_interval = interval;
    }
    if let Some(max_agents) = args.max_agents {
        config.max_agents = max_agents;
    }
    if let Some(max_ticks) = args.max_ticks {
        config.max_ticks = max_ticks;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let config = scheduler_config(&args)?;
    let set = ObligationSet::load(&args.debt_file)?;
    let graph = WeightedDirectedGraph::from_obligations(&set)?;
    info!(
        "loaded {} obligations into {} edges between {} nodes",
        set.len(),
        graph.edge_count(),
        graph.node_count()
    );

    let sink = match &args.output {
        Some(path) => Sink::File(CycleLog::create(path)?),
        None => Sink::Discard,
    };
    let mut scheduler = WormScheduler::new(graph, config, sink)?;
    scheduler.run()?;

    let summary = scheduler.summary();
    print_summary(&summary, args.format)?;

    if let Some(path) = &args.residual {
        scheduler.graph().to_obligations().save(path)?;
        info!("wrote {} residual edges to {}", summary.residual_edges, path.display());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        Format::Text => print!("{}", summary),
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = NetworkConfig {
        node_count: args.nodes,
        avg_obligations_per_node: args.obligations / args.nodes.max(1),
        max_amount: args.max_amount,
        seed: args.seed,
        ..Default::default()
    };
    let set = generate_random_network(&config);

    match args.output {
        Some(path) => {
            set.save(&path)?;
            eprintln!(
                "Generated {} obligations across {} nodes → {}",
                set.len(),
                args.nodes,
                path.display()
            );
        }
        None => print!("{}", set.to_lines()),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Generate(args) => cmd_generate(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
