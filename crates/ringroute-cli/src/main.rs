//! ringroute CLI - inspect and exercise a consistent hash ring.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "ringroute")]
#[command(author, version, about = "ringroute - consistent hash ring routing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ringroute.toml in the current or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ringroute.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Route keys across a ring while a node joins and another leaves
    Demo {
        /// Initial nodes, comma-separated (default: from config)
        #[arg(short, long)]
        nodes: Option<String>,

        /// Keys to route, comma-separated (default: from config)
        #[arg(short, long)]
        keys: Option<String>,

        /// Node that joins the ring (default: from config)
        #[arg(short, long)]
        join: Option<String>,

        /// Node that leaves the ring (default: from config, or the last of --nodes)
        #[arg(short, long)]
        leave: Option<String>,

        /// Hide virtual node placement trace
        #[arg(long)]
        no_trace: bool,
    },

    /// Find the node that owns each key
    Lookup {
        /// Keys to route
        #[arg(required = true)]
        keys: Vec<String>,

        /// Nodes, comma-separated (default: from config)
        #[arg(short, long)]
        nodes: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show virtual node positions and hash-space ownership
    Inspect {
        /// Nodes, comma-separated (default: from config)
        #[arg(short, long)]
        nodes: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let load_config = || Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Demo {
            nodes,
            keys,
            join,
            leave,
            no_trace,
        } => {
            let args = commands::demo::DemoArgs {
                nodes: nodes.as_deref(),
                keys: keys.as_deref(),
                join: join.as_deref(),
                leave: leave.as_deref(),
                trace: !no_trace,
            };
            commands::demo::run(&load_config()?, &args)
        }
        Commands::Lookup { keys, nodes, json } => {
            commands::lookup::run(&load_config()?, &keys, nodes.as_deref(), json)
        }
        Commands::Inspect { nodes, json } => {
            commands::inspect::run(&load_config()?, nodes.as_deref(), json)
        }
    }
}
