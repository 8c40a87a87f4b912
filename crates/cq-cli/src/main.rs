//! CLI frontend for the Colloquy dialogue engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "cq",
    about = "Colloquy: author, check, and play branching dialogue graphs",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty dialogue graph
    New {
        /// Graph file name
        graph: String,

        /// Storage directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Add a node to a graph
    AddNode {
        /// Graph file name
        graph: String,

        /// Node name
        name: String,

        /// Node kind: single or multiple
        #[arg(short, long, default_value = "single")]
        kind: String,

        /// Body text
        #[arg(short, long)]
        text: Option<String>,

        /// Group to place the node in (created if missing)
        #[arg(short, long)]
        group: Option<String>,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Add a choice to a multiple-choice node
    AddChoice {
        /// Graph file name
        graph: String,

        /// Node name
        node: String,

        /// Choice text
        #[arg(short, long)]
        text: Option<String>,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Point a choice at a node, or unlink it when no target is given
    Link {
        /// Graph file name
        graph: String,

        /// Source node name
        node: String,

        /// Choice number (1-based)
        choice: usize,

        /// Target node name
        target: Option<String>,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Remove a node; choices leading to it become unlinked
    RemoveNode {
        /// Graph file name
        graph: String,

        /// Node name
        node: String,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Validate a graph and report problems
    Check {
        /// Graph file name
        graph: String,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// List the nodes of a graph
    List {
        /// Graph file name
        graph: String,

        /// Only starting nodes
        #[arg(short, long)]
        starting: bool,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Show one node in detail
    Show {
        /// Graph file name
        graph: String,

        /// Node name
        node: String,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Export a graph: json (runtime container) or markdown (script)
    Export {
        /// Graph file name
        graph: String,

        /// Output format: json, markdown
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Play a graph in the terminal
    Play {
        /// Graph file name
        graph: String,

        /// Node to start at (default: the graph's start node)
        #[arg(short, long)]
        node: Option<String>,

        /// Scripted choices, comma-separated (1-based; `b` goes back)
        #[arg(short, long, value_delimiter = ',')]
        choices: Option<Vec<String>>,

        /// Stop after this many steps
        #[arg(long, default_value = "1000")]
        max_steps: usize,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Resolve a trigger file against a variable manifest
    Trigger {
        /// Trigger JSON file
        trigger: PathBuf,

        /// Variable manifest JSON file
        #[arg(short, long)]
        vars: Option<PathBuf>,

        /// Modifier list JSON file applied before resolving
        #[arg(short, long)]
        apply: Option<PathBuf>,

        /// Storage directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New { graph, dir } => commands::new::run(&dir, &graph),
        Commands::AddNode {
            graph,
            name,
            kind,
            text,
            group,
            dir,
        } => commands::edit::add_node(&dir, &graph, &name, &kind, text.as_deref(), group.as_deref()),
        Commands::AddChoice {
            graph,
            node,
            text,
            dir,
        } => commands::edit::add_choice(&dir, &graph, &node, text.as_deref()),
        Commands::Link {
            graph,
            node,
            choice,
            target,
            dir,
        } => commands::edit::link(&dir, &graph, &node, choice, target.as_deref()),
        Commands::RemoveNode { graph, node, dir } => commands::edit::remove_node(&dir, &graph, &node),
        Commands::Check { graph, dir } => commands::check::run(&dir, &graph),
        Commands::List {
            graph,
            starting,
            dir,
        } => commands::list::run(&dir, &graph, starting),
        Commands::Show { graph, node, dir } => commands::show::run(&dir, &graph, &node),
        Commands::Export {
            graph,
            format,
            output,
            dir,
        } => commands::export::run(&dir, &graph, &format, output.as_deref()),
        Commands::Play {
            graph,
            node,
            choices,
            max_steps,
            dir,
        } => commands::play::run(&dir, &graph, node.as_deref(), choices, max_steps),
        Commands::Trigger {
            trigger,
            vars,
            apply,
            dir,
        } => commands::trigger::run(&dir, &trigger, vars.as_deref(), apply.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
