//! CLI module for deep-research
//!
//! Provides command-line interface parsing for the deep-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deep-research - a handoff-routed research agent swarm
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Run a multi-agent research swarm on a task",
    long_about = "A planner, a searcher, a writer and a critic pass control to each other\n\
                  until the report is approved. Large sources are stored as artifacts and\n\
                  only bounded digests enter the conversation.",
    after_help = "EXAMPLES:\n    \
                  deep-research run \"State of solid-state batteries in 2025\"\n    \
                  deep-research run --artifacts ./out \"Compare Rust web frameworks\"\n    \
                  deep-research config --validate\n    \
                  deep-research agents"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "research.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a research task and print the transcript
    Run {
        /// The research request
        task: String,

        /// Override the artifact root directory
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// Override the round ceiling
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Print the transcript as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// List the agents of the research team
    Agents,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
