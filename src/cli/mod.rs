//! CLI module for A.R.E.S Research
//!
//! Provides command-line interface parsing for the ares-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A.R.E.S Research - multi-agent deep research from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "ares-research",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "A.R.E.S Research - multi-agent deep research",
    long_about = "Plans a research topic into sub-tasks, runs them in parallel through\n\
                  web research agents and synthesizes a cited report.\n\n\
                  Run without arguments to start an interactive research session.",
    after_help = "EXAMPLES:\n    \
                  ares-research                                   # Interactive session\n    \
                  ares-research run -t \"Quantum error correction\"  # Research a topic\n    \
                  ares-research run -t \"EV batteries\" --narrate    # Research and narrate\n    \
                  ares-research status                            # Show configured agents\n    \
                  ares-research init                              # Scaffold research.toml"
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

    /// Subcommand to execute (defaults to an interactive `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a topic and save the report
    Run(RunArgs),

    /// Show the configured agents and their capabilities
    Status,

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Write research.toml, .env.example and .gitignore
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure (openai or ollama)
        #[arg(long, default_value = "openai")]
        provider: String,

        /// Search backend to configure (google, duckduckgo or simulated)
        #[arg(long, default_value = "google")]
        search: String,
    },
}

/// Options for a research run
#[derive(clap::Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Research topic (prompted for when omitted)
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Brief shaping the final report
    #[arg(short, long)]
    pub brief: Option<String>,

    /// Skip the clarifying follow-up questions
    #[arg(long)]
    pub skip_questions: bool,

    /// Narrate the report to audio without asking
    #[arg(long)]
    pub narrate: bool,

    /// Directory for the saved report (overrides [report].output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Narration voice (alloy, echo, fable, onyx, nova, shimmer)
    #[arg(long)]
    pub voice: Option<String>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
