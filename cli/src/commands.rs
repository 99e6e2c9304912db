pub mod info;
pub mod scan;
pub mod tools;

use clap::{Args, Parser, Subcommand};
use optiscan_common::network::target::TargetDescriptor;

#[derive(Parser)]
#[command(name = "optiscan")]
#[command(about = "A scan orchestration console.")]
pub struct CommandLine {
    /// Suppress the startup banner
    #[arg(long, global = true)]
    pub no_banner: bool,
    /// Only print the progress bar and the final summary
    #[arg(short, long, global = true)]
    pub quiet: bool,
    /// Log debug detail from the orchestration core
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scan session against a target
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// List the registered tools
    #[command(alias = "t")]
    Tools,
    /// Show version and configuration defaults
    #[command(alias = "i")]
    Info,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Host, CIDR block, "country:XX" or "shodan:<query>" target
    pub target: TargetDescriptor,

    /// Tool to drive the session with
    #[arg(long, default_value = "device-probe")]
    pub tool: String,

    /// Raise the plan ceiling to 2048 units and probe harder
    #[arg(short, long)]
    pub aggressive: bool,

    /// Cap the plan at this many units
    #[arg(long)]
    pub max_units: Option<u32>,

    /// How many unit dispatches may be in flight at once
    #[arg(long, default_value_t = 8)]
    pub width: usize,

    /// Per-unit deadline in milliseconds
    #[arg(long, default_value_t = 2_000)]
    pub timeout_ms: u64,

    /// End the session as failed on the first unit failure
    #[arg(long)]
    pub strict: bool,

    /// Region label for country resolution (repeatable)
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Disable the interactive cancel key
    #[arg(long)]
    pub no_input: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
