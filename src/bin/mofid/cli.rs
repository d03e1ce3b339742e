use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "mofid",
    about = "Metal-organic framework decomposition and identification",
    version,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Identify the building blocks and topology of a MOF crystal structure
    #[command(visible_alias = "id")]
    Identify(IdentifyArgs),
}

#[derive(Args)]
pub struct IdentifyArgs {
    #[command(flatten)]
    pub io: IoOptions,

    #[command(flatten)]
    pub pipeline: PipelineOptions,

    /// Write the simplified net in Systre CGD format
    #[arg(long, value_name = "FILE")]
    pub cgd: Option<PathBuf>,
}

/// I/O options shared by all commands.
#[derive(Args)]
pub struct IoOptions {
    /// Input CIF file (stdin if omitted)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Decomposition options.
#[derive(Args)]
#[command(next_help_heading = "Decomposition")]
pub struct PipelineOptions {
    /// Custom element classification table (TOML file)
    #[arg(long, value_name = "FILE")]
    pub chem: Option<PathBuf>,

    /// Custom net signature table (TOML file)
    #[arg(long, value_name = "FILE")]
    pub nets: Option<PathBuf>,

    /// Bonding tolerance added to covalent radius sums (Å)
    #[arg(
        long,
        value_name = "Å",
        default_value = "0.45",
        allow_hyphen_values = true
    )]
    pub tolerance: f64,

    /// How cut bonds are capped before canonicalization
    #[arg(long, value_name = "RULE", default_value = "hydrogen")]
    pub capping: Capping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Capping {
    /// One explicit hydrogen per attachment point
    Hydrogen,
    /// Leave cut valences open
    Bare,
}

impl From<Capping> for mofid::CappingRule {
    fn from(value: Capping) -> Self {
        match value {
            Capping::Hydrogen => mofid::CappingRule::Hydrogen,
            Capping::Bare => mofid::CappingRule::Bare,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
