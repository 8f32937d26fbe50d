// Command-line arguments for the `rinkcap` binary.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "rinkcap")]
#[command(about = "Price a salary-cap hockey auction and propose the managed team's roster")]
#[command(version)]
pub struct Args {
    /// Player sheet CSV; defaults to `[data] players` from the league config
    pub players: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
