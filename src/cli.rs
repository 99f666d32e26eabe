//! CLI argument parsing with clap.
//!
//! Every flag is optional: the scheduled job runs `stoa` with no arguments
//! and takes everything else from the environment and config file.

use clap::Parser;

/// Philosophy quote bot - generate a quote, render a card, publish it.
#[derive(Parser, Debug)]
#[command(name = "stoa", version, about)]
pub struct Cli {
    /// Philosopher or theme to draw the quote from ("random" for any).
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Target platform; repeat to publish to several.
    #[arg(short = 'P', long = "platform", value_name = "PLATFORM")]
    pub platforms: Vec<String>,

    /// Generation model name or short alias.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory of background images.
    #[arg(long)]
    pub templates_dir: Option<String>,

    /// Font file path, or "builtin" for the embedded bitmap font.
    #[arg(long)]
    pub font: Option<String>,

    /// Output path for the rendered card (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
