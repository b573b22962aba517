use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "plot-crawl")]
#[command(about = "Crawls a developer site's locations, properties and plots into listing records")]
#[command(version)]
pub struct Args {
    /// Location index URL to start from (overrides the config file)
    pub start_url: Option<String>,

    /// Path to a JSON crawl configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop after this many records
    #[arg(short, long)]
    pub limit: Option<usize>,
}
