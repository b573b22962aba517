use clap::Parser;
use plot_crawl::{CrawlConfig, Pipeline};
use std::error::Error;
use std::io::{self, BufWriter, Write};

mod args;
use args::Args;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::default(),
    };
    if let Some(start_url) = args.start_url {
        config.start_url = start_url;
    }

    ::log::info!("Starting crawl from {}", config.start_url);

    let pipeline = Pipeline::from_config(config)?.with_limit(args.limit);

    let start_time = std::time::Instant::now();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    // One JSON object per line, in page order
    for record in pipeline.records() {
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let stats = pipeline.stats();
    ::log::info!(
        "Crawl complete - {} locations, {} properties, {} plots, {} records ({} skipped) in {:.2} seconds",
        stats.locations,
        stats.properties,
        stats.plots,
        stats.records,
        stats.skipped_plots(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
