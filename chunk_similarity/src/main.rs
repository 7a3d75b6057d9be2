// Example runner for the `chunk_similarity` library: load a PNG, run the pipeline,
// print the similar chunk pairs.

use anyhow::Context;
use chunk_similarity::core_modules::utils::image_source::image_source::{
    PngFileSource, load_pixels,
};
use chunk_similarity::pipeline::{PipelineConfig, SimilarityPipeline};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chunk_similarity")]
#[command(version, about = "Report pixel chunks with similar average intensity", long_about = None)]
struct Cli {
    /// Input PNG file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Number of consecutive pixels per chunk (at least 2)
    #[arg(short, long, value_name = "N", default_value_t = 4)]
    chunk_size: usize,

    /// Match chunk pairs on N parallel workers
    #[arg(short = 'j', long, value_name = "N")]
    jobs: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // --- 1. Configuration ---
    let config = PipelineConfig {
        chunk_size: cli.chunk_size,
        parallel_workers: cli.jobs,
    };
    let pipeline = SimilarityPipeline::new(config)?;

    // --- 2. Pixel Acquisition ---
    let pixels = load_pixels(&PngFileSource, &cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    // --- 3. Analysis ---
    let report = if cli.jobs.is_some() {
        pipeline.analyze_parallel(&pixels).await?
    } else {
        pipeline.analyze(&pixels)?
    };

    // --- 4. Output ---
    println!("Pixels: {}", pixels.len());
    println!("Chunks: {}", report.chunks.len());
    println!("Threshold: {}", report.threshold);
    println!("Similar pairs: {}", report.matches.len());
    for pair in &report.matches {
        println!("{pair}");
    }

    Ok(())
}
