// THEORY:
// The `pipeline` module is the top-level API of the analyzer. It runs the four
// stages in order and packages their outputs into a single `Report`:
//
//     PixelSample -> Intensity -> ChunkValue -> SimilarityThreshold -> MatchSet
//
// Control flow is strictly linear and every stage is a pure function of the
// previous stage's output. A failure at any stage ends the run with an error; no
// partial report is ever returned alongside it.

use crate::core_modules::chunk::chunk::{aggregate, validate_chunk_size};
use crate::core_modules::matcher::matcher::match_pairs;
use crate::core_modules::pixel::pixel::intensities;
use crate::core_modules::threshold::threshold::estimate;
use crate::error::{Result, SimilarityError};
use crate::parallel_pipeline::ParallelMatcher;
use log::{debug, info};

// Re-export key data structures for the public API.
pub use crate::core_modules::chunk::chunk::ChunkValue;
pub use crate::core_modules::matcher::matcher::{ChunkPair, MatchSet};
pub use crate::core_modules::pixel::pixel::{Intensity, PixelSample};
pub use crate::core_modules::threshold::threshold::SimilarityThreshold;

const DEFAULT_CHUNK_SIZE: usize = 4;

/// Configuration for the SimilarityPipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of consecutive samples reduced into one chunk. Must be at least 2.
    pub chunk_size: usize,
    /// Worker count for `analyze_parallel`. `None` uses one worker per CPU.
    pub parallel_workers: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel_workers: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_chunk_size(self.chunk_size)?;
        if self.parallel_workers == Some(0) {
            return Err(SimilarityError::Config(
                "parallel_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Truncated mean intensity of every complete chunk, in input order.
    pub chunks: Vec<ChunkValue>,
    pub threshold: SimilarityThreshold,
    pub matches: MatchSet,
}

/// The main, top-level struct for the analyzer.
#[derive(Debug, Clone)]
pub struct SimilarityPipeline {
    config: PipelineConfig,
}

impl SimilarityPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn analyze(&self, pixels: &[PixelSample]) -> Result<Report> {
        // Stage 1: Intensity Sampling
        let intensities = intensities(pixels);
        self.analyze_intensities(&intensities)
    }

    pub fn analyze_intensities(&self, intensities: &[Intensity]) -> Result<Report> {
        let (chunks, threshold) = self.chunks_and_threshold(intensities)?;

        // Stage 4: Similarity Matching
        let matches = match_pairs(&chunks, threshold);
        info!(
            "{} chunks, threshold {threshold}, {} similar pairs",
            chunks.len(),
            matches.len()
        );

        Ok(Report {
            chunks,
            threshold,
            matches,
        })
    }

    /// Same as `analyze`, with the pairwise scan split across worker tasks.
    pub async fn analyze_parallel(&self, pixels: &[PixelSample]) -> Result<Report> {
        let intensities = intensities(pixels);
        let (chunks, threshold) = self.chunks_and_threshold(&intensities)?;

        let matcher = match self.config.parallel_workers {
            Some(workers) => ParallelMatcher::new(workers)?,
            None => ParallelMatcher::default(),
        };
        let matches = matcher.match_pairs(&chunks, threshold).await?;
        info!(
            "{} chunks, threshold {threshold}, {} similar pairs ({} workers)",
            chunks.len(),
            matches.len(),
            matcher.workers()
        );

        Ok(Report {
            chunks,
            threshold,
            matches,
        })
    }

    fn chunks_and_threshold(
        &self,
        intensities: &[Intensity],
    ) -> Result<(Vec<ChunkValue>, SimilarityThreshold)> {
        // Stage 2: Chunk Aggregation
        let chunks = aggregate(intensities, self.config.chunk_size)?;
        debug!(
            "{} samples -> {} chunks of {}",
            intensities.len(),
            chunks.len(),
            self.config.chunk_size
        );

        // Stage 3: Threshold Estimation
        let threshold = estimate(&chunks)?;
        Ok((chunks, threshold))
    }
}
