// THEORY:
// This file is the main entry point for the `chunk_similarity` library crate.
// It exports `SimilarityPipeline` and its data structures (`PipelineConfig`,
// `Report`, `MatchSet`) as the high-level interface, while the individual stages
// live in `core_modules`:
//
//     pixel     -> Intensity Sampler
//     chunk     -> Chunk Aggregator
//     threshold -> Threshold Estimator
//     matcher   -> Similarity Matcher
//
// Loading pixels from disk is handled by `core_modules::utils::image_source`,
// which sits outside the pipeline; the pipeline itself only ever sees pixel
// samples.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use error::{Result, SimilarityError};
