// THEORY:
// Every stage of the analyzer reports failure through `SimilarityError` instead of
// printing and exiting. The core stages only ever produce `Config` and `Overflow`;
// `Io`, `Format` and `Image` come from the image source and pass through the
// pipeline untouched. `Worker` is specific to the parallel matcher.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// `chunk_size * 765` does not fit in the `u32` chunk accumulator.
    #[error("Chunk size {chunk_size} overflows the chunk accumulator")]
    Overflow { chunk_size: usize },

    #[error("Worker error: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
