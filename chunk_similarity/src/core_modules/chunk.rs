// THEORY:
// The `Chunk` module is the Chunk Aggregator. It groups the intensity stream into
// fixed-size, order-preserving windows and reduces each window to one number: the
// truncated mean of its intensities.
//
// Key architectural principles:
// 1.  **Flat windows**: A chunk is `chunk_size` consecutive samples of a flat pixel
//     sequence. Chunk boundaries do not follow image rows or columns.
// 2.  **Exact integer mean**: Intensities are summed into a `u32` accumulator and
//     divided once by `chunk_size` with truncating division. No rounding.
// 3.  **Partial chunks are dropped**: If the input length is not a multiple of
//     `chunk_size`, the trailing short window is discarded. It is never padded and
//     never averaged over a shorter divisor. The output always has exactly
//     `floor(len / chunk_size)` values.
// 4.  **Fold, not mutation**: Summation is a pure fold (`accumulate`) so the batch
//     and streaming forms share the same arithmetic, and the streaming accumulator
//     is reset after each emitted chunk.

pub mod chunk {
    use crate::core_modules::pixel::pixel::{Intensity, MAX_INTENSITY};
    use crate::error::{Result, SimilarityError};
    use log::{debug, trace};

    pub type ChunkValue = u16;
    pub type ChunkSum = u32;

    /// Smallest window that still lets the threshold formula divide by `len - 1`.
    pub const MIN_CHUNK_SIZE: usize = 2;

    /// Checks `chunk_size` before any sample is read.
    ///
    /// - `chunk_size < 2` is a `ConfigError`.
    /// - A window whose largest possible sum does not fit a `ChunkSum` is an
    ///   `OverflowError`.
    pub fn validate_chunk_size(chunk_size: usize) -> Result<()> {
        if chunk_size < MIN_CHUNK_SIZE {
            return Err(SimilarityError::Config(format!(
                "chunk_size must be at least {MIN_CHUNK_SIZE}, got {chunk_size}"
            )));
        }

        let max_sum = (chunk_size as u128) * (MAX_INTENSITY as u128);
        if max_sum > ChunkSum::MAX as u128 {
            return Err(SimilarityError::Overflow { chunk_size });
        }

        Ok(())
    }

    /// One step of the chunk fold.
    #[inline]
    pub fn accumulate(sum: ChunkSum, intensity: Intensity) -> ChunkSum {
        sum + intensity as ChunkSum
    }

    #[inline]
    fn mean(sum: ChunkSum, chunk_size: usize) -> ChunkValue {
        // sum <= chunk_size * 765, so the quotient is <= 765.
        (sum / chunk_size as ChunkSum) as ChunkValue
    }

    /// Reduces `intensities` to one truncated mean per complete window.
    pub fn aggregate(intensities: &[Intensity], chunk_size: usize) -> Result<Vec<ChunkValue>> {
        validate_chunk_size(chunk_size)?;

        let windows = intensities.chunks_exact(chunk_size);
        let discarded = windows.remainder().len();
        if discarded > 0 {
            debug!(
                "Discarding partial chunk of {discarded} samples (chunk_size = {chunk_size})"
            );
        }

        let chunks: Vec<ChunkValue> = windows
            .map(|window| mean(window.iter().copied().fold(0, accumulate), chunk_size))
            .collect();

        trace!(
            "Aggregated {} samples into {} chunks",
            intensities.len(),
            chunks.len()
        );
        Ok(chunks)
    }

    /// Incremental form of [`aggregate`] for inputs that arrive one sample at a time.
    ///
    /// Emits exactly one value per `chunk_size` pushed samples, in arrival order.
    #[derive(Debug, Clone)]
    pub struct ChunkAggregator {
        chunk_size: usize,
        /// Running sum of the window being filled.
        sum: ChunkSum,
        /// Samples in the window being filled.
        count: usize,
        chunks: Vec<ChunkValue>,
    }

    impl ChunkAggregator {
        pub fn new(chunk_size: usize) -> Result<Self> {
            validate_chunk_size(chunk_size)?;
            Ok(Self {
                chunk_size,
                sum: 0,
                count: 0,
                chunks: Vec::new(),
            })
        }

        /// Adds one sample. Returns the chunk value when this sample completes a window.
        pub fn push(&mut self, intensity: Intensity) -> Option<ChunkValue> {
            self.sum = accumulate(self.sum, intensity);
            self.count += 1;

            if self.count < self.chunk_size {
                return None;
            }

            let value = mean(self.sum, self.chunk_size);
            self.sum = 0;
            self.count = 0;
            self.chunks.push(value);
            Some(value)
        }

        /// Number of samples waiting in the incomplete window.
        pub fn pending(&self) -> usize {
            self.count
        }

        /// Completed chunk values so far.
        pub fn chunks(&self) -> &[ChunkValue] {
            &self.chunks
        }

        /// Ends the stream. The incomplete window, if any, is discarded.
        pub fn finish(self) -> Vec<ChunkValue> {
            if self.count > 0 {
                debug!(
                    "Discarding partial chunk of {} samples (chunk_size = {})",
                    self.count, self.chunk_size
                );
            }
            self.chunks
        }
    }

    impl Extend<Intensity> for ChunkAggregator {
        fn extend<T: IntoIterator<Item = Intensity>>(&mut self, iter: T) {
            for intensity in iter {
                self.push(intensity);
            }
        }
    }
}
