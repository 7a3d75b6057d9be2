// THEORY:
// The Threshold Estimator turns a chunk sequence into the single number used by the
// matcher: how far apart two chunk values may be and still count as similar.
//
// The threshold is half the average step between the first and last chunk:
//
//     threshold = ((last - first) / (len - 1)) / 2
//
// - `first` and `last` are positions 0 and len - 1, not the minimum and maximum.
// - The subtraction is done in `i64` because nothing guarantees `first <= last`.
// - Both divisions truncate toward zero and run in the order written.
// - A negative quotient (descending endpoints) is stored as its magnitude.
//   Casting it straight to `u16` would wrap to roughly 65_530 and make every pair
//   match; earlier C versions of this estimator did exactly that.

pub mod threshold {
    use crate::core_modules::chunk::chunk::ChunkValue;
    use crate::error::{Result, SimilarityError};
    use log::trace;

    pub type SimilarityThreshold = u16;

    /// The estimator needs two endpoints and a non-zero `len - 1`.
    pub const MIN_CHUNKS: usize = 2;

    pub fn estimate(chunks: &[ChunkValue]) -> Result<SimilarityThreshold> {
        let (first, last) = match chunks {
            [first, .., last] => (*first, *last),
            _ => {
                return Err(SimilarityError::Config(format!(
                    "threshold estimation needs at least {MIN_CHUNKS} chunks, got {}",
                    chunks.len()
                )));
            }
        };

        let span = last as i64 - first as i64;
        let steps = (chunks.len() - 1) as i64;
        let threshold = (span / steps) / 2;

        trace!("Threshold: (({last} - {first}) / {steps}) / 2 = {threshold}");

        // |span| <= 765, so the magnitude always fits.
        Ok(threshold.unsigned_abs() as SimilarityThreshold)
    }
}

#[cfg(test)]
mod tests {
    use super::threshold::*;
    use crate::error::SimilarityError;

    #[test]
    fn gray_ramp_threshold() {
        let chunks: Vec<u16> = (0..64u16)
            .map(|i| {
                let base = 12 * i;
                (base + base + 3 + base + 6 + base + 9) / 4
            })
            .collect();
        assert_eq!(chunks[0], 4);
        assert_eq!(chunks[63], 760);
        assert_eq!(estimate(&chunks).unwrap(), 6); // ((760 - 4) / 63) / 2 = 12 / 2
    }

    #[test]
    fn uses_endpoints_not_extremes() {
        assert_eq!(estimate(&[100, 0, 765, 120]).unwrap(), 3); // (20 / 3) / 2
    }

    #[test]
    fn divisions_truncate() {
        assert_eq!(estimate(&[0, 7]).unwrap(), 3); // (7 / 1) / 2
        assert_eq!(estimate(&[0, 0, 0, 17]).unwrap(), 2); // (17 / 3) / 2 = 5 / 2
        assert_eq!(estimate(&[0, 9, 9, 9, 9, 9, 10]).unwrap(), 0); // (10 / 6) / 2 = 1 / 2
    }

    #[test]
    fn close_endpoints_give_zero() {
        assert_eq!(estimate(&[300, 0, 301]).unwrap(), 0);
        assert_eq!(estimate(&[5, 5]).unwrap(), 0);
    }

    #[test]
    fn descending_endpoints_do_not_wrap() {
        // Unsigned 4 - 760 would wrap to a huge value.
        assert_eq!(estimate(&[760, 500, 4]).unwrap(), 189); // (-756 / 2) / 2 = -189
        assert_eq!(estimate(&[760, 4]).unwrap(), estimate(&[4, 760]).unwrap());
    }

    #[test]
    fn fewer_than_two_chunks_is_config_error() {
        for chunks in [&[][..], &[42u16][..]] {
            let err = estimate(chunks).unwrap_err();
            assert!(matches!(err, SimilarityError::Config(_)));
        }
    }
}
