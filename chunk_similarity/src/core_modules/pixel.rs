// THEORY:
// The `Pixel` module is the first stage of the analyzer: the Intensity Sampler.
// It is a "dumb" data container for one RGB sample plus a single heuristic, the
// channel sum, which we call the pixel's intensity.
//
// Key architectural principles:
// 1.  **Single-pixel scope**: Intensity is computed from one pixel alone. Anything
//     that needs more than one pixel (averaging, comparison) lives in `chunk` and
//     `matcher`.
// 2.  **Exact integer math**: Intensity is `red + green + blue` in `u16`. The maximum
//     is 3 * 255 = 765, which needs 10 bits, so the sum can never overflow.
// 3.  **No panics on raw data**: Raw byte slices are converted with `TryFrom`, and a
//     badly sized buffer is a `FormatError`, not a crash.

pub mod pixel {
    use crate::error::{Result, SimilarityError};

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Intensity = u16;

    /// Largest intensity a pixel can produce (three saturated channels).
    pub const MAX_INTENSITY: Intensity = 3 * Channel::MAX as Intensity;

    pub const RGB_CHANNELS: usize = 3;
    pub const RGBA_CHANNELS: usize = 4;

    /// Converts one pixel's three channels into a scalar intensity.
    #[inline]
    pub fn sample(red: Channel, green: Channel, blue: Channel) -> Intensity {
        red as Intensity + green as Intensity + blue as Intensity
    }

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct PixelSample {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl PixelSample {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// A gray pixel with all three channels set to `value`.
        pub fn gray(value: Channel) -> Self {
            Self::new(value, value, value)
        }

        /// The channel sum, in `0..=765`.
        pub fn intensity(&self) -> Intensity {
            sample(self.red, self.green, self.blue)
        }
    }

    impl TryFrom<&[Byte]> for PixelSample {
        type Error = SimilarityError;

        /// Accepts RGB or RGBA bytes. Alpha does not contribute to intensity.
        fn try_from(bytes: &[Byte]) -> Result<Self> {
            match bytes {
                [red, green, blue] | [red, green, blue, _] => Ok(Self::new(*red, *green, *blue)),
                _ => Err(SimilarityError::Format(format!(
                    "Cannot convert {} bytes into a pixel.",
                    bytes.len()
                ))),
            }
        }
    }

    /// Splits an interleaved RGB (3) or RGBA (4) buffer into pixel samples.
    pub fn samples_from_bytes(bytes: &[Byte], channels: usize) -> Result<Vec<PixelSample>> {
        if channels != RGB_CHANNELS && channels != RGBA_CHANNELS {
            return Err(SimilarityError::Config(format!(
                "channel count must be {RGB_CHANNELS} or {RGBA_CHANNELS}, got {channels}"
            )));
        }
        if bytes.len() % channels != 0 {
            return Err(SimilarityError::Format(format!(
                "buffer of {} bytes is not a whole number of {channels}-channel pixels",
                bytes.len()
            )));
        }

        bytes.chunks_exact(channels).map(PixelSample::try_from).collect()
    }

    /// Maps a pixel sequence to its intensity sequence, preserving order.
    pub fn intensities(pixels: &[PixelSample]) -> Vec<Intensity> {
        pixels.iter().map(PixelSample::intensity).collect()
    }
}
