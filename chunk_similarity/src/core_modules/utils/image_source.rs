// The image source is the analyzer's only contact with the outside world. It turns a
// path into a `Vec<PixelSample>`; the core never sees file handles or raw bytes.
//
// `load_pixels` drives any `ImageSource` through open -> read_all -> validate ->
// decode and calls `close` exactly once, whichever step fails.

pub mod image_source {
    use crate::core_modules::pixel::pixel::{PixelSample, RGB_CHANNELS, samples_from_bytes};
    use crate::error::{Result, SimilarityError};
    use log::{debug, warn};
    use std::fs::File;
    use std::io::Read;
    use std::path::Path;

    pub const SIGNATURE_LEN: usize = 8;

    /// The fixed 8-byte prefix every PNG file starts with.
    pub const PNG_SIGNATURE: [u8; SIGNATURE_LEN] =
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// Checks that `bytes` begins with `signature`.
    pub fn check_signature(bytes: &[u8], signature: &[u8; SIGNATURE_LEN]) -> Result<()> {
        match bytes.get(..SIGNATURE_LEN) {
            Some(prefix) if prefix == signature => Ok(()),
            Some(prefix) => Err(SimilarityError::Format(format!(
                "bad signature: expected {signature:02X?}, found {prefix:02X?}"
            ))),
            None => Err(SimilarityError::Format(format!(
                "input is {} bytes, too short for an {SIGNATURE_LEN}-byte signature",
                bytes.len()
            ))),
        }
    }

    /// A provider of pixel data.
    pub trait ImageSource {
        type Handle;

        fn open(&self, path: &Path) -> Result<Self::Handle>;

        fn read_all(&self, handle: &mut Self::Handle) -> Result<Vec<u8>>;

        /// Must run before any byte is treated as pixel data.
        fn validate_signature(&self, bytes: &[u8]) -> Result<()>;

        fn decode(&self, bytes: &[u8]) -> Result<Vec<PixelSample>>;

        fn close(&self, handle: Self::Handle);
    }

    /// Loads the pixel sequence at `path`.
    pub fn load_pixels<S: ImageSource>(source: &S, path: &Path) -> Result<Vec<PixelSample>> {
        let mut handle = source.open(path)?;
        let bytes = source.read_all(&mut handle);
        source.close(handle);

        let bytes = bytes?;
        source.validate_signature(&bytes)?;
        let pixels = source.decode(&bytes)?;

        debug!("Loaded {} pixels from {}", pixels.len(), path.display());
        Ok(pixels)
    }

    /// Reads PNG files from disk and decodes them with the `image` crate.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PngFileSource;

    impl ImageSource for PngFileSource {
        type Handle = File;

        fn open(&self, path: &Path) -> Result<File> {
            File::open(path).map_err(|e| {
                warn!("Could not open {}: {e}", path.display());
                SimilarityError::Io(e)
            })
        }

        fn read_all(&self, handle: &mut File) -> Result<Vec<u8>> {
            let mut bytes = Vec::new();
            handle.read_to_end(&mut bytes)?;
            Ok(bytes)
        }

        fn validate_signature(&self, bytes: &[u8]) -> Result<()> {
            check_signature(bytes, &PNG_SIGNATURE)
        }

        fn decode(&self, bytes: &[u8]) -> Result<Vec<PixelSample>> {
            let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
            let rgb = image.to_rgb8();
            debug!("Decoded {}x{} PNG", rgb.width(), rgb.height());

            samples_from_bytes(rgb.as_raw(), RGB_CHANNELS)
        }

        fn close(&self, handle: File) {
            drop(handle);
        }
    }
}
