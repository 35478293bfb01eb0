use crate::domain::ports::PreprocessOptions;
use crate::utils::error::{Result, VerifyError};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

const UNSHARPEN_SIGMA: f32 = 1.0;
const UNSHARPEN_THRESHOLD: i32 = 2;

/// Reads only the image header to reject bodies that are not a supported picture.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| VerifyError::UnreadableImage {
            reason: e.to_string(),
        })
}

pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data).map_err(|e| VerifyError::UnreadableImage {
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// Grayscale, sharpen and boost contrast, in that order, skipping disabled steps.
    pub fn normalize(&self, image: &DynamicImage) -> DynamicImage {
        let mut out = if self.options.grayscale {
            image.grayscale()
        } else {
            image.clone()
        };

        if self.options.sharpen {
            out = out.unsharpen(UNSHARPEN_SIGMA, UNSHARPEN_THRESHOLD);
        }

        if self.options.contrast != 0.0 {
            out = out.adjust_contrast(self.options.contrast);
        }

        out
    }

    /// Decodes, normalizes and re-encodes as PNG for the OCR engine.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let decoded = decode_image(data)?;
        let normalized = self.normalize(&decoded);

        let mut buf = Cursor::new(Vec::new());
        normalized
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| VerifyError::UnreadableImage {
                reason: format!("re-encoding failed: {}", e),
            })?;

        tracing::debug!(
            "Preprocessed image {}x{} -> {} bytes PNG",
            normalized.width(),
            normalized.height(),
            buf.get_ref().len()
        );
        Ok(buf.into_inner())
    }
}
