use crate::model::ImageError;
use crate::utils::{file_extension, is_safe_filename};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Listing photos stored flat inside one upload directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_dimension: u32,
    jpeg_quality: u8,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            root: root.into(),
            max_dimension,
            jpeg_quality,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directory if needed. Returns `true` when it was created.
    pub fn ensure_dir(&self) -> Result<bool, ImageError> {
        if self.root.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.root)?;
        info!("Created upload directory: {}", self.root.display());
        Ok(true)
    }

    /// Path of `filename` inside the upload directory.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, ImageError> {
        if !is_safe_filename(filename) {
            return Err(ImageError::InvalidFilename(filename.to_string()));
        }
        Ok(self.root.join(filename))
    }

    /// Shrinks the upload to fit the configured box and writes it under a
    /// fresh random name that keeps the original extension.
    pub fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, ImageError> {
        let extension = original_name.map(file_extension).unwrap_or("");
        let filename = format!("{}{}", Uuid::new_v4(), extension);
        let path = self.resolve(&filename)?;

        let encoded = self.resize(bytes, extension)?;
        self.ensure_dir()?;
        fs::write(&path, encoded)?;

        debug!("Stored image {} ({} bytes uploaded)", filename, bytes.len());
        Ok(filename)
    }

    /// Removes a stored image. A file that is already gone is not an error.
    pub fn delete(&self, filename: &str) -> Result<(), ImageError> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted image {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn resize(&self, bytes: &[u8], extension: &str) -> Result<Vec<u8>, ImageError> {
        let detected = image::guess_format(bytes)?;
        let target = ImageFormat::from_extension(extension.trim_start_matches('.'))
            .filter(is_writable)
            .unwrap_or(detected);

        let mut img = image::load_from_memory_with_format(bytes, detected)?;
        if img.width() > self.max_dimension || img.height() > self.max_dimension {
            img = img.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3);
        }

        let mut out = Cursor::new(Vec::new());
        if target == ImageFormat::Jpeg {
            let encoder = JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        } else {
            img.write_to(&mut out, target)?;
        }
        Ok(out.into_inner())
    }
}

fn is_writable(format: &ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif
    )
}
