//! PNG export of framebuffer captures

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output directory could not be created
    #[error("Could not create {path}: {source}")]
    CreateDir {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The pixel buffer does not hold `width * height` RGBA pixels
    #[error("Expected {expected} bytes of RGBA pixels, got {actual}")]
    SizeMismatch {
        /// Bytes needed
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// Encoding or writing the file failed
    #[error("Could not write {path}: {source}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Encoder error
        source: image::ImageError,
    },
}

/// Result type for exports
pub type ExportResult<T> = Result<T, ExportError>;

/// Writes RGBA captures into a folder
#[derive(Debug, Clone)]
pub struct MediaExporter {
    folder: PathBuf,
}

impl MediaExporter {
    /// Start configuring an exporter
    pub fn builder() -> MediaExporterBuilder {
        MediaExporterBuilder::default()
    }

    /// Output folder
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Write bottom-up RGBA8 pixels to `<folder>/<name>.png`
    ///
    /// The folder is created when missing. Returns the path written.
    pub fn export_image(&self, name: &str, rgba: &[u8], width: u32, height: u32) -> ExportResult<PathBuf> {
        let row = width as usize * 4;
        let expected = row * height as usize;
        if rgba.len() != expected {
            return Err(ExportError::SizeMismatch { expected, actual: rgba.len() });
        }

        std::fs::create_dir_all(&self.folder).map_err(|source| ExportError::CreateDir {
            path: self.folder.clone(),
            source,
        })?;

        let mut flipped = Vec::with_capacity(expected);
        for line in rgba.chunks_exact(row.max(1)).rev() {
            flipped.extend_from_slice(line);
        }

        let path = self.folder.join(format!("{name}.png"));
        image::save_buffer(&path, &flipped, width, height, image::ExtendedColorType::Rgba8).map_err(|source| {
            log::error!("Failed to export {}: {source}", path.display());
            ExportError::Write { path: path.clone(), source }
        })?;
        log::info!("Exported {width}x{height} image to {}", path.display());
        Ok(path)
    }
}

/// Builder for [`MediaExporter`]
#[derive(Debug, Clone)]
pub struct MediaExporterBuilder {
    folder: PathBuf,
}

impl Default for MediaExporterBuilder {
    fn default() -> Self {
        Self { folder: PathBuf::from("exports") }
    }
}

impl MediaExporterBuilder {
    /// Folder images are written to
    #[must_use]
    pub fn folder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.folder = path.into();
        self
    }

    /// Finish the exporter
    pub fn build(self) -> MediaExporter {
        MediaExporter { folder: self.folder }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_creates_folder_and_flips_rows() {
        let folder = std::env::temp_dir()
            .join(format!("gl_engine_exporter_{}", std::process::id()))
            .join("nested");
        let exporter = MediaExporter::builder().folder_path(&folder).build();

        // bottom row green, top row white
        let pixels = [0, 255, 0, 255, 255, 255, 255, 255];
        let path = exporter.export_image("capture", &pixels, 1, 2).unwrap();
        assert_eq!(path, folder.join("capture.png"));

        let written = image::open(&path).unwrap().into_rgba8();
        assert_eq!(written.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(written.get_pixel(0, 1).0, [0, 255, 0, 255]);

        std::fs::remove_dir_all(folder.parent().unwrap()).ok();
    }

    #[test]
    fn test_wrong_buffer_size_is_rejected() {
        let exporter = MediaExporter::builder().folder_path(std::env::temp_dir()).build();
        let result = exporter.export_image("bad", &[0; 7], 1, 2);
        assert!(matches!(result, Err(ExportError::SizeMismatch { expected: 8, actual: 7 })));
    }
}
