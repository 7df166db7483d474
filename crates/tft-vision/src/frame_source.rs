use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::debug;

/// Supplies frames to the detection loop. `Ok(None)` means nothing new
/// this tick.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<RgbaImage>>;
}

/// A screenshot file kept up to date by an external capture tool. The file
/// is only decoded again when its modification time changes.
pub struct ScreenshotFile {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ScreenshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }
}

impl FrameSource for ScreenshotFile {
    fn next_frame(&mut self) -> Result<Option<RgbaImage>> {
        let modified = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.modified().ok(),
            Err(_) => {
                debug!("No screenshot at {}", self.path.display());
                return Ok(None);
            }
        };

        if modified.is_some() && modified == self.last_modified {
            return Ok(None);
        }

        let frame = image::open(&self.path)
            .with_context(|| format!("Failed to decode {}", self.path.display()))?
            .to_rgba8();
        self.last_modified = modified;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_nothing() {
        let mut source = ScreenshotFile::new("/nonexistent/screen.png");
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_unchanged_file_is_read_once() {
        let path = std::env::temp_dir().join(format!("tft_vision_frame_{}.png", std::process::id()));
        RgbaImage::new(16, 9).save(&path).unwrap();

        let mut source = ScreenshotFile::new(&path);
        let frame = source.next_frame().unwrap().expect("first read decodes");
        assert_eq!(frame.dimensions(), (16, 9));
        assert!(source.next_frame().unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("tft_vision_bad_{}.png", std::process::id()));
        std::fs::write(&path, b"not a png").unwrap();
        assert!(ScreenshotFile::new(&path).next_frame().is_err());
        let _ = std::fs::remove_file(&path);
    }
}
