use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::{DetectError, UnitDetection, UnitDetector};

/// Detections below this confidence are dropped
pub const MIN_CONFIDENCE: f32 = 0.25;

#[cfg(target_os = "windows")]
const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(target_os = "windows"))]
const DEFAULT_INTERPRETER: &str = "python3";

/// Runs an external detection script (e.g. the YOLO `detect_units.py`) on a
/// PNG written to a scratch directory. The script prints a JSON array of
/// `{champ, x, y, conf}` on stdout.
pub struct ScriptDetector {
    interpreter: String,
    script: PathBuf,
    temp_dir: PathBuf,
    min_confidence: f32,
}

impl ScriptDetector {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        let temp_dir = std::env::temp_dir().join("tft_overlay_detect");
        ensure_dir(&temp_dir);

        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script: script.into(),
            temp_dir,
            min_confidence: MIN_CONFIDENCE,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        ensure_dir(&self.temp_dir);
        self
    }

    /// Run the script on an image already on disk
    pub fn detect_path(&self, image_path: &Path) -> Result<Vec<UnitDetection>, DetectError> {
        if !self.script.exists() {
            return Err(DetectError::MissingScript(self.script.clone()));
        }

        let output = Command::new(&self.interpreter)
            .arg(&self.script)
            .arg(image_path)
            .output()
            .map_err(DetectError::Spawn)?;

        if !output.status.success() {
            return Err(DetectError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        let detections = parse_detections(&stdout, self.min_confidence)?;
        debug!(
            "Detector found {} units in {}",
            detections.len(),
            image_path.display()
        );
        Ok(detections)
    }
}

impl UnitDetector for ScriptDetector {
    fn detect(&self, frame: &RgbaImage) -> Result<Vec<UnitDetection>, DetectError> {
        let frame_path = self.temp_dir.join("tft_frame.png");
        frame.save(&frame_path)?;
        self.detect_path(&frame_path)
    }
}

/// Frames can't be written without the scratch dir; detection keeps going
/// and each tick reports the encode failure.
fn ensure_dir(dir: &Path) -> bool {
    match std::fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to create detector scratch dir {}: {}", dir.display(), e);
            false
        }
    }
}

fn parse_detections(stdout: &str, min_confidence: f32) -> Result<Vec<UnitDetection>, serde_json::Error> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let mut detections: Vec<UnitDetection> = serde_json::from_str(trimmed)?;
    detections.retain(|d| d.conf >= min_confidence);
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tft_vision_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_filters_low_confidence() {
        let out = r#"[{"champ":"Ahri","x":1,"y":2,"conf":0.88},{"champ":"Vi","x":3,"y":4,"conf":0.1}]"#;
        let parsed = parse_detections(out, MIN_CONFIDENCE).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].champ, "Ahri");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_detections("  \n", MIN_CONFIDENCE).unwrap().is_empty());
        assert!(parse_detections("Traceback", MIN_CONFIDENCE).is_err());
    }

    #[test]
    fn test_scratch_dir_failure_is_reported() {
        let dir = scratch_dir("blocked");
        let blocker = dir.join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();
        assert!(!ensure_dir(&blocker.join("sub")));
        assert!(ensure_dir(&dir.join("sub")));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_script() {
        let detector = ScriptDetector::new("/nonexistent/detect_units.py");
        let err = detector.detect_path(Path::new("frame.png")).unwrap_err();
        assert!(matches!(err, DetectError::MissingScript(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_script_on_frame() {
        let dir = scratch_dir("ok");
        let script = dir.join("detect.sh");
        std::fs::write(
            &script,
            "test -f \"$1\" && echo '[{\"champ\":\"Jinx\",\"x\":10,\"y\":20,\"conf\":0.9}]'\n",
        )
        .unwrap();

        let detector = ScriptDetector::new(&script)
            .with_interpreter("sh")
            .with_temp_dir(&dir);
        let frame = RgbaImage::new(8, 8);
        let detections = detector.detect(&frame).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].champ, "Jinx");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_script_failure_is_reported() {
        let dir = scratch_dir("fail");
        let script = dir.join("detect.sh");
        std::fs::write(&script, "echo 'model missing' >&2\nexit 1\n").unwrap();

        let detector = ScriptDetector::new(&script)
            .with_interpreter("sh")
            .with_temp_dir(&dir);
        match detector.detect(&RgbaImage::new(4, 4)) {
            Err(DetectError::Exit { code, stderr }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "model missing");
            }
            other => panic!("expected exit error, got {:?}", other),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
