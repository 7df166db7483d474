mod detection;
mod frame_source;
mod script_detector;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tft_state::Lobby;

pub use detection::detection_loop;
pub use frame_source::{FrameSource, ScreenshotFile};
pub use script_detector::{ScriptDetector, MIN_CONFIDENCE};

/// One unit portrait found on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDetection {
    pub champ: String,
    pub x: i32,
    pub y: i32,
    pub conf: f32,
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detector script not found at {0}")]
    MissingScript(PathBuf),
    #[error("failed to write frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to spawn detector: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("detector exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("detector output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to parse detector output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Image in, unit detections out. Latency and accuracy are up to the backend.
pub trait UnitDetector: Send + Sync {
    fn detect(&self, frame: &RgbaImage) -> Result<Vec<UnitDetection>, DetectError>;
}

/// Collapse detections into the player's side of a lobby, first sighting
/// order, duplicates dropped.
pub fn lobby_from_detections(detections: &[UnitDetection]) -> Lobby {
    let mut my_units: Vec<String> = Vec::new();
    for d in detections {
        if !my_units.contains(&d.champ) {
            my_units.push(d.champ.clone());
        }
    }
    Lobby {
        my_units,
        enemy_units: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(champ: &str, conf: f32) -> UnitDetection {
        UnitDetection {
            champ: champ.into(),
            x: 0,
            y: 0,
            conf,
        }
    }

    #[test]
    fn test_lobby_dedups_in_order() {
        let lobby = lobby_from_detections(&[det("Ahri", 0.9), det("Jinx", 0.8), det("Ahri", 0.5)]);
        assert_eq!(lobby.my_units, vec!["Ahri".to_string(), "Jinx".to_string()]);
        assert!(lobby.enemy_units.is_empty());
    }

    #[test]
    fn test_detection_json_contract() {
        let parsed: Vec<UnitDetection> =
            serde_json::from_str(r#"[{"champ":"Ahri","x":123,"y":456,"conf":0.88}]"#).unwrap();
        assert_eq!(parsed[0].champ, "Ahri");
        assert_eq!(parsed[0].y, 456);
    }
}
