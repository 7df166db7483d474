use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tft_advisor::ScorerKind;
use tft_data::FeedSource;
use tracing::warn;

pub const DEFAULT_TOP_N: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DETECT_INTERVAL_MS: u64 = 4_000;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub feed: FeedSource,
    /// Cards shown while nothing is locked
    pub top_n: usize,
    pub scorer: ScorerKind,
    pub request_timeout: Duration,
    /// Detection is only wired when both a script and a screenshot are set
    pub detector: Option<DetectorConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub script: PathBuf,
    pub python: Option<String>,
    pub screenshot: PathBuf,
    pub interval: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            feed: FeedSource::default(),
            top_n: DEFAULT_TOP_N,
            scorer: ScorerKind::default(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            detector: None,
        }
    }
}

impl OverlayConfig {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok();
        Self {
            feed: resolve_feed(var("TFT_OVERLAY_FEED").as_deref()),
            top_n: resolve_top_n(var("TFT_OVERLAY_TOP_N").as_deref()),
            scorer: resolve_scorer(var("TFT_OVERLAY_SCORER").as_deref()),
            request_timeout: resolve_millis(
                "TFT_OVERLAY_REQUEST_TIMEOUT_MS",
                var("TFT_OVERLAY_REQUEST_TIMEOUT_MS").as_deref(),
                DEFAULT_REQUEST_TIMEOUT_MS,
            ),
            detector: resolve_detector(
                var("TFT_OVERLAY_DETECTOR_SCRIPT").as_deref(),
                var("TFT_OVERLAY_DETECTOR_PYTHON").as_deref(),
                var("TFT_OVERLAY_SCREENSHOT").as_deref(),
                var("TFT_OVERLAY_DETECT_INTERVAL_MS").as_deref(),
            ),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

pub fn resolve_feed(raw: Option<&str>) -> FeedSource {
    non_empty(raw).map(FeedSource::parse).unwrap_or_default()
}

pub fn resolve_top_n(raw: Option<&str>) -> usize {
    match non_empty(raw) {
        None => DEFAULT_TOP_N,
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n >= 1 => n,
            _ => {
                warn!("Ignoring TFT_OVERLAY_TOP_N={:?}, using {}", v, DEFAULT_TOP_N);
                DEFAULT_TOP_N
            }
        },
    }
}

pub fn resolve_scorer(raw: Option<&str>) -> ScorerKind {
    match non_empty(raw) {
        None => ScorerKind::default(),
        Some(v) => ScorerKind::parse(v).unwrap_or_else(|| {
            warn!("Unknown scorer {:?}, using weighted", v);
            ScorerKind::default()
        }),
    }
}

pub fn resolve_millis(name: &str, raw: Option<&str>, default_ms: u64) -> Duration {
    let ms = match non_empty(raw) {
        None => default_ms,
        Some(v) => match v.parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                warn!("Ignoring {}={:?}, using {}ms", name, v, default_ms);
                default_ms
            }
        },
    };
    Duration::from_millis(ms)
}

pub fn resolve_detector(
    script: Option<&str>,
    python: Option<&str>,
    screenshot: Option<&str>,
    interval: Option<&str>,
) -> Option<DetectorConfig> {
    match (non_empty(script), non_empty(screenshot)) {
        (Some(script), Some(screenshot)) => Some(DetectorConfig {
            script: PathBuf::from(script),
            python: non_empty(python).map(str::to_string),
            screenshot: PathBuf::from(screenshot),
            interval: resolve_millis(
                "TFT_OVERLAY_DETECT_INTERVAL_MS",
                interval,
                DEFAULT_DETECT_INTERVAL_MS,
            ),
        }),
        (Some(_), None) | (None, Some(_)) => {
            warn!("Detection needs both TFT_OVERLAY_DETECTOR_SCRIPT and TFT_OVERLAY_SCREENSHOT; using sampled game state");
            None
        }
        (None, None) => None,
    }
}
