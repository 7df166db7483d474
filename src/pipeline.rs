use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tft_advisor::{rank, ScoredComposition, Scorer};
use tft_data::{FetchError, MetaDocument, MetaFeed};
use tft_state::{GameState, GameStateProvider, Lobby};
use tft_vision::{ScreenshotFile, ScriptDetector};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::DetectorConfig;

/// Result of one refresh cycle, ready for the overlay
#[derive(Debug, Clone)]
pub struct Recommendations {
    /// Descending score, feed order on ties
    pub ranked: Vec<ScoredComposition>,
    pub game_state: GameState,
    pub patch: String,
    pub updated: String,
    /// The document `ranked` came from, kept for re-scoring
    pub meta: Arc<MetaDocument>,
}

/// A finished refresh, tagged with the id it was issued under
#[derive(Debug)]
pub struct RefreshOutcome {
    pub request_id: u64,
    pub result: Result<Recommendations, FetchError>,
}

/// Manages the fetch → game state → score → rank cycle
#[derive(Clone)]
pub struct RecommendationPipeline {
    feed: Arc<dyn MetaFeed>,
    state: Arc<dyn GameStateProvider>,
    scorer: Arc<dyn Scorer>,
}

impl RecommendationPipeline {
    pub fn new(
        feed: Arc<dyn MetaFeed>,
        state: Arc<dyn GameStateProvider>,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self { feed, state, scorer }
    }

    pub async fn refresh(&self) -> Result<Recommendations, FetchError> {
        let meta = self.feed.fetch().await?;
        Ok(self.rescore(Arc::new(meta)))
    }

    /// Rank an already fetched document against a fresh game state snapshot
    pub fn rescore(&self, meta: Arc<MetaDocument>) -> Recommendations {
        let game_state = self.state.snapshot();
        let ranked = rank(meta.compositions.clone(), &game_state, self.scorer.as_ref());

        Recommendations {
            ranked,
            game_state,
            patch: meta.patch_label(),
            updated: meta.updated_label(),
            meta,
        }
    }

    /// Run a refresh in the background; the outcome comes back through `tx`
    pub fn spawn_refresh(
        &self,
        request_id: u64,
        tx: mpsc::UnboundedSender<RefreshOutcome>,
    ) -> tokio::task::JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            debug!("Refresh #{} from {}", request_id, pipeline.feed.describe());
            let result = pipeline.refresh().await;
            if let Err(ref e) = result {
                warn!("Refresh #{} failed: {}", request_id, e);
            }
            let _ = tx.send(RefreshOutcome { request_id, result });
        })
    }
}

/// Monotonic request ids. A completion is only applied when it is newer
/// than the last one applied, so a slow stale response can never
/// overwrite a fresher render.
#[derive(Debug, Default)]
pub struct RefreshSequencer {
    issued: u64,
    applied: u64,
}

impl RefreshSequencer {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Marks `request_id` applied if it is the newest seen so far
    pub fn accept(&mut self, request_id: u64) -> bool {
        if request_id > self.applied && request_id <= self.issued {
            self.applied = request_id;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> bool {
        self.applied < self.issued
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued
    }
}

/// Start the screenshot → detector loop. The receiver always holds the
/// last successfully detected lobby.
pub fn spawn_detection(config: &DetectorConfig, stop: Arc<AtomicBool>) -> watch::Receiver<Lobby> {
    let (lobby_tx, lobby_rx) = watch::channel(Lobby::default());

    let mut detector = ScriptDetector::new(&config.script);
    if let Some(ref python) = config.python {
        detector = detector.with_interpreter(python.as_str());
    }
    let source = ScreenshotFile::new(&config.screenshot);
    let interval = config.interval;

    info!(
        "Detection enabled: {} on {}",
        config.script.display(),
        config.screenshot.display()
    );

    tokio::spawn(tft_vision::detection_loop(
        Box::new(source),
        Arc::new(detector),
        lobby_tx,
        interval,
        stop,
    ));

    lobby_rx
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tft_advisor::WeightedScorer;
    use tft_data::{Champion, Composition, MetaDocument};

    /// Hands out queued documents or failures, one per fetch
    pub(crate) struct QueuedFeed(pub Mutex<Vec<Result<MetaDocument, FetchError>>>);

    #[async_trait]
    impl MetaFeed for QueuedFeed {
        async fn fetch(&self) -> Result<MetaDocument, FetchError> {
            let mut queue = self.0.lock().unwrap();
            if queue.is_empty() {
                Err(FetchError::Http { status: 503 })
            } else {
                queue.remove(0)
            }
        }

        fn describe(&self) -> String {
            "queued".into()
        }
    }

    pub(crate) struct FixedState(pub GameState);

    impl GameStateProvider for FixedState {
        fn snapshot(&self) -> GameState {
            self.0.clone()
        }
    }

    pub(crate) fn comp(name: &str, tier: &str, win_rate: f64, carry: &str) -> Composition {
        Composition {
            name: name.into(),
            tier: tier.into(),
            win_rate: Some(win_rate),
            main_carries: vec![Champion {
                name: carry.into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub(crate) fn example_feed() -> MetaDocument {
        MetaDocument {
            compositions: vec![comp("A", "S", 80.0, "Garen"), comp("B", "C", 20.0, "Jinx")],
            ..Default::default()
        }
    }

    pub(crate) fn pipeline(docs: Vec<Result<MetaDocument, FetchError>>, owned: &[&str]) -> RecommendationPipeline {
        RecommendationPipeline::new(
            Arc::new(QueuedFeed(Mutex::new(docs))),
            Arc::new(FixedState(GameState::with_champions(owned.iter().copied()))),
            Arc::new(WeightedScorer),
        )
    }

    #[tokio::test]
    async fn test_refresh_scores_and_sorts() {
        let p = pipeline(vec![Ok(example_feed())], &["Garen"]);
        let recs = p.refresh().await.unwrap();
        let names: Vec<_> = recs.ranked.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!((recs.ranked[0].score - 1.0).abs() < 1e-9);
        assert!((recs.ranked[1].score - 0.24).abs() < 1e-9);
        assert_eq!(recs.patch, "N/A");
        assert!(recs.game_state.owns("Garen"));
    }

    #[tokio::test]
    async fn test_refresh_missing_compositions() {
        let p = pipeline(vec![Ok(MetaDocument::default())], &[]);
        let recs = p.refresh().await.unwrap();
        assert!(recs.ranked.is_empty());
        assert_eq!(recs.patch, "N/A");
    }

    #[tokio::test]
    async fn test_refresh_propagates_http_failure() {
        let p = pipeline(vec![Err(FetchError::Http { status: 404 })], &[]);
        let err = p.refresh().await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_rescore_uses_cached_document() {
        let p = pipeline(vec![Ok(example_feed())], &[]);
        let recs = p.refresh().await.unwrap();
        assert_eq!(recs.ranked[0].name(), "A");

        // The queue is empty now, so any further fetch would fail
        let again = p.rescore(recs.meta.clone());
        assert_eq!(again.ranked, recs.ranked);
        assert!(Arc::ptr_eq(&again.meta, &recs.meta));
    }

    #[tokio::test]
    async fn test_spawn_refresh_reports_outcome() {
        let p = pipeline(vec![Ok(example_feed())], &[]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        p.spawn_refresh(7, tx).await.unwrap();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.request_id, 7);
        assert!(outcome.result.is_ok());
    }

    #[test]
    fn test_sequencer_discards_stale() {
        let mut seq = RefreshSequencer::default();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.in_flight());

        // Newer response lands first, older one must not overwrite it
        assert!(seq.accept(second));
        assert!(!seq.accept(first));
        assert!(!seq.in_flight());
    }

    #[test]
    fn test_sequencer_in_order() {
        let mut seq = RefreshSequencer::default();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.accept(first));
        assert!(seq.in_flight());
        assert!(seq.accept(second));
        assert!(!seq.accept(second));
        assert!(!seq.accept(99));
        assert_eq!(seq.latest_issued(), 2);
    }
}
