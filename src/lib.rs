pub mod commands;
pub mod config;
pub mod pipeline;
pub mod presentation;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tft_advisor::Scorer;
use tft_data::MetaFeed;
use tft_state::{DetectedStateProvider, GameStateProvider, SampledStateProvider};
use tokio::io::BufReader;

use config::OverlayConfig;
use pipeline::RecommendationPipeline;
use presentation::Overlay;

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "comp_overlay_lib=debug,tft_data=info,tft_vision=info,tft_advisor=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = OverlayConfig::from_env();
    tracing::info!(
        "Feed: {:?}, scorer: {:?}, top {}",
        config.feed,
        config.scorer,
        config.top_n
    );

    // Everything runs on one thread; only the detector subprocess and
    // frame decoding go to the blocking pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: OverlayConfig) -> Result<()> {
    let feed: Arc<dyn MetaFeed> = Arc::from(
        config
            .feed
            .clone()
            .into_feed(config.request_timeout)
            .context("Failed to set up meta feed")?,
    );
    let scorer: Arc<dyn Scorer> = Arc::from(config.scorer.build());

    let stop = Arc::new(AtomicBool::new(false));
    let mut lobby_rx = None;
    let state: Arc<dyn GameStateProvider> = match &config.detector {
        Some(detector) => {
            let rx = pipeline::spawn_detection(detector, stop.clone());
            lobby_rx = Some(rx.clone());
            Arc::new(DetectedStateProvider::new(rx))
        }
        None => Arc::new(SampledStateProvider::default()),
    };

    let pipeline = RecommendationPipeline::new(feed, state, scorer);
    let overlay = Overlay::new(config.top_n);

    let result = commands::run_event_loop(
        pipeline,
        overlay,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        lobby_rx,
    )
    .await;

    stop.store(true, Ordering::Relaxed);
    result.map(|_| ())
}
