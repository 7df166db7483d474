use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tft_state::Lobby;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{lobby_from_detections, FrameSource, UnitDetector};

/// Poll the frame source on a fixed interval and publish the detected
/// lobby. Receivers are only notified when the lobby differs from the last
/// one published; failures leave it untouched.
pub async fn detection_loop(
    mut source: Box<dyn FrameSource>,
    detector: Arc<dyn UnitDetector>,
    lobby_tx: watch::Sender<Lobby>,
    interval: Duration,
    stop: Arc<AtomicBool>,
) {
    info!("Detection loop started, interval: {:?}", interval);

    loop {
        if stop.load(Ordering::Relaxed) {
            info!("Detection loop stopping (stop signal received)");
            break;
        }

        let tick_start = Instant::now();

        // Frame decode and the detector subprocess are both blocking
        let det = detector.clone();
        let result = tokio::task::spawn_blocking(move || {
            let frame = source.next_frame();
            let detections = match &frame {
                Ok(Some(frame)) => Some(det.detect(frame)),
                _ => None,
            };
            (source, frame.map(|f| f.is_some()), detections)
        })
        .await;

        match result {
            Ok((returned, frame, detections)) => {
                source = returned;
                match (frame, detections) {
                    (Err(e), _) => warn!("Frame source failed: {:#}", e),
                    (Ok(false), _) | (Ok(true), None) => debug!("No new frame"),
                    (Ok(true), Some(Err(e))) => warn!("Unit detection failed: {}", e),
                    (Ok(true), Some(Ok(detections))) => {
                        let lobby = lobby_from_detections(&detections);
                        let changed = lobby_tx.send_if_modified(|current| {
                            if *current != lobby {
                                *current = lobby;
                                true
                            } else {
                                false
                            }
                        });
                        if changed {
                            debug!("Detected units: {:?}", lobby_tx.borrow().my_units);
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Detection task panicked: {}", e);
                break;
            }
        }

        let elapsed = tick_start.elapsed();
        tokio::time::sleep(interval.saturating_sub(elapsed).max(Duration::from_millis(100))).await;
    }

    info!("Detection loop stopped");
}
