use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tft_state::Lobby;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::pipeline::RecommendationPipeline;
use crate::presentation::Overlay;

/// Quiet period after a detected lobby change before re-scoring
const LOBBY_DEBOUNCE: Duration = Duration::from_millis(500);

const HELP: &str = "Commands: r (refresh), <n> (lock/unlock card n), q (quit)";

/// User input for the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    /// 1-based index into the displayed cards
    Click(usize),
    Quit,
    Help,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => None,
            "r" | "refresh" => Some(Self::Refresh),
            "q" | "quit" | "exit" => Some(Self::Quit),
            "h" | "help" | "?" => Some(Self::Help),
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Some(Self::Click(n)),
                _ => Some(Self::Help),
            },
        }
    }
}

/// Single-threaded event loop: user commands, refresh completions and
/// detected lobby changes are handled one at a time. Returns the output
/// sink once the user quits, or once input is closed and nothing is
/// still in flight.
pub async fn run_event_loop<R, W>(
    pipeline: RecommendationPipeline,
    mut overlay: Overlay,
    input: R,
    mut out: W,
    mut lobby_rx: Option<watch::Receiver<Lobby>>,
) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lines = input.lines();
    let mut input_open = true;
    let mut rescore_at: Option<Instant> = None;

    // Initial load
    pipeline.spawn_refresh(overlay.begin_refresh(), tx.clone());

    loop {
        if !input_open && !overlay.refresh_in_flight() {
            break;
        }

        let rescore_deadline = rescore_at.unwrap_or_else(Instant::now);

        tokio::select! {
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) => match Command::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Refresh) => {
                        pipeline.spawn_refresh(overlay.begin_refresh(), tx.clone());
                        writeln!(out, "{}", overlay.status())?;
                    }
                    Some(Command::Click(n)) => match overlay.click_card(n - 1) {
                        Some(_) => write!(out, "{}", overlay.render())?,
                        None => writeln!(out, "No card {}", n)?,
                    },
                    Some(Command::Help) => writeln!(out, "{}", HELP)?,
                    None => {}
                },
                Ok(None) => input_open = false,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    input_open = false;
                }
            },
            Some(outcome) = rx.recv() => {
                if overlay.apply(outcome) {
                    write!(out, "{}", overlay.render())?;
                }
            }
            changed = changed_lobby(&mut lobby_rx) => {
                if changed {
                    rescore_at = Some(Instant::now() + LOBBY_DEBOUNCE);
                } else {
                    info!("Detection stopped publishing");
                    lobby_rx = None;
                }
            }
            _ = tokio::time::sleep_until(rescore_deadline), if rescore_at.is_some() => {
                rescore_at = None;
                match overlay.meta() {
                    Some(meta) => {
                        info!("Lobby changed, re-scoring");
                        overlay.apply_rescore(pipeline.rescore(meta));
                        write!(out, "{}", overlay.render())?;
                    }
                    None => {
                        info!("Lobby changed before the first load, refreshing");
                        pipeline.spawn_refresh(overlay.begin_refresh(), tx.clone());
                    }
                }
            }
        }
        out.flush()?;
    }

    Ok(out)
}

/// Resolves on the next lobby update; never resolves without a receiver.
/// `false` means the sender is gone.
async fn changed_lobby(lobby_rx: &mut Option<watch::Receiver<Lobby>>) -> bool {
    match lobby_rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}
