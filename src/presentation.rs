use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use tft_advisor::ScoredComposition;
use tft_data::MetaDocument;
use tft_state::GameState;
use tracing::info;

use crate::pipeline::{Recommendations, RefreshOutcome, RefreshSequencer};

/// At most one composition is pinned, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unlocked,
    Locked(String),
}

impl Selection {
    /// Clicking the locked card unlocks, clicking any other card moves the lock
    pub fn click(&mut self, name: &str) {
        *self = match self {
            Self::Locked(locked) if locked.as_str() == name => Self::Unlocked,
            _ => Self::Locked(name.to_string()),
        };
    }

    /// Drop a lock whose composition is gone from the latest feed
    pub fn reconcile(&mut self, ranked: &[ScoredComposition]) {
        if let Self::Locked(name) = self {
            if !ranked.iter().any(|s| s.name() == name.as_str()) {
                info!("Locked composition {:?} left the feed, unlocking", name);
                *self = Self::Unlocked;
            }
        }
    }

    pub fn locked_name(&self) -> Option<&str> {
        match self {
            Self::Locked(name) => Some(name),
            Self::Unlocked => None,
        }
    }
}

/// Cards to display: the locked composition alone, else the top `top_n`
pub fn project<'a>(
    ranked: &'a [ScoredComposition],
    selection: &Selection,
    top_n: usize,
) -> Vec<&'a ScoredComposition> {
    if let Selection::Locked(name) = selection {
        if let Some(locked) = ranked.iter().find(|s| s.name() == name.as_str()) {
            return vec![locked];
        }
    }
    ranked.iter().take(top_n).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Updating,
    Ready { patch: String, updated: String },
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading..."),
            Self::Updating => write!(f, "Updating..."),
            Self::Ready { patch, updated } => write!(f, "Patch {} · {}", patch, updated),
            Self::Failed(reason) => write!(f, "Update failed: {}", reason),
        }
    }
}

/// Presentation state: last good ranking, lock and status line.
/// Mutated only from the event loop.
#[derive(Debug)]
pub struct Overlay {
    ranked: Vec<ScoredComposition>,
    game_state: Option<GameState>,
    meta: Option<Arc<MetaDocument>>,
    selection: Selection,
    status: Status,
    sequencer: RefreshSequencer,
    top_n: usize,
}

impl Overlay {
    pub fn new(top_n: usize) -> Self {
        Self {
            ranked: Vec::new(),
            game_state: None,
            meta: None,
            selection: Selection::Unlocked,
            status: Status::Loading,
            sequencer: RefreshSequencer::default(),
            top_n: top_n.max(1),
        }
    }

    /// Issue a request id for a new refresh
    pub fn begin_refresh(&mut self) -> u64 {
        let id = self.sequencer.issue();
        if !matches!(self.status, Status::Loading) {
            self.status = Status::Updating;
        }
        id
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.sequencer.in_flight()
    }

    /// Apply a finished refresh. Returns false when it was stale and dropped.
    /// Failures keep the previous ranking on screen.
    pub fn apply(&mut self, outcome: RefreshOutcome) -> bool {
        if !self.sequencer.accept(outcome.request_id) {
            info!(
                "Dropping stale refresh #{} (latest #{})",
                outcome.request_id,
                self.sequencer.latest_issued()
            );
            return false;
        }

        match outcome.result {
            Ok(recs) => {
                info!(
                    "Refresh #{}: {} compositions, patch {}",
                    outcome.request_id,
                    recs.ranked.len(),
                    recs.patch
                );
                self.status = Status::Ready {
                    patch: recs.patch.clone(),
                    updated: recs.updated.clone(),
                };
                self.show(recs);
            }
            Err(e) => {
                self.status = Status::Failed(e.to_string());
            }
        }
        true
    }

    /// Apply a re-score of the last fetched document. Outside the request
    /// sequence: an in-flight fetch snapshots the game state later and still
    /// wins when it lands.
    pub fn apply_rescore(&mut self, recs: Recommendations) {
        info!("Re-scored {} compositions", recs.ranked.len());
        self.show(recs);
    }

    /// Last successfully fetched document, if any
    pub fn meta(&self) -> Option<Arc<MetaDocument>> {
        self.meta.clone()
    }

    fn show(&mut self, recs: Recommendations) {
        self.ranked = recs.ranked;
        self.game_state = Some(recs.game_state);
        self.meta = Some(recs.meta);
        self.selection.reconcile(&self.ranked);
    }

    pub fn click(&mut self, name: &str) {
        self.selection.click(name);
        match self.selection.locked_name() {
            Some(locked) => info!("Locked {:?}", locked),
            None => info!("Unlocked"),
        }
    }

    /// Click the `index`-th displayed card (0-based). Returns the card name.
    pub fn click_card(&mut self, index: usize) -> Option<String> {
        let name = self.cards().get(index).map(|s| s.name().to_string())?;
        self.click(&name);
        Some(name)
    }

    pub fn cards(&self) -> Vec<&ScoredComposition> {
        project(&self.ranked, &self.selection, self.top_n)
    }

    pub fn ranked(&self) -> &[ScoredComposition] {
        &self.ranked
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", self.status);
        if let Some(state) = &self.game_state {
            let owned: Vec<&str> = state.player_champions.iter().map(|c| c.name.as_str()).collect();
            let _ = writeln!(out, "Owned: {}", if owned.is_empty() { "-".to_string() } else { owned.join(", ") });
        }

        let cards = self.cards();
        if cards.is_empty() {
            let _ = writeln!(out, "No compositions available");
        }
        let locked = self.selection.locked_name();
        for (i, card) in cards.iter().enumerate() {
            out.push_str(&render_card(i + 1, card, locked == Some(card.name())));
        }
        out
    }
}

fn render_card(position: usize, card: &ScoredComposition, locked: bool) -> String {
    let comp = &card.composition;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}. {} [{}] {:.0}%{}",
        position,
        comp.name,
        comp.tier,
        card.score * 100.0,
        if locked { " [locked]" } else { "" }
    );
    let _ = writeln!(out, "   Win rate: {:.1}%", comp.win_rate.unwrap_or(0.0));
    let carries: Vec<&str> = comp.main_carries.iter().map(|c| c.name.as_str()).collect();
    let _ = writeln!(out, "   Carries: {}", carries.join(", "));
    let _ = writeln!(out, "   Traits: {}", comp.traits.join(", "));
    if !comp.best_augments.is_empty() {
        let augments: Vec<&str> = comp.best_augments.iter().map(|a| a.name.as_str()).collect();
        let _ = writeln!(out, "   Augments: {}", augments.join(", "));
    }
    out
}
