use serde::{Deserialize, Serialize};
use tft_data::Composition;
use tft_state::GameState;

use crate::Scorer;

/// Tier prior budget (an S-tier comp)
pub const TIER_MAX: f64 = 0.8;
/// Ownership budget
pub const OWNERSHIP_MAX: f64 = 0.3;
/// Win-rate budget
pub const WIN_RATE_MAX: f64 = 0.2;
/// Assumed win rate when the feed has none
pub const DEFAULT_WIN_RATE: f64 = 50.0;

/// Categorical prior for a tier label. Unknown labels score 0.
pub fn tier_weight(tier: &str) -> f64 {
    match tier {
        "S" => 0.8,
        "A" => 0.6,
        "B" => 0.4,
        "C" => 0.2,
        _ => 0.0,
    }
}

/// Per-term contributions, each already within its budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub tier: f64,
    pub ownership: f64,
    pub win_rate: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        (self.tier + self.ownership + self.win_rate).clamp(0.0, 1.0)
    }
}

/// Additive tier + ownership + win-rate score
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedScorer;

impl WeightedScorer {
    pub fn breakdown(&self, comp: &Composition, state: &GameState) -> ScoreBreakdown {
        ScoreBreakdown {
            tier: tier_weight(&comp.tier).min(TIER_MAX),
            ownership: ownership_term(comp, state),
            win_rate: win_rate_term(comp.win_rate),
        }
    }
}

impl Scorer for WeightedScorer {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn score(&self, comp: &Composition, state: &GameState) -> f64 {
        self.breakdown(comp, state).total()
    }
}

/// Owned champions across carries and supports, over the carry count.
/// Owning supports can push the ratio past 1, so the term is capped.
fn ownership_term(comp: &Composition, state: &GameState) -> f64 {
    let carries = comp.main_carries.len();
    if carries == 0 {
        return 0.0;
    }
    let owned = comp.champions().filter(|c| state.owns(&c.name)).count();
    (owned as f64 / carries as f64 * OWNERSHIP_MAX).min(OWNERSHIP_MAX)
}

fn win_rate_term(win_rate: Option<f64>) -> f64 {
    let pct = win_rate
        .filter(|w| w.is_finite())
        .unwrap_or(DEFAULT_WIN_RATE)
        .clamp(0.0, 100.0);
    pct / 100.0 * WIN_RATE_MAX
}
