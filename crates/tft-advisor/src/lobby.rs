use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tft_data::Composition;
use tft_state::{GameState, Lobby};

use crate::{rank, tier_weight, Scorer};

const AFFINITY_WEIGHT: f64 = 0.6;
const OVERLAP_PENALTY: f64 = 0.4;

/// Lobby-aware alternate: rewards owned units and penalises units that
/// opponents are already contesting.
///
///   score = tier + 0.6 * personal_affinity - 0.4 * overlap, clamped to [0, 1]
#[derive(Debug, Clone, Copy, Default)]
pub struct LobbyScorer;

impl Scorer for LobbyScorer {
    fn name(&self) -> &'static str {
        "lobby"
    }

    fn score(&self, comp: &Composition, state: &GameState) -> f64 {
        let base = tier_weight(&comp.tier);
        let total = comp.champions().count();
        if total == 0 {
            return base;
        }

        let affinity = personal_affinity(comp, state);

        let contested: HashSet<&str> = state
            .opponent_compositions
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        let overlap = comp
            .champions()
            .filter(|c| contested.contains(c.name.as_str()))
            .count() as f64
            / total as f64;

        (base + AFFINITY_WEIGHT * affinity - OVERLAP_PENALTY * overlap).clamp(0.0, 1.0)
    }
}

/// Fraction of the composition's champions the player already owns
pub fn personal_affinity(comp: &Composition, state: &GameState) -> f64 {
    let total = comp.champions().count();
    if total == 0 {
        return 0.0;
    }
    let owned = comp.champions().filter(|c| state.owns(&c.name)).count();
    owned as f64 / total as f64
}

/// Name and score only, as returned across the detector boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComp {
    pub name: String,
    pub score: f64,
}

/// `{"my_units": [...], "enemy_units": [[...], ...]}` in, best `limit`
/// compositions out.
pub fn best_comps(
    lobby_json: &str,
    compositions: &[Composition],
    scorer: &dyn Scorer,
    limit: usize,
) -> Result<Vec<ScoredComp>> {
    let lobby: Lobby = serde_json::from_str(lobby_json).context("Failed to parse lobby JSON")?;
    let state = GameState::from_lobby(&lobby);

    Ok(rank(compositions.to_vec(), &state, scorer)
        .into_iter()
        .take(limit)
        .map(|s| ScoredComp {
            name: s.composition.name,
            score: s.score,
        })
        .collect())
}
