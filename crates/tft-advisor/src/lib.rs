mod lobby;
mod weighted;

use serde::{Deserialize, Serialize};
use tft_data::Composition;
use tft_state::GameState;

pub use lobby::{best_comps, personal_affinity, LobbyScorer, ScoredComp};
pub use weighted::{tier_weight, ScoreBreakdown, WeightedScorer};

/// Maps a composition and the current game state to an affinity in [0, 1].
/// Implementations must be pure.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, comp: &Composition, state: &GameState) -> f64;
}

/// Which scoring strategy ranks the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Weighted,
    Lobby,
}

impl ScorerKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weighted" => Some(Self::Weighted),
            "lobby" | "native" => Some(Self::Lobby),
            _ => None,
        }
    }

    pub fn build(self) -> Box<dyn Scorer> {
        match self {
            Self::Weighted => Box::new(WeightedScorer),
            Self::Lobby => Box::new(LobbyScorer),
        }
    }
}

/// A feed composition with the score it got this refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComposition {
    #[serde(flatten)]
    pub composition: Composition,
    pub score: f64,
}

impl ScoredComposition {
    pub fn name(&self) -> &str {
        &self.composition.name
    }
}

/// Score every composition and sort by descending score. The sort is
/// stable, so equal scores keep their feed order.
pub fn rank(
    compositions: Vec<Composition>,
    state: &GameState,
    scorer: &dyn Scorer,
) -> Vec<ScoredComposition> {
    let mut scored: Vec<ScoredComposition> = compositions
        .into_iter()
        .map(|composition| {
            let score = scorer.score(&composition, state);
            ScoredComposition { composition, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::debug!(
        "Ranked {} compositions with {} scorer",
        scored.len(),
        scorer.name()
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use tft_data::Champion;

    fn comp(name: &str, tier: &str, win_rate: Option<f64>, carries: &[&str]) -> Composition {
        Composition {
            name: name.into(),
            tier: tier.into(),
            win_rate,
            main_carries: carries
                .iter()
                .map(|c| Champion {
                    name: c.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_example_feed() {
        let feed = vec![
            comp("B", "C", Some(20.0), &["Jinx"]),
            comp("A", "S", Some(80.0), &["Garen"]),
        ];
        let state = GameState::with_champions(["Garen"]);
        let ranked = rank(feed, &state, &WeightedScorer);

        assert_eq!(ranked[0].name(), "A");
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert_eq!(ranked[1].name(), "B");
        assert!((ranked[1].score - 0.24).abs() < 1e-9);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let feed = vec![
            comp("first", "A", None, &[]),
            comp("top", "S", None, &[]),
            comp("second", "A", None, &[]),
            comp("third", "A", None, &[]),
        ];
        let ranked = rank(feed, &GameState::new(), &WeightedScorer);
        let names: Vec<_> = ranked.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_empty_feed() {
        assert!(rank(Vec::new(), &GameState::new(), &WeightedScorer).is_empty());
    }

    #[test]
    fn test_scorer_kind_parse() {
        assert_eq!(ScorerKind::parse("Weighted"), Some(ScorerKind::Weighted));
        assert_eq!(ScorerKind::parse("native"), Some(ScorerKind::Lobby));
        assert_eq!(ScorerKind::parse("random"), None);
        assert_eq!(ScorerKind::Lobby.build().name(), "lobby");
    }

    #[test]
    fn test_scored_composition_serializes_flat() {
        let scored = ScoredComposition {
            composition: comp("A", "S", Some(50.0), &["Garen"]),
            score: 0.5,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["name"], "A");
        assert_eq!(json["score"], 0.5);
        assert_eq!(json["mainCarries"][0]["name"], "Garen");
    }
}
