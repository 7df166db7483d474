use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// What the local player owns plus match context. Only `player_champions`
/// feeds scoring today; the rest is carried for future scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub player_champions: Vec<PlayerChampion>,
    /// One board per opponent, champion names
    pub opponent_compositions: Vec<Vec<String>>,
    pub stage: String,
    pub gold: u32,
    pub health: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerChampion {
    pub name: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_champions: Vec::new(),
            opponent_compositions: Vec::new(),
            stage: "1-1".to_string(),
            gold: 0,
            health: 100,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_champions<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            player_champions: names
                .into_iter()
                .map(|n| PlayerChampion { name: n.into() })
                .collect(),
            ..Self::default()
        }
    }

    /// Exact, case-sensitive name match
    pub fn owns(&self, champion: &str) -> bool {
        self.player_champions.iter().any(|c| c.name == champion)
    }

    pub fn from_lobby(lobby: &Lobby) -> Self {
        Self {
            opponent_compositions: lobby.enemy_units.clone(),
            ..Self::with_champions(lobby.my_units.iter().cloned())
        }
    }

}

/// Board snapshot exchanged with the detector and the lobby scorer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    pub my_units: Vec<String>,
    /// Each entry is one opponent's board
    pub enemy_units: Vec<Vec<String>>,
}

/// Source of the game state used for a refresh cycle
pub trait GameStateProvider: Send + Sync {
    fn snapshot(&self) -> GameState;
}

/// Champions the sampling provider draws from
pub const SAMPLE_CHAMPIONS: &[&str] = &[
    "Akali", "Yasuo", "Jinx", "Vi", "Senna", "Ekko", "Garen", "Graves",
];

/// Stand-in until detection is wired: pretends the player owns a couple of
/// random champions at stage 2 with 10 gold.
pub struct SampledStateProvider {
    pool: Vec<String>,
    owned: usize,
}

impl SampledStateProvider {
    pub fn new(pool: Vec<String>, owned: usize) -> Self {
        Self { pool, owned }
    }
}

impl Default for SampledStateProvider {
    fn default() -> Self {
        Self::new(SAMPLE_CHAMPIONS.iter().map(|s| s.to_string()).collect(), 2)
    }
}

impl GameStateProvider for SampledStateProvider {
    fn snapshot(&self) -> GameState {
        let mut rng = rand::thread_rng();
        let picked: Vec<String> = self
            .pool
            .choose_multiple(&mut rng, self.owned)
            .cloned()
            .collect();
        debug!("Sampled game state: {:?}", picked);
        GameState {
            stage: "2-1".to_string(),
            gold: 10,
            ..GameState::with_champions(picked)
        }
    }
}

/// Reads whatever the detection loop last published. Never blocks.
pub struct DetectedStateProvider {
    lobby_rx: watch::Receiver<Lobby>,
}

impl DetectedStateProvider {
    pub fn new(lobby_rx: watch::Receiver<Lobby>) -> Self {
        Self { lobby_rx }
    }
}

impl GameStateProvider for DetectedStateProvider {
    fn snapshot(&self) -> GameState {
        GameState::from_lobby(&self.lobby_rx.borrow())
    }
}
