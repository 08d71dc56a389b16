//! Meta progression across runs
//!
//! Leaderboard (top 10), achievements, coin wallet and skins. Kept in memory;
//! the host decides where the JSON goes.

use serde::{Deserialize, Serialize};

use crate::sim::RunSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    /// Coins collected during the run (breaks score ties)
    pub coins: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl LeaderboardEntry {
    fn key(&self) -> (u64, u64) {
        (self.score, self.coins)
    }
}

/// Best runs, ordered by score then coins, highest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-indexed rank a run would take, None if it stays off the board.
    ///
    /// Ties rank below the runs already recorded.
    pub fn potential_rank(&self, run: &RunSummary) -> Option<usize> {
        if run.score == 0 {
            return None;
        }
        let key = (run.score, run.coins);
        let slot = self.entries.partition_point(|e| e.key() >= key);
        (slot < MAX_HIGH_SCORES).then_some(slot + 1)
    }

    pub fn qualifies(&self, run: &RunSummary) -> bool {
        self.potential_rank(run).is_some()
    }

    /// Record a finished run. Returns the rank achieved.
    pub fn add_run(&mut self, run: &RunSummary, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(run)?;
        self.entries.insert(
            rank - 1,
            LeaderboardEntry {
                score: run.score,
                coins: run.coins,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Achievement identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstRun,
    Distance100,
    Distance500,
    CoinCollector,
}

impl AchievementId {
    pub const ALL: [AchievementId; 4] = [
        AchievementId::FirstRun,
        AchievementId::Distance100,
        AchievementId::Distance500,
        AchievementId::CoinCollector,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AchievementId::FirstRun => "First Run",
            AchievementId::Distance100 => "Marathon Starter",
            AchievementId::Distance500 => "Distance Master",
            AchievementId::CoinCollector => "Coin Collector",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::FirstRun => "Complete your first game",
            AchievementId::Distance100 => "Score 100 points in one run",
            AchievementId::Distance500 => "Score 500 points in one run",
            AchievementId::CoinCollector => "Collect 25 coins in one run",
        }
    }

    fn earned_by(&self, run: &RunSummary) -> bool {
        match self {
            AchievementId::FirstRun => true,
            AchievementId::Distance100 => run.score >= 100,
            AchievementId::Distance500 => run.score >= 500,
            AchievementId::CoinCollector => run.coins >= 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub unlocked: bool,
}

/// Runner skins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    pub id: String,
    pub name: String,
    pub cost: u64,
    pub unlocked: bool,
}

fn default_skins() -> Vec<Skin> {
    let skin = |id: &str, name: &str, cost: u64| Skin {
        id: id.to_string(),
        name: name.to_string(),
        cost,
        unlocked: cost == 0,
    };
    vec![
        skin("default", "Default Runner", 0),
        skin("ninja", "Ninja Runner", 500),
        skin("astronaut", "Space Runner", 1000),
    ]
}

/// Everything that survives between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub leaderboard: Leaderboard,
    pub achievements: Vec<Achievement>,
    /// Spendable coins
    pub wallet: u64,
    pub skins: Vec<Skin>,
    pub current_skin: String,
    pub runs_played: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            leaderboard: Leaderboard::new(),
            achievements: AchievementId::ALL
                .iter()
                .map(|&id| Achievement { id, unlocked: false })
                .collect(),
            wallet: 0,
            skins: default_skins(),
            current_skin: "default".to_string(),
            runs_played: 0,
        }
    }
}

/// What a finished run changed
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Leaderboard rank, if the run made it
    pub rank: Option<usize>,
    pub coins_earned: u64,
    pub new_achievements: Vec<AchievementId>,
}

impl Progress {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn high_score(&self) -> u64 {
        self.leaderboard.top_score().unwrap_or(0)
    }

    /// Coins credited for a finished run
    pub fn coins_for(run: &RunSummary) -> u64 {
        run.coins + run.score / 10
    }

    /// Fold a finished run into the progression
    pub fn record_run(&mut self, run: &RunSummary, timestamp: f64) -> RunOutcome {
        self.runs_played += 1;
        let rank = self.leaderboard.add_run(run, timestamp);
        let coins_earned = Self::coins_for(run);
        self.wallet += coins_earned;

        let mut new_achievements = Vec::new();
        for achievement in &mut self.achievements {
            if !achievement.unlocked && achievement.id.earned_by(run) {
                achievement.unlocked = true;
                log::info!("Achievement unlocked: {}", achievement.id.title());
                new_achievements.push(achievement.id);
            }
        }

        RunOutcome {
            rank,
            coins_earned,
            new_achievements,
        }
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.achievements.iter().any(|a| a.id == id && a.unlocked)
    }

    /// Buy and equip a skin. False if unknown, already owned or unaffordable.
    pub fn unlock_skin(&mut self, skin_id: &str) -> bool {
        let Some(skin) = self.skins.iter_mut().find(|s| s.id == skin_id) else {
            return false;
        };
        if skin.unlocked || self.wallet < skin.cost {
            return false;
        }
        skin.unlocked = true;
        self.wallet -= skin.cost;
        self.current_skin = skin.id.clone();
        true
    }

    /// Equip an owned skin
    pub fn select_skin(&mut self, skin_id: &str) -> bool {
        if self.skins.iter().any(|s| s.id == skin_id && s.unlocked) {
            self.current_skin = skin_id.to_string();
            true
        } else {
            false
        }
    }
}
