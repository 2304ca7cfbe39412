use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque key the stats provider uses for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            team: team.into(),
            position: None,
            height: None,
            weight: None,
            birth_date: None,
        }
    }
}

/// One row of the provider's static player list, used as the name index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerIndexEntry {
    pub id: PlayerId,
    pub full_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub team: String,
}

impl PlayerIndexEntry {
    pub fn to_player(&self) -> Player {
        Player::new(self.id, self.full_name.clone(), self.team.clone())
    }
}

/// Per-season statistics for one player.
///
/// Percentages are fractions in `[0, 1]`. The `total_*` fields are derived
/// as `round(per_game * games_played)`: they approximate the season totals
/// and will not always match the provider's own totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub player_name: String,
    pub season: String,
    pub games_played: u32,
    pub games_started: u32,
    pub points_per_game: f64,
    pub rebounds_per_game: f64,
    pub assists_per_game: f64,
    pub steals_per_game: f64,
    pub blocks_per_game: f64,
    pub field_goal_percentage: f64,
    pub three_point_percentage: f64,
    pub free_throw_percentage: f64,
    pub minutes_per_game: f64,
    pub total_points: u32,
    pub total_rebounds: u32,
    pub total_assists: u32,
    pub total_steals: u32,
    pub total_blocks: u32,
    pub team: String,
    pub position: Option<String>,
}

/// Per-game figures before totals are derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerGameLine {
    pub games_played: u32,
    pub games_started: u32,
    pub minutes: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub field_goal_pct: f64,
    pub three_point_pct: f64,
    pub free_throw_pct: f64,
    pub team: String,
}

/// `round(per_game * games)`, saturating at zero for negative or non-finite input.
pub fn derive_total(per_game: f64, games_played: u32) -> u32 {
    let total = (per_game * f64::from(games_played)).round();
    if total.is_finite() && total > 0.0 {
        total.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl PlayerStats {
    pub fn from_per_game(
        player_id: PlayerId,
        player_name: impl Into<String>,
        season: impl Into<String>,
        line: PerGameLine,
        position: Option<String>,
    ) -> Self {
        let gp = line.games_played;
        Self {
            player_id,
            player_name: player_name.into(),
            season: season.into(),
            games_played: gp,
            games_started: line.games_started,
            points_per_game: line.points,
            rebounds_per_game: line.rebounds,
            assists_per_game: line.assists,
            steals_per_game: line.steals,
            blocks_per_game: line.blocks,
            field_goal_percentage: fraction(line.field_goal_pct),
            three_point_percentage: fraction(line.three_point_pct),
            free_throw_percentage: fraction(line.free_throw_pct),
            minutes_per_game: line.minutes,
            total_points: derive_total(line.points, gp),
            total_rebounds: derive_total(line.rebounds, gp),
            total_assists: derive_total(line.assists, gp),
            total_steals: derive_total(line.steals, gp),
            total_blocks: derive_total(line.blocks, gp),
            team: line.team,
            position,
        }
    }
}
