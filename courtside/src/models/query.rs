use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PlayerStats;

/// Statistic a question asks about, named by the provider's column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatType {
    Pts,
    Reb,
    Ast,
    Stl,
    Blk,
    FgPct,
    Fg3Pct,
    FtPct,
    Min,
    Gp,
}

impl StatType {
    pub const ALL: [StatType; 10] = [
        StatType::Pts,
        StatType::Reb,
        StatType::Ast,
        StatType::Stl,
        StatType::Blk,
        StatType::FgPct,
        StatType::Fg3Pct,
        StatType::FtPct,
        StatType::Min,
        StatType::Gp,
    ];

    /// Column name in the provider's tables.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Pts => "PTS",
            Self::Reb => "REB",
            Self::Ast => "AST",
            Self::Stl => "STL",
            Self::Blk => "BLK",
            Self::FgPct => "FG_PCT",
            Self::Fg3Pct => "FG3_PCT",
            Self::FtPct => "FT_PCT",
            Self::Min => "MIN",
            Self::Gp => "GP",
        }
    }

    pub fn label_ja(&self) -> &'static str {
        match self {
            Self::Pts => "得点",
            Self::Reb => "リバウンド",
            Self::Ast => "アシスト",
            Self::Stl => "スティール",
            Self::Blk => "ブロック",
            Self::FgPct => "フィールドゴール成功率",
            Self::Fg3Pct => "3ポイント成功率",
            Self::FtPct => "フリースロー成功率",
            Self::Min => "出場時間",
            Self::Gp => "出場試合数",
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, Self::FgPct | Self::Fg3Pct | Self::FtPct)
    }

    /// Display form of a value of this stat, percentages as `45.2%`.
    pub fn format_value(&self, value: f64) -> String {
        if self.is_percentage() {
            format!("{:.1}%", value * 100.0)
        } else {
            format!("{value:.1}")
        }
    }

    pub fn value_of(&self, stats: &PlayerStats) -> f64 {
        match self {
            Self::Pts => stats.points_per_game,
            Self::Reb => stats.rebounds_per_game,
            Self::Ast => stats.assists_per_game,
            Self::Stl => stats.steals_per_game,
            Self::Blk => stats.blocks_per_game,
            Self::FgPct => stats.field_goal_percentage,
            Self::Fg3Pct => stats.three_point_percentage,
            Self::FtPct => stats.free_throw_percentage,
            Self::Min => stats.minutes_per_game,
            Self::Gp => f64::from(stats.games_played),
        }
    }
}

impl std::fmt::Display for StatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for StatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' ', '%'], "_");
        match normalized.as_str() {
            "PTS" | "POINTS" => Ok(Self::Pts),
            "REB" | "REBOUNDS" | "TRB" => Ok(Self::Reb),
            "AST" | "ASSISTS" => Ok(Self::Ast),
            "STL" | "STEALS" => Ok(Self::Stl),
            "BLK" | "BLOCKS" => Ok(Self::Blk),
            "FG_PCT" | "FG_" | "FG" => Ok(Self::FgPct),
            "FG3_PCT" | "3P_PCT" | "3P_" | "FG3" => Ok(Self::Fg3Pct),
            "FT_PCT" | "FT_" | "FT" => Ok(Self::FtPct),
            "MIN" | "MINUTES" | "MP" => Ok(Self::Min),
            "GP" | "G" | "GAMES" => Ok(Self::Gp),
            _ => Err(format!("Unknown stat type: {s}")),
        }
    }
}

/// A user question and whatever structure could be pulled out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub player_name: Option<String>,
    pub season: Option<String>,
    pub stat_type: Option<StatType>,
}

impl Query {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            player_name: None,
            season: None,
            stat_type: None,
        }
    }
}

/// How the answer of a [`QueryResult`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "validation")]
    Validation,
    #[serde(rename = "player_search")]
    PlayerSearch,
    #[serde(rename = "stats_search")]
    StatsSearch,
    #[serde(rename = "nba_api")]
    Provider,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::PlayerSearch => write!(f, "player_search"),
            Self::StatsSearch => write!(f, "stats_search"),
            Self::Provider => write!(f, "nba_api"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: Query,
    pub answer: String,
    pub data_source: DataSource,
    pub timestamp: DateTime<Utc>,
}

impl QueryResult {
    pub fn new(query: Query, answer: impl Into<String>, data_source: DataSource) -> Self {
        Self {
            query,
            answer: answer.into(),
            data_source,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_scales_percentages() {
        assert_eq!(StatType::Fg3Pct.format_value(0.4536), "45.4%");
        assert_eq!(StatType::FtPct.format_value(1.0), "100.0%");
        assert_eq!(StatType::Pts.format_value(27.34), "27.3");
        assert_eq!(StatType::Gp.format_value(82.0), "82.0");
    }

    #[test]
    fn test_stat_type_round_trips_through_column_name() {
        for stat in StatType::ALL {
            assert_eq!(stat.column().parse::<StatType>(), Ok(stat));
        }
    }

    #[test]
    fn test_stat_type_aliases() {
        assert_eq!("points".parse::<StatType>(), Ok(StatType::Pts));
        assert_eq!("3P%".parse::<StatType>(), Ok(StatType::Fg3Pct));
        assert_eq!("fg3_pct".parse::<StatType>(), Ok(StatType::Fg3Pct));
        assert!("dunks".parse::<StatType>().is_err());
    }

    #[test]
    fn test_data_source_serialization() {
        assert_eq!(
            serde_json::to_string(&DataSource::Provider).unwrap(),
            "\"nba_api\""
        );
        assert_eq!(
            serde_json::to_string(&DataSource::PlayerSearch).unwrap(),
            "\"player_search\""
        );
        assert_eq!(DataSource::StatsSearch.to_string(), "stats_search");
    }

    #[test]
    fn test_stat_type_serializes_as_column() {
        assert_eq!(serde_json::to_string(&StatType::Fg3Pct).unwrap(), "\"FG3_PCT\"");
        assert_eq!(serde_json::to_string(&StatType::Pts).unwrap(), "\"PTS\"");
    }
}
