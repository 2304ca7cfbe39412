use serde::{Deserialize, Serialize};

use super::StatType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub season: String,
    pub value: f64,
}

/// A season-labelled series for one statistic of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub player_name: String,
    pub stat: StatType,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn title(&self) -> String {
        format!("{}の{}推移", self.player_name, self.stat.label_ja())
    }

    /// Season with the highest value; the earliest one wins ties.
    pub fn peak(&self) -> Option<&TrendPoint> {
        self.points.iter().fold(None, |best, point| match best {
            Some(current) if current.value >= point.value => Some(current),
            _ => Some(point),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(season: &str, value: f64) -> TrendPoint {
        TrendPoint {
            season: season.to_string(),
            value,
        }
    }

    #[test]
    fn test_peak_prefers_earliest_on_tie() {
        let series = TrendSeries {
            player_name: "LeBron James".to_string(),
            stat: StatType::Pts,
            points: vec![point("2003-04", 20.9), point("2005-06", 31.4), point("2007-08", 31.4)],
        };

        assert_eq!(series.peak().map(|p| p.season.as_str()), Some("2005-06"));
        assert_eq!(series.title(), "LeBron Jamesの得点推移");
    }

    #[test]
    fn test_empty_series_has_no_peak() {
        let series = TrendSeries {
            player_name: "Nobody".to_string(),
            stat: StatType::Reb,
            points: Vec::new(),
        };
        assert!(series.is_empty());
        assert!(series.peak().is_none());
    }
}
