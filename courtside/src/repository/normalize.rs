//! Mapping from the provider's positional rows to named records.
//!
//! Columns are looked up by header name when the response carries one and
//! fall back to the fixed offsets below. Short rows degrade field by field.

use chrono::NaiveDate;

use crate::models::{PerGameLine, Player, PlayerId, PlayerIndexEntry, PlayerStats, StatType, TrendPoint};
use crate::stats::{RawRow, ResultTable};

/// `SeasonTotalsRegularSeason` offsets (PerMode=PerGame).
pub mod career {
    pub const PLAYER_ID: usize = 0;
    pub const SEASON_ID: usize = 1;
    pub const TEAM_ABBREVIATION: usize = 4;
    pub const GP: usize = 6;
    pub const GS: usize = 7;
    pub const MIN: usize = 8;
    pub const FG_PCT: usize = 11;
    pub const FG3_PCT: usize = 14;
    pub const FT_PCT: usize = 17;
    pub const REB: usize = 20;
    pub const AST: usize = 21;
    pub const STL: usize = 22;
    pub const BLK: usize = 23;
    pub const PTS: usize = 26;
}

/// `CommonAllPlayers` offsets.
pub mod all_players {
    pub const PERSON_ID: usize = 0;
    pub const DISPLAY_LAST_COMMA_FIRST: usize = 1;
    pub const DISPLAY_FIRST_LAST: usize = 2;
    pub const ROSTERSTATUS: usize = 3;
    pub const TEAM_ABBREVIATION: usize = 11;
}

/// `CommonPlayerInfo` offsets.
pub mod player_info {
    pub const PERSON_ID: usize = 0;
    pub const DISPLAY_FIRST_LAST: usize = 3;
    pub const BIRTHDATE: usize = 7;
    pub const HEIGHT: usize = 11;
    pub const WEIGHT: usize = 12;
    pub const POSITION: usize = 15;
    pub const TEAM_ABBREVIATION: usize = 20;
}

/// Marker the provider uses for a traded player's combined season row.
const COMBINED_TEAM: &str = "TOT";

struct CareerColumns {
    season: usize,
    team: usize,
    gp: usize,
    gs: usize,
    min: usize,
    fg_pct: usize,
    fg3_pct: usize,
    ft_pct: usize,
    reb: usize,
    ast: usize,
    stl: usize,
    blk: usize,
    pts: usize,
}

impl CareerColumns {
    fn resolve(table: &ResultTable) -> Self {
        Self {
            season: table.column("SEASON_ID", career::SEASON_ID),
            team: table.column("TEAM_ABBREVIATION", career::TEAM_ABBREVIATION),
            gp: table.column("GP", career::GP),
            gs: table.column("GS", career::GS),
            min: table.column("MIN", career::MIN),
            fg_pct: table.column("FG_PCT", career::FG_PCT),
            fg3_pct: table.column("FG3_PCT", career::FG3_PCT),
            ft_pct: table.column("FT_PCT", career::FT_PCT),
            reb: table.column("REB", career::REB),
            ast: table.column("AST", career::AST),
            stl: table.column("STL", career::STL),
            blk: table.column("BLK", career::BLK),
            pts: table.column("PTS", career::PTS),
        }
    }

    fn line(&self, row: RawRow<'_>) -> PerGameLine {
        PerGameLine {
            games_played: row.u32_at(self.gp),
            games_started: row.u32_at(self.gs),
            minutes: row.f64_at(self.min),
            points: row.f64_at(self.pts),
            rebounds: row.f64_at(self.reb),
            assists: row.f64_at(self.ast),
            steals: row.f64_at(self.stl),
            blocks: row.f64_at(self.blk),
            field_goal_pct: row.f64_at(self.fg_pct),
            three_point_pct: row.f64_at(self.fg3_pct),
            free_throw_pct: row.f64_at(self.ft_pct),
            team: row.str_at(self.team),
        }
    }
}

/// Pick the row for `season`: the combined row for a traded player,
/// otherwise the row with the most games.
fn season_row<'a>(table: &'a ResultTable, columns: &CareerColumns, season: &str) -> Option<RawRow<'a>> {
    let mut best: Option<RawRow<'a>> = None;
    for row in table.rows().filter(|row| row.str_at(columns.season) == season) {
        if row.str_at(columns.team) == COMBINED_TEAM {
            return Some(row);
        }
        best = match best {
            Some(current) if current.u32_at(columns.gp) >= row.u32_at(columns.gp) => Some(current),
            _ => Some(row),
        };
    }
    best
}

/// Normalize the career table into one season's statistics.
///
/// `None` when the table has no row for `season`. A row that is present but
/// truncated still yields a record, with missing numbers set to zero.
pub fn stats_from_career(
    table: &ResultTable,
    player_id: PlayerId,
    player_name: &str,
    season: &str,
    position: Option<String>,
) -> Option<PlayerStats> {
    let columns = CareerColumns::resolve(table);
    let row = season_row(table, &columns, season)?;

    if row.len() <= columns.pts {
        tracing::debug!(
            %player_id,
            season,
            cells = row.len(),
            "Career row shorter than expected, missing fields default to zero"
        );
    }

    Some(PlayerStats::from_per_game(
        player_id,
        player_name,
        season,
        columns.line(row),
        position,
    ))
}

/// One point per season, in the provider's (chronological) order.
pub fn series_from_career(table: &ResultTable, stat: StatType) -> Vec<TrendPoint> {
    let columns = CareerColumns::resolve(table);
    let mut seasons: Vec<String> = Vec::new();
    for row in table.rows() {
        let season = row.str_at(columns.season);
        if !season.is_empty() && !seasons.contains(&season) {
            seasons.push(season);
        }
    }

    seasons
        .into_iter()
        .filter_map(|season| {
            let row = season_row(table, &columns, &season)?;
            let stats = PlayerStats::from_per_game(PlayerId(0), "", season.as_str(), columns.line(row), None);
            Some(TrendPoint {
                value: stat.value_of(&stats),
                season,
            })
        })
        .collect()
}

/// Rows of the all-players table that carry both an id and a name.
pub fn index_from_table(table: &ResultTable) -> Vec<PlayerIndexEntry> {
    let id_col = table.column("PERSON_ID", all_players::PERSON_ID);
    let name_col = table.column("DISPLAY_FIRST_LAST", all_players::DISPLAY_FIRST_LAST);
    let comma_col = table.column("DISPLAY_LAST_COMMA_FIRST", all_players::DISPLAY_LAST_COMMA_FIRST);
    let status_col = table.column("ROSTERSTATUS", all_players::ROSTERSTATUS);
    let team_col = table.column("TEAM_ABBREVIATION", all_players::TEAM_ABBREVIATION);

    table
        .rows()
        .filter_map(|row| {
            let id = row.u64_at(id_col)?;
            let full_name = row.str_at(name_col);
            if full_name.is_empty() {
                return None;
            }
            let last_comma_first = row.str_at(comma_col);
            let (last_name, first_name) = last_comma_first
                .split_once(',')
                .map(|(last, first)| (last.trim().to_string(), first.trim().to_string()))
                .unwrap_or_default();

            Some(PlayerIndexEntry {
                id: PlayerId(id),
                full_name,
                first_name,
                last_name,
                is_active: row.f64_at(status_col) > 0.0,
                team: row.str_at(team_col),
            })
        })
        .collect()
}

/// The first row of a player-info table as a [`Player`].
pub fn player_from_info(table: &ResultTable) -> Option<Player> {
    let row = table.rows().next()?;
    let id = row.u64_at(table.column("PERSON_ID", player_info::PERSON_ID))?;
    let name = row.str_at(table.column("DISPLAY_FIRST_LAST", player_info::DISPLAY_FIRST_LAST));
    if name.is_empty() {
        return None;
    }

    let birth_date = row
        .opt_str_at(table.column("BIRTHDATE", player_info::BIRTHDATE))
        .and_then(|raw| parse_birth_date(&raw));

    Some(Player {
        id: PlayerId(id),
        name,
        team: row.str_at(table.column("TEAM_ABBREVIATION", player_info::TEAM_ABBREVIATION)),
        position: row.opt_str_at(table.column("POSITION", player_info::POSITION)),
        height: row.opt_str_at(table.column("HEIGHT", player_info::HEIGHT)),
        weight: row.opt_str_at(table.column("WEIGHT", player_info::WEIGHT)),
        birth_date,
    })
}

fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
