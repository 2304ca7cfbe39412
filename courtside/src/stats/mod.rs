mod http;
mod roster;
pub mod table;
mod traits;

pub use http::HttpStatsProvider;
pub use roster::load_roster_file;
pub use table::{RawRow, ResultTable, StatsResponse};
pub use traits::StatsProvider;
