mod analyzer;
mod extraction_cache;
mod parser;
mod pipeline;
mod validator;

pub use analyzer::StatsAnalyzer;
pub use extraction_cache::{ExtractedFields, ExtractionCache};
pub use parser::{extract_player_name, extract_season, extract_stat_type, QueryParser};
pub use pipeline::{QueryPipeline, NO_PLAYER_ANSWER};
pub use validator::{QueryValidator, GENERIC_HINT, LENGTH_HINT, MIN_QUERY_CHARS, NAME_HINT, SEASON_HINT};
