mod player;
mod query;
pub mod season;
mod trend;

pub use player::*;
pub use query::*;
pub use trend::*;
