mod history;
mod index;
mod memory;
pub mod normalize;
mod players;
mod traits;

pub use history::MemoryQueryHistory;
pub use index::{fold_name, PlayerIndex, SEARCH_LIMIT};
pub use memory::InMemoryPlayerRepository;
pub use players::ProviderPlayerRepository;
pub use traits::{PlayerRepository, QueryHistoryStore};
